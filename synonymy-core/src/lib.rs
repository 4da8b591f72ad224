//! Shared primitives and traits for label-set coherence validation.
//!
//! `synonymy-core` provides the foundation the other workspace crates build on:
//!
//! - **Error types** — [`SynonymyError`] and [`Result`] for structured error handling
//! - **Traits** — [`Scored`], [`Summarizable`], [`Reportable`]
//! - **Verdicts** — [`Verdict`], a pass/fail outcome carrying its evidence
//! - **Reports** — [`ReportBlock`] for the shared fixed-layout text format

pub mod error;
pub mod report;
pub mod traits;
pub mod verdict;

pub use error::{Result, SynonymyError};
pub use report::ReportBlock;
pub use traits::*;
pub use verdict::Verdict;
