//! Core trait definitions shared across the workspace.
//!
//! These traits define the contracts that result types implement across crates.

/// A type that carries a single headline number (p-value, coefficient, etc.).
pub trait Scored {
    /// The score value.
    fn score(&self) -> f64;
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}

/// A type that renders to a fixed-layout, multi-line text report.
///
/// The layout is built with [`ReportBlock`](crate::report::ReportBlock) so every
/// report in the workspace shares the same framing.
pub trait Reportable {
    /// Render the full report block, ending with a newline.
    fn render(&self) -> String;
}
