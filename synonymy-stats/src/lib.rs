//! Statistical methods for similarity-score calibration.
//!
//! - **Normalization** — min-max scaling with noise-suppressing rounding
//! - **Descriptive statistics** — mean, variance, score-sample summaries
//! - **Correlation** — Pearson product-moment correlation
//! - **Distributions** — Normal, exponential, logistic, Gumbel, Kolmogorov
//! - **Goodness of fit** — Anderson-Darling and two-sample Kolmogorov-Smirnov

pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod fit;
pub mod normalization;

pub use correlation::pearson;
pub use descriptive::ScoreSummary;
pub use fit::{
    anderson_darling, kolmogorov_smirnov, run_anderson_darling, run_kolmogorov_smirnov,
    AndersonDarlingResult, DistributionFamily, FitConfig, FitEvidence, FitTest,
    GoodnessOfFitReport, KolmogorovSmirnovResult,
};
pub use normalization::{min_max, DEFAULT_PRECISION};
