//! Structured error types for label-set coherence validation.

use thiserror::Error;

/// Unified error type for all normalization, clustering, and fit operations.
///
/// Every precondition is checked before computation starts, so an error
/// always means that no partial report was produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynonymyError {
    /// Score (distance) count inconsistent with the label count.
    #[error("expected {expected} distance values for {labels} labels, got {observed}")]
    ShapeMismatch {
        expected: usize,
        observed: usize,
        labels: usize,
    },

    /// Linkage row count inconsistent with the label count.
    #[error("expected {expected} linkage rows for {labels} labels, got {rows}")]
    LinkageShape {
        rows: usize,
        expected: usize,
        labels: usize,
    },

    /// Every score in the sample has the same value, so min-max scaling is undefined.
    #[error("degenerate score range: all scores equal {value}")]
    DegenerateRange { value: f64 },

    /// Anderson-Darling requested for a distribution family without tables.
    #[error("unsupported distribution family: {0}")]
    UnsupportedDistribution(String),

    /// A sample that must contain observations was empty.
    #[error("empty sample: {0}")]
    EmptySample(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An iterative parameter estimate failed to converge.
    #[error("no convergence: {0}")]
    Convergence(String),

    /// A lookup by stimulus id found nothing.
    #[error("no entry for stimulus {0}")]
    MissingStimulus(String),

    /// Wraps an error with the identity of the stimulus being processed.
    #[error("stimulus {id}: {source}")]
    Stimulus {
        id: String,
        #[source]
        source: Box<SynonymyError>,
    },
}

impl SynonymyError {
    /// Attach a stimulus identity. Already-tagged errors are returned unchanged.
    pub fn for_stimulus(self, id: &str) -> Self {
        match self {
            tagged @ SynonymyError::Stimulus { .. } => tagged,
            other => SynonymyError::Stimulus {
                id: id.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, looking through any stimulus wrapper.
    pub fn kind(&self) -> &SynonymyError {
        match self {
            SynonymyError::Stimulus { source, .. } => source.kind(),
            other => other,
        }
    }

    /// The stimulus id this error was tagged with, if any.
    pub fn stimulus(&self) -> Option<&str> {
        match self {
            SynonymyError::Stimulus { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SynonymyError>;
