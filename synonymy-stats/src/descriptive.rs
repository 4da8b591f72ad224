//! Descriptive statistics for similarity-score samples.
//!
//! [`ScoreSummary`] is what gets compared side by side when two sampled score
//! distributions are calibrated against each other.

use synonymy_core::{ReportBlock, Reportable, Result, Summarizable, SynonymyError};

/// Arithmetic mean of `data`.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(SynonymyError::EmptySample(
            "mean: data must not be empty".into(),
        ));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
pub fn variance(data: &[f64], ddof: usize) -> Result<f64> {
    let n = data.len();
    if n <= ddof {
        return Err(SynonymyError::InvalidInput(format!(
            "variance: need more than {} observations, got {}",
            ddof, n
        )));
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Ok(ss / (n - ddof) as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom.
pub fn std_dev(data: &[f64], ddof: usize) -> Result<f64> {
    Ok(variance(data, ddof)?.sqrt())
}

/// Count, mean, spread, and extent of a score sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreSummary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (ddof=0).
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl ScoreSummary {
    /// Summarize a score sample. Requires at least 1 finite element.
    pub fn from_scores(scores: &[f64]) -> Result<Self> {
        if scores.is_empty() {
            return Err(SynonymyError::EmptySample(
                "ScoreSummary: no scores".into(),
            ));
        }
        if scores.iter().any(|v| !v.is_finite()) {
            return Err(SynonymyError::InvalidInput(
                "ScoreSummary: scores must be finite".into(),
            ));
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &x in scores {
            min = min.min(x);
            max = max.max(x);
        }
        Ok(Self {
            count: scores.len(),
            mean: mean(scores)?,
            std_dev: std_dev(scores, 0)?,
            min,
            max,
        })
    }
}

impl Summarizable for ScoreSummary {
    fn summary(&self) -> String {
        format!(
            "n={}, mean={:.4}, std={:.4}, min={:.4}, max={:.4}",
            self.count, self.mean, self.std_dev, self.min, self.max,
        )
    }
}

impl Reportable for ScoreSummary {
    fn render(&self) -> String {
        ReportBlock::new("Synonymy Scores Distribution Statistics")
            .field("Count", self.count)
            .field("Mean", self.mean)
            .field("Standard Deviation", self.std_dev)
            .field("Minimum", self.min)
            .field("Maximum", self.max)
            .render()
    }
}
