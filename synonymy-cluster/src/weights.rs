//! Per-label weights: how strongly each label agrees with the rest.

use synonymy_core::{Result, Scored, SynonymyError};

use crate::labels::{check_pair_count, LabelSet};

/// A label and the sum of the scores of every pair it takes part in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelWeight {
    pub label: String,
    pub weight: f64,
}

impl Scored for LabelWeight {
    fn score(&self) -> f64 {
        self.weight
    }
}

/// Weight every label by summing its pair scores.
///
/// `scores` follow the condensed pair order of `labels`. The result is sorted
/// by weight descending, ties broken by label ascending.
pub fn label_weights(labels: &LabelSet, scores: &[f64]) -> Result<Vec<LabelWeight>> {
    check_pair_count(scores.len(), labels.len())?;
    if let Some(pos) = scores.iter().position(|s| !s.is_finite()) {
        return Err(SynonymyError::InvalidInput(format!(
            "score at pair {} is not finite ({})",
            pos, scores[pos]
        )));
    }

    let mut totals = vec![0.0; labels.len()];
    for ((i, j, _, _), score) in labels.pairs().zip(scores) {
        totals[i] += score;
        totals[j] += score;
    }

    let mut weights: Vec<LabelWeight> = labels
        .iter()
        .zip(totals)
        .map(|(label, weight)| LabelWeight {
            label: label.to_string(),
            weight,
        })
        .collect();
    weights.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(weights)
}
