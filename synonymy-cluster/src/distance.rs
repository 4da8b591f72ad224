//! Condensed distance vectors derived from pairwise similarity.

use synonymy_core::{Result, Summarizable, SynonymyError};

use crate::labels::{check_pair_count, condensed_index};

/// Symmetric label-to-label distances stored in condensed upper-triangle form.
///
/// For `n` labels the condensed vector has `n*(n-1)/2` elements; self-pairs
/// are never stored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceVector {
    condensed: Vec<f64>,
    n: usize,
}

impl DistanceVector {
    /// Derive distances as `1 - similarity` from normalized similarity scores.
    ///
    /// Every similarity must lie in `[0, 1]`, so the distances do too.
    pub fn from_similarity(similarity: &[f64], n: usize) -> Result<Self> {
        check_pair_count(similarity.len(), n)?;
        if let Some(pos) = similarity
            .iter()
            .position(|s| !(0.0..=1.0).contains(s))
        {
            return Err(SynonymyError::InvalidInput(format!(
                "similarity {} at pair {} is outside [0, 1]; normalize scores first",
                similarity[pos], pos
            )));
        }
        let condensed = similarity.iter().map(|s| 1.0 - s).collect();
        Ok(Self { condensed, n })
    }

    /// Create from a pre-computed condensed distance vector.
    pub fn from_condensed(condensed: Vec<f64>, n: usize) -> Result<Self> {
        check_pair_count(condensed.len(), n)?;
        if let Some(pos) = condensed.iter().position(|d| !d.is_finite()) {
            return Err(SynonymyError::InvalidInput(format!(
                "distance at pair {} is not finite ({})",
                pos, condensed[pos]
            )));
        }
        Ok(Self { condensed, n })
    }

    /// Get the distance between labels `i` and `j`.
    ///
    /// Returns 0.0 when `i == j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        self.condensed[condensed_index(i, j, self.n)]
    }

    /// Number of labels.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.condensed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.condensed.is_empty()
    }

    /// Access the raw condensed storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.condensed
    }
}

impl Summarizable for DistanceVector {
    fn summary(&self) -> String {
        format!("DistanceVector: {} labels, {} pairs", self.n, self.condensed.len())
    }
}
