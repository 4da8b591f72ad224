//! Label sets and the condensed pair ordering shared by scores and distances.
//!
//! For `n` labels the pairs are ordered `(0,1), (0,2), …, (0,n-1), (1,2), …,
//! (n-2,n-1)`; score, distance, and cophenetic vectors all follow it.

use std::collections::HashMap;

use synonymy_core::{Result, Summarizable, SynonymyError};

/// Number of unordered pairs among `n` items.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Position of the pair `{i, j}` in the condensed ordering for `n` items.
///
/// Argument order does not matter. `i` and `j` must differ and be below `n`.
pub fn condensed_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i != j && i < n && j < n, "invalid pair ({}, {}) for n={}", i, j, n);
    let (a, b) = if i < j { (i, j) } else { (j, i) };
    // row a starts at position: a*n - a*(a+1)/2
    a * n - a * (a + 1) / 2 + (b - a - 1)
}

/// Fail with [`SynonymyError::ShapeMismatch`] unless `observed` values cover
/// exactly the pairs of `n_labels` labels.
pub fn check_pair_count(observed: usize, n_labels: usize) -> Result<()> {
    let expected = pair_count(n_labels);
    if observed != expected {
        return Err(SynonymyError::ShapeMismatch {
            expected,
            observed,
            labels: n_labels,
        });
    }
    Ok(())
}

/// Ordered, duplicate-free labels collected for one stimulus.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<String>", into = "Vec<String>"))]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Build a label set. Fails on an empty sequence or a repeated label.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(SynonymyError::InvalidInput("label set is empty".into()));
        }
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if let Some(first) = seen.insert(label.as_str(), i) {
                return Err(SynonymyError::InvalidInput(format!(
                    "duplicate label {:?} at positions {} and {}",
                    label, first, i
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Number of label pairs, i.e. the expected score-vector length.
    pub fn pair_count(&self) -> usize {
        pair_count(self.labels.len())
    }

    /// All label pairs in condensed order, as `(i, j, label_i, label_j)`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, &str, &str)> + '_ {
        let n = self.labels.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).map(move |j| (i, j, self.labels[i].as_str(), self.labels[j].as_str()))
        })
    }
}

impl TryFrom<Vec<String>> for LabelSet {
    type Error = SynonymyError;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.labels
    }
}

impl Summarizable for LabelSet {
    fn summary(&self) -> String {
        format!("LabelSet: {} labels, {} pairs", self.len(), self.pair_count())
    }
}
