//! Agglomerative average-linkage (UPGMA) dendrograms.
//!
//! Leaves are numbered `0..n`; the cluster created by merge `k` gets id `n + k`.

use tracing::{debug, trace};

use synonymy_core::{Result, Summarizable, SynonymyError};

use crate::distance::DistanceVector;

/// One agglomeration step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeRecord {
    /// Smaller of the two merged cluster ids.
    pub left: usize,
    /// Larger of the two merged cluster ids.
    pub right: usize,
    /// Merge height, never negative.
    pub distance: f64,
    /// Number of leaves under the new cluster.
    pub size: usize,
}

/// The `n - 1` merges of an `n`-leaf dendrogram, in merge order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkageMatrix {
    merges: Vec<MergeRecord>,
    n_leaves: usize,
}

impl LinkageMatrix {
    /// Wrap externally produced merge rows.
    ///
    /// Negative heights are clamped to zero. Structure is checked by
    /// [`LinkageMatrix::validate`], not here.
    pub fn from_rows(rows: Vec<MergeRecord>, n_leaves: usize) -> Self {
        let merges = rows
            .into_iter()
            .map(|mut row| {
                row.distance = clamp_height(row.distance);
                row
            })
            .collect();
        Self { merges, n_leaves }
    }

    pub fn merges(&self) -> &[MergeRecord] {
        &self.merges
    }

    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn len(&self) -> usize {
        self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Height of the final merge, or 0.0 for a single leaf.
    pub fn height(&self) -> f64 {
        self.merges.last().map_or(0.0, |m| m.distance)
    }

    /// Check that this is a well-formed dendrogram over `n_labels` leaves.
    ///
    /// The row count must be `n_labels - 1`; every row must join two distinct,
    /// existing, not-yet-merged clusters and carry the summed size.
    pub fn validate(&self, n_labels: usize) -> Result<()> {
        let expected = n_labels.saturating_sub(1);
        if self.merges.len() != expected || self.n_leaves != n_labels {
            return Err(SynonymyError::LinkageShape {
                rows: self.merges.len(),
                expected,
                labels: n_labels,
            });
        }

        let mut sizes: Vec<usize> = vec![1; n_labels];
        let mut consumed = vec![false; n_labels + expected];
        for (k, row) in self.merges.iter().enumerate() {
            let next_id = n_labels + k;
            if row.left == row.right || row.left >= next_id || row.right >= next_id {
                return Err(SynonymyError::InvalidInput(format!(
                    "linkage row {} joins invalid clusters {} and {}",
                    k, row.left, row.right
                )));
            }
            for id in [row.left, row.right] {
                if consumed[id] {
                    return Err(SynonymyError::InvalidInput(format!(
                        "linkage row {} reuses cluster {}",
                        k, id
                    )));
                }
                consumed[id] = true;
            }
            if !row.distance.is_finite() {
                return Err(SynonymyError::InvalidInput(format!(
                    "linkage row {} has non-finite height",
                    k
                )));
            }
            let size = sizes[row.left] + sizes[row.right];
            if row.size != size {
                return Err(SynonymyError::InvalidInput(format!(
                    "linkage row {} reports size {}, members sum to {}",
                    k, row.size, size
                )));
            }
            sizes.push(size);
        }
        Ok(())
    }
}

impl Summarizable for LinkageMatrix {
    fn summary(&self) -> String {
        format!(
            "LinkageMatrix: {} leaves, {} merges, height {:.4}",
            self.n_leaves,
            self.merges.len(),
            self.height()
        )
    }
}

fn clamp_height(distance: f64) -> f64 {
    if distance < 0.0 {
        trace!(distance, "clamping negative merge height to zero");
        0.0
    } else {
        distance
    }
}

/// Build an average-linkage dendrogram from a condensed distance vector.
///
/// The distance between two clusters is the mean of all pairwise leaf
/// distances across them, maintained with the Lance-Williams update. Ties go
/// to the first pair found in leaf order.
pub fn average_linkage(distances: &DistanceVector) -> Result<LinkageMatrix> {
    let n = distances.n();
    if n < 2 {
        return Err(SynonymyError::InvalidInput(format!(
            "need at least 2 labels to cluster, got {}",
            n
        )));
    }

    // Working distance matrix (full n x n, only active slots are read)
    let mut dist = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distances.get(i, j);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut active: Vec<usize> = (0..n).collect();
    let mut sizes: Vec<usize> = vec![1; n];
    let mut node_ids: Vec<usize> = (0..n).collect();
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        let mut best_dist = f64::INFINITY;
        let mut best_a = active[0];
        let mut best_b = active[1];
        for (ai, &a) in active.iter().enumerate() {
            for &b in &active[ai + 1..] {
                if dist[a][b] < best_dist {
                    best_dist = dist[a][b];
                    best_a = a;
                    best_b = b;
                }
            }
        }

        let size_a = sizes[best_a];
        let size_b = sizes[best_b];
        let (id_a, id_b) = (node_ids[best_a], node_ids[best_b]);
        merges.push(MergeRecord {
            left: id_a.min(id_b),
            right: id_a.max(id_b),
            distance: clamp_height(best_dist),
            size: size_a + size_b,
        });

        let wa = size_a as f64;
        let wb = size_b as f64;
        for &c in &active {
            if c == best_a || c == best_b {
                continue;
            }
            let new_d = (dist[best_a][c] * wa + dist[best_b][c] * wb) / (wa + wb);
            dist[best_a][c] = new_d;
            dist[c][best_a] = new_d;
        }

        sizes[best_a] = size_a + size_b;
        node_ids[best_a] = n + step;
        active.retain(|&c| c != best_b);
    }

    let linkage = LinkageMatrix { merges, n_leaves: n };
    debug!(
        labels = n,
        height = linkage.height(),
        "built average-linkage dendrogram"
    );
    Ok(linkage)
}
