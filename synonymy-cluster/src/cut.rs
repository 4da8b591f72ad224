//! Flat clusterings cut from a dendrogram, and cophenetic agreement.

use std::collections::BTreeMap;

use synonymy_core::{Result, Summarizable, SynonymyError};
use synonymy_stats::pearson;

use crate::distance::DistanceVector;
use crate::labels::{check_pair_count, condensed_index, pair_count};
use crate::linkage::LinkageMatrix;

/// Flat cluster ids for every leaf of a dendrogram.
///
/// Ids run from 1 to the cluster count and are numbered in order of each
/// cluster's first leaf.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterAssignment {
    /// Cluster id per leaf, indexed like the label set.
    pub clusters: Vec<usize>,
    /// Number of flat clusters.
    pub n_clusters: usize,
    /// Cut height used.
    pub cutoff: f64,
}

impl ClusterAssignment {
    /// Cluster id to member count, ordered by id.
    pub fn membership(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &c in &self.clusters {
            *counts.entry(c).or_insert(0) += 1;
        }
        counts
    }

    /// Leaf indices belonging to `cluster`.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// The most populated cluster as `(id, size)`; ties go to the lowest id.
    pub fn largest(&self) -> Option<(usize, usize)> {
        self.membership()
            .into_iter()
            .fold(None, |best, (id, size)| match best {
                Some((_, s)) if s >= size => best,
                _ => Some((id, size)),
            })
    }
}

impl Summarizable for ClusterAssignment {
    fn summary(&self) -> String {
        format!(
            "ClusterAssignment: {} leaves in {} clusters at cutoff {}",
            self.clusters.len(),
            self.n_clusters,
            self.cutoff
        )
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Cut a dendrogram at height `cutoff`.
///
/// A subtree becomes one flat cluster when no merge inside it lies above
/// `cutoff`. On a monotone dendrogram this is every merge at height
/// `<= cutoff`; on one with inversions a low merge never fuses a subtree
/// that contains a higher one.
pub fn cut(linkage: &LinkageMatrix, cutoff: f64) -> Result<ClusterAssignment> {
    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(SynonymyError::InvalidInput(format!(
            "dendrogram cutoff must be finite and non-negative, got {}",
            cutoff
        )));
    }
    let n = linkage.n_leaves();
    linkage.validate(n)?;

    // Any leaf under each node, so merges can be replayed on leaves only.
    let mut representative: Vec<usize> = (0..n).collect();
    // Highest merge anywhere in each node's subtree.
    let mut subtree_max: Vec<f64> = vec![0.0; n];
    let mut parent: Vec<usize> = (0..n).collect();
    for merge in linkage.merges() {
        let a = representative[merge.left];
        let b = representative[merge.right];
        let height = merge
            .distance
            .max(subtree_max[merge.left])
            .max(subtree_max[merge.right]);
        if height <= cutoff {
            let ra = find(&mut parent, a);
            let rb = find(&mut parent, b);
            if ra != rb {
                parent[rb] = ra;
            }
        }
        representative.push(a);
        subtree_max.push(height);
    }

    let mut ids: Vec<usize> = vec![0; n];
    let mut clusters = Vec::with_capacity(n);
    let mut n_clusters = 0;
    for leaf in 0..n {
        let root = find(&mut parent, leaf);
        if ids[root] == 0 {
            n_clusters += 1;
            ids[root] = n_clusters;
        }
        clusters.push(ids[root]);
    }

    Ok(ClusterAssignment {
        clusters,
        n_clusters,
        cutoff,
    })
}

/// Condensed cophenetic distances: for each leaf pair, the height of the
/// merge that first joins them.
pub fn cophenetic_distances(linkage: &LinkageMatrix) -> Result<Vec<f64>> {
    let n = linkage.n_leaves();
    linkage.validate(n)?;
    let mut coph = vec![0.0; pair_count(n)];
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    for merge in linkage.merges() {
        let mut left = std::mem::take(&mut members[merge.left]);
        let right = std::mem::take(&mut members[merge.right]);
        for &i in &left {
            for &j in &right {
                coph[condensed_index(i, j, n)] = merge.distance;
            }
        }
        left.extend(right);
        members.push(left);
    }
    Ok(coph)
}

/// Pearson correlation between cophenetic and original distances.
///
/// When either vector has no variance the coefficient is 1.0 if the
/// dendrogram reproduces the distances exactly and 0.0 otherwise.
pub fn cophenetic_correlation(linkage: &LinkageMatrix, distances: &DistanceVector) -> Result<f64> {
    let coph = cophenetic_distances(linkage)?;
    check_pair_count(distances.len(), linkage.n_leaves())?;
    let original = distances.as_slice();

    if coph
        .iter()
        .zip(original)
        .all(|(c, d)| (c - d).abs() <= 1e-12)
    {
        return Ok(1.0);
    }
    if coph.len() < 2 {
        return Ok(0.0);
    }
    pearson(&coph, original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkage::{average_linkage, MergeRecord};

    fn dv(values: &[f64], n: usize) -> DistanceVector {
        DistanceVector::from_condensed(values.to_vec(), n).unwrap()
    }

    #[test]
    fn cut_between_merges() {
        // ab 0.1, then {a,b}c 0.5, then d last
        let linkage = average_linkage(&dv(&[0.1, 0.5, 0.9, 0.5, 0.9, 0.8], 4)).unwrap();
        let flat = cut(&linkage, 0.3).unwrap();
        assert_eq!(flat.clusters, vec![1, 1, 2, 3]);
        assert_eq!(flat.n_clusters, 3);
        assert_eq!(flat.largest(), Some((1, 2)));
        assert_eq!(flat.members(1), vec![0, 1]);
    }

    #[test]
    fn cut_is_inclusive() {
        let linkage = average_linkage(&dv(&[0.5], 2)).unwrap();
        assert_eq!(cut(&linkage, 0.5).unwrap().n_clusters, 1);
        assert_eq!(cut(&linkage, 0.49).unwrap().n_clusters, 2);
    }

    #[test]
    fn cut_extremes() {
        let values: Vec<f64> = (0..10).map(|k| 0.1 + k as f64 * 0.05).collect();
        let linkage = average_linkage(&dv(&values, 5)).unwrap();
        let all = cut(&linkage, linkage.height()).unwrap();
        assert_eq!(all.clusters, vec![1; 5]);
        let none = cut(&linkage, 0.0).unwrap();
        assert_eq!(none.clusters, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn cut_numbers_by_first_leaf() {
        // a and d close, b and c close
        let linkage = average_linkage(&dv(&[0.9, 0.9, 0.1, 0.2, 0.9, 0.9], 4)).unwrap();
        let flat = cut(&linkage, 0.3).unwrap();
        assert_eq!(flat.clusters, vec![1, 2, 2, 1]);
        assert_eq!(flat.membership(), BTreeMap::from([(1, 2), (2, 2)]));
        assert_eq!(flat.largest(), Some((1, 2)));
    }

    #[test]
    fn malformed_linkage_rejected() {
        let bad = LinkageMatrix::from_rows(
            vec![MergeRecord {
                left: 0,
                right: 7,
                distance: 0.2,
                size: 2,
            }],
            2,
        );
        assert!(cut(&bad, 0.5).is_err());
        assert!(cophenetic_distances(&bad).is_err());
    }

    #[test]
    fn cut_with_inversion_keeps_subtrees_whole() {
        // {x,y} at 0.6, then z joins below its child at 0.4
        let inverted = LinkageMatrix::from_rows(
            vec![
                MergeRecord {
                    left: 0,
                    right: 1,
                    distance: 0.6,
                    size: 2,
                },
                MergeRecord {
                    left: 2,
                    right: 3,
                    distance: 0.4,
                    size: 3,
                },
            ],
            3,
        );
        assert_eq!(cut(&inverted, 0.5).unwrap().clusters, vec![1, 2, 3]);
        assert_eq!(cut(&inverted, 0.6).unwrap().clusters, vec![1, 1, 1]);
        assert_eq!(cut(&inverted, 0.3).unwrap().n_clusters, 3);
    }

    #[test]
    fn cut_rejects_bad_cutoff() {
        let linkage = average_linkage(&dv(&[0.5], 2)).unwrap();
        assert!(cut(&linkage, -0.1).is_err());
        assert!(cut(&linkage, f64::NAN).is_err());
    }

    #[test]
    fn cophenetic_distances_from_merges() {
        let linkage = average_linkage(&dv(&[0.1, 0.5, 0.9, 0.5, 0.9, 0.8], 4)).unwrap();
        let coph = cophenetic_distances(&linkage).unwrap();
        // d joins {a,b,c} at (0.9 + 0.9 + 0.8) / 3
        let top = 2.6 / 3.0;
        let expected = [0.1, 0.5, top, 0.5, top, top];
        for (c, e) in coph.iter().zip(expected) {
            assert!((c - e).abs() < 1e-12, "{} vs {}", c, e);
        }
    }

    #[test]
    fn ultrametric_correlation_is_one() {
        // ab 0.1, cd 0.2, everything across 0.6
        let d = dv(&[0.1, 0.6, 0.6, 0.6, 0.6, 0.2], 4);
        let linkage = average_linkage(&d).unwrap();
        assert_eq!(cophenetic_correlation(&linkage, &d).unwrap(), 1.0);
    }

    #[test]
    fn two_labels_correlation_is_one() {
        let d = dv(&[0.3], 2);
        let linkage = average_linkage(&d).unwrap();
        assert_eq!(cophenetic_correlation(&linkage, &d).unwrap(), 1.0);
    }

    #[test]
    fn constant_distances_correlation_is_one() {
        let d = dv(&[0.4; 6], 4);
        let linkage = average_linkage(&d).unwrap();
        assert_eq!(cophenetic_correlation(&linkage, &d).unwrap(), 1.0);
    }

    #[test]
    fn non_ultrametric_correlation_below_one() {
        let d = dv(&[0.1, 0.5, 0.9, 0.7, 0.9, 0.6], 4);
        let linkage = average_linkage(&d).unwrap();
        let c = cophenetic_correlation(&linkage, &d).unwrap();
        assert!(c > 0.5 && c < 1.0, "c = {}", c);
    }

    #[test]
    fn correlation_shape_mismatch() {
        let linkage = LinkageMatrix::from_rows(
            vec![MergeRecord {
                left: 0,
                right: 1,
                distance: 0.2,
                size: 2,
            }],
            2,
        );
        assert!(matches!(
            cophenetic_correlation(&linkage, &dv(&[0.1, 0.2, 0.3], 3)),
            Err(SynonymyError::ShapeMismatch { .. })
        ));
    }
}
