//! Coherence evaluation: does a dominant cluster hold enough of the labels?

use std::collections::BTreeMap;

use tracing::debug;

use synonymy_core::{ReportBlock, Reportable, Result, Scored, Summarizable, SynonymyError, Verdict};
use synonymy_stats::{min_max, DEFAULT_PRECISION};

use crate::cut::{cophenetic_correlation, cut};
use crate::distance::DistanceVector;
use crate::labels::{check_pair_count, LabelSet};
use crate::linkage::{average_linkage, LinkageMatrix};

/// Percentage of labels the largest cluster must hold to pass.
pub const DEFAULT_PASS_PCT: f64 = 75.0;

/// Default dendrogram cut height.
pub const DEFAULT_CUTOFF: f64 = 0.5;

// ── Configuration ──────────────────────────────────────────────────────────

/// How raw pair scores become similarities in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScoreScaling {
    /// Min-max normalize, then round.
    #[default]
    MinMax,
    /// Scores already lie in `[0, 1]`; use them unchanged.
    Identity,
}

/// Parameters for coherence evaluation, passed explicitly per call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoherenceConfig {
    /// Dendrogram cut height.
    pub cutoff: f64,
    /// Minimum percentage of labels in the largest cluster for a pass.
    pub pass_pct: f64,
    /// Rounding precision for min-max normalization.
    pub precision: u32,
    pub scaling: ScoreScaling,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            pass_pct: DEFAULT_PASS_PCT,
            precision: DEFAULT_PRECISION,
            scaling: ScoreScaling::MinMax,
        }
    }
}

impl CoherenceConfig {
    /// Default parameters with the given cut height.
    pub fn with_cutoff(cutoff: f64) -> Self {
        Self {
            cutoff,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cutoff.is_finite() || self.cutoff < 0.0 {
            return Err(SynonymyError::InvalidInput(format!(
                "dendrogram cutoff must be finite and non-negative, got {}",
                self.cutoff
            )));
        }
        if !(self.pass_pct > 0.0 && self.pass_pct <= 100.0) {
            return Err(SynonymyError::InvalidInput(format!(
                "pass percentage must be in (0, 100], got {}",
                self.pass_pct
            )));
        }
        Ok(())
    }
}

// ── Report ─────────────────────────────────────────────────────────────────

/// The quantities a coherence verdict was decided on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoherenceEvidence {
    pub max_pct: f64,
    pub pass_pct: f64,
    pub cophenetic_coefficient: f64,
}

/// Outcome of clustering one stimulus's labels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoherenceReport {
    pub stimulus: String,
    /// Cut height used.
    pub cutoff: f64,
    pub cophenetic_coefficient: f64,
    /// Cluster id per label, in label order.
    pub clusters: Vec<usize>,
    /// Cluster id to member count.
    pub membership: BTreeMap<usize, usize>,
    pub max_cluster_id: usize,
    pub max_cluster_size: usize,
    /// Share of labels in the largest cluster, in percent.
    pub max_pct: f64,
    pub verdict: Verdict<CoherenceEvidence>,
}

impl CoherenceReport {
    pub fn is_pass(&self) -> bool {
        self.verdict.is_pass()
    }

    pub fn n_labels(&self) -> usize {
        self.clusters.len()
    }

    pub fn n_clusters(&self) -> usize {
        self.membership.len()
    }

    /// Label indices in the largest cluster.
    pub fn dominant_members(&self) -> Vec<usize> {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == self.max_cluster_id)
            .map(|(i, _)| i)
            .collect()
    }
}

impl Scored for CoherenceReport {
    fn score(&self) -> f64 {
        self.max_pct
    }
}

impl Summarizable for CoherenceReport {
    fn summary(&self) -> String {
        format!(
            "CoherenceReport: {} {} ({} labels, {} clusters, {}% in cluster {})",
            self.stimulus,
            self.verdict,
            self.n_labels(),
            self.n_clusters(),
            self.max_pct,
            self.max_cluster_id
        )
    }
}

impl Reportable for CoherenceReport {
    fn render(&self) -> String {
        ReportBlock::new("Agglomerative Hierarchical Clustering Statistics")
            .field("Stimulus", &self.stimulus)
            .field("Dendrogram cutoff", self.cutoff)
            .field("Cophenetic correlation coefficient", self.cophenetic_coefficient)
            .list(
                "Cluster: Count",
                self.membership
                    .iter()
                    .map(|(id, count)| format!("{}: {}", id, count)),
            )
            .line(format!(
                "Cluster {} with {} members has {}% of the membership.",
                self.max_cluster_id, self.max_cluster_size, self.max_pct
            ))
            .line(format!("Cluster coherence test: {}", self.verdict))
            .render()
    }
}

// ── Evaluation ─────────────────────────────────────────────────────────────

/// Cut `linkage` at `config.cutoff` and judge whether its largest cluster
/// holds at least `config.pass_pct` percent of the labels.
///
/// The linkage must have exactly `n - 1` rows for the `n` labels behind
/// `distances`.
pub fn evaluate(
    stimulus: &str,
    linkage: &LinkageMatrix,
    distances: &DistanceVector,
    config: &CoherenceConfig,
) -> Result<CoherenceReport> {
    evaluate_linkage(stimulus, linkage, distances, config).map_err(|e| e.for_stimulus(stimulus))
}

fn evaluate_linkage(
    stimulus: &str,
    linkage: &LinkageMatrix,
    distances: &DistanceVector,
    config: &CoherenceConfig,
) -> Result<CoherenceReport> {
    config.validate()?;
    let n = distances.n();
    linkage.validate(n)?;

    let cophenetic_coefficient = cophenetic_correlation(linkage, distances)?;
    let flat = cut(linkage, config.cutoff)?;
    let membership = flat.membership();
    let (max_cluster_id, max_cluster_size) = flat.largest().ok_or_else(|| {
        SynonymyError::InvalidInput("cannot evaluate coherence of zero labels".into())
    })?;
    let max_pct = 100.0 * max_cluster_size as f64 / n as f64;

    debug!(
        stimulus,
        labels = n,
        cutoff = config.cutoff,
        clusters = flat.n_clusters,
        max_pct,
        "cut dendrogram"
    );

    let evidence = CoherenceEvidence {
        max_pct,
        pass_pct: config.pass_pct,
        cophenetic_coefficient,
    };
    Ok(CoherenceReport {
        stimulus: stimulus.to_string(),
        cutoff: config.cutoff,
        cophenetic_coefficient,
        clusters: flat.clusters,
        membership,
        max_cluster_id,
        max_cluster_size,
        max_pct,
        verdict: Verdict::from_check(max_pct >= config.pass_pct, evidence),
    })
}

/// Run the full pipeline for one stimulus: scale scores to similarities,
/// derive distances, build the average-linkage dendrogram, and evaluate it.
///
/// Every shape and range check runs before clustering. Errors carry the
/// stimulus id.
pub fn evaluate_stimulus(
    stimulus: &str,
    labels: &LabelSet,
    scores: &[f64],
    config: &CoherenceConfig,
) -> Result<CoherenceReport> {
    run_pipeline(stimulus, labels, scores, config).map_err(|e| e.for_stimulus(stimulus))
}

fn run_pipeline(
    stimulus: &str,
    labels: &LabelSet,
    scores: &[f64],
    config: &CoherenceConfig,
) -> Result<CoherenceReport> {
    config.validate()?;
    let n = labels.len();
    if n < 2 {
        return Err(SynonymyError::InvalidInput(format!(
            "need at least 2 labels to cluster, got {}",
            n
        )));
    }
    check_pair_count(scores.len(), n)?;

    let similarity = match config.scaling {
        ScoreScaling::MinMax => min_max(scores, config.precision)?,
        ScoreScaling::Identity => scores.to_vec(),
    };
    debug!(stimulus, labels = n, scaling = ?config.scaling, "scaled pair scores");

    let distances = DistanceVector::from_similarity(&similarity, n)?;
    let linkage = average_linkage(&distances)?;
    evaluate(stimulus, &linkage, &distances, config)
}

/// Scores for one stimulus, ready for [`evaluate_batch`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StimulusInput {
    pub stimulus: String,
    pub labels: LabelSet,
    /// Pair scores in condensed label order.
    pub scores: Vec<f64>,
}

/// Evaluate many stimuli, one result per input in input order.
pub fn evaluate_batch(
    inputs: &[StimulusInput],
    config: &CoherenceConfig,
) -> Vec<Result<CoherenceReport>> {
    let run = |input: &StimulusInput| {
        evaluate_stimulus(&input.stimulus, &input.labels, &input.scores, config)
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        inputs.par_iter().map(run).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(run).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(cutoff: f64) -> CoherenceConfig {
        CoherenceConfig {
            scaling: ScoreScaling::Identity,
            ..CoherenceConfig::with_cutoff(cutoff)
        }
    }

    fn four_labels() -> LabelSet {
        LabelSet::new(["a", "b", "c", "d"]).unwrap()
    }

    #[test]
    fn first_label_hub_fails() {
        // a close to everything, b c d far from each other
        let scores = [0.9, 0.9, 0.9, 0.1, 0.1, 0.1];
        let report = evaluate_stimulus("s", &four_labels(), &scores, &identity(0.3)).unwrap();
        // {a,b} at 0.1; c and d only join at 0.5 and above
        assert_eq!(report.clusters, vec![1, 1, 2, 3]);
        assert_eq!(report.max_cluster_size, 2);
        assert_eq!(report.max_pct, 50.0);
        assert!(!report.is_pass());
        assert_eq!(report.verdict.evidence().pass_pct, 75.0);
    }

    #[test]
    fn uniformly_similar_labels_pass() {
        let scores = [0.95, 0.95, 0.95, 0.9, 0.9, 0.9];
        let report = evaluate_stimulus("s", &four_labels(), &scores, &identity(0.2)).unwrap();
        // merges at 0.05, 0.075, and 0.25 / 3
        assert_eq!(report.membership, BTreeMap::from([(1, 4)]));
        assert_eq!(report.max_pct, 100.0);
        assert!(report.is_pass());
    }

    #[test]
    fn min_max_scaling_can_change_the_verdict() {
        // [0.95 x3, 0.9 x3] stretches to [1 x3, 0 x3]: c and d end up far apart
        let scores = [0.95, 0.95, 0.95, 0.9, 0.9, 0.9];
        let report =
            evaluate_stimulus("s", &four_labels(), &scores, &CoherenceConfig::with_cutoff(0.2))
                .unwrap();
        assert_eq!(report.max_pct, 50.0);
        assert!(!report.is_pass());
    }

    #[test]
    fn split_labels_fail() {
        // similarities: ab 0.9, ac 0.5, ad 0.1, bc 0.5, bd 0.1, cd 0.9
        let scores = [0.9, 0.5, 0.1, 0.5, 0.1, 0.9];
        let report = evaluate_stimulus("s1", &four_labels(), &scores, &identity(0.3)).unwrap();
        // {a,b} and {c,d} join at 0.1; the two pairs only meet at 0.7
        assert_eq!(report.clusters, vec![1, 1, 2, 2]);
        assert_eq!(report.max_cluster_size, 2);
        assert!((report.max_pct - 50.0).abs() < 1e-12);
        assert!(!report.is_pass());
        assert_eq!(report.verdict.label(), "fail");
    }

    #[test]
    fn chain_with_distant_label_fails() {
        // ab close, c at 0.5 from both, d far from all
        let scores = [0.9, 0.5, 0.1, 0.5, 0.1, 0.2];
        let report = evaluate_stimulus("s1", &four_labels(), &scores, &identity(0.3)).unwrap();
        assert_eq!(report.membership, BTreeMap::from([(1, 2), (2, 1), (3, 1)]));
        assert_eq!(report.max_cluster_id, 1);
        assert!((report.max_pct - 50.0).abs() < 1e-12);
        assert!(!report.is_pass());
    }

    #[test]
    fn tight_labels_pass() {
        let scores = [0.95, 0.90, 0.92, 0.93, 0.91, 0.94];
        let report = evaluate_stimulus("s2", &four_labels(), &scores, &identity(0.2)).unwrap();
        assert_eq!(report.n_clusters(), 1);
        assert_eq!(report.max_cluster_size, 4);
        assert_eq!(report.max_pct, 100.0);
        assert!(report.is_pass());
        assert!(report.cophenetic_coefficient > 0.0 && report.cophenetic_coefficient <= 1.0);
        assert_eq!(
            report.verdict.evidence().cophenetic_coefficient,
            report.cophenetic_coefficient
        );
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        // a,b,c tight; d far: 3 of 4 labels = exactly 75%
        let scores = [0.9, 0.9, 0.0, 0.9, 0.0, 0.0];
        let report = evaluate_stimulus("s", &four_labels(), &scores, &identity(0.3)).unwrap();
        assert_eq!(report.max_pct, 75.0);
        assert!(report.is_pass());
        assert_eq!(report.dominant_members(), vec![0, 1, 2]);
    }

    #[test]
    fn min_max_scaling_stretches_scores() {
        // after scaling: 1.0, 0.0, 0.5 -> distances 0.0, 1.0, 0.5
        let labels = LabelSet::new(["x", "y", "z"]).unwrap();
        let report =
            evaluate_stimulus("s", &labels, &[4.0, 2.0, 3.0], &CoherenceConfig::with_cutoff(0.6))
                .unwrap();
        // x,y at 0; z joins at (1.0 + 0.5) / 2 = 0.75
        assert_eq!(report.clusters, vec![1, 1, 2]);
        assert!(!report.is_pass());
    }

    #[test]
    fn shape_mismatch_names_stimulus() {
        let labels = LabelSet::new((0..20).map(|i| format!("l{}", i))).unwrap();
        let scores = vec![0.5; 185];
        let err = evaluate_stimulus("stim-7", &labels, &scores, &identity(0.3)).unwrap_err();
        assert_eq!(err.stimulus(), Some("stim-7"));
        assert_eq!(
            err.kind(),
            &SynonymyError::ShapeMismatch {
                expected: 190,
                observed: 185,
                labels: 20
            }
        );
        assert_eq!(
            err.to_string(),
            "stimulus stim-7: expected 190 distance values for 20 labels, got 185"
        );
    }

    #[test]
    fn constant_scores_are_degenerate() {
        let err = evaluate_stimulus("s", &four_labels(), &[0.7; 6], &CoherenceConfig::default())
            .unwrap_err();
        assert!(matches!(err.kind(), SynonymyError::DegenerateRange { .. }));
    }

    #[test]
    fn identity_scaling_rejects_out_of_range() {
        let err = evaluate_stimulus("s", &four_labels(), &[1.5; 6], &identity(0.3)).unwrap_err();
        assert!(matches!(err.kind(), SynonymyError::InvalidInput(_)));
    }

    #[test]
    fn single_label_rejected() {
        let labels = LabelSet::new(["only"]).unwrap();
        assert!(evaluate_stimulus("s", &labels, &[], &identity(0.3)).is_err());
    }

    #[test]
    fn evaluate_rejects_short_linkage() {
        let distances = DistanceVector::from_condensed(vec![0.1, 0.2, 0.3], 3).unwrap();
        let full = average_linkage(&distances).unwrap();
        let short = LinkageMatrix::from_rows(full.merges()[..1].to_vec(), 3);
        let err = evaluate("s", &short, &distances, &identity(0.3)).unwrap_err();
        assert_eq!(err.stimulus(), Some("s"));
        assert_eq!(
            err.kind(),
            &SynonymyError::LinkageShape {
                rows: 1,
                expected: 2,
                labels: 3
            }
        );
    }

    #[test]
    fn config_validation() {
        assert!(CoherenceConfig::with_cutoff(-1.0).validate().is_err());
        let bad_pct = CoherenceConfig {
            pass_pct: 0.0,
            ..CoherenceConfig::default()
        };
        assert!(bad_pct.validate().is_err());
        assert!(CoherenceConfig::default().validate().is_ok());
    }

    #[test]
    fn batch_keeps_input_order() {
        let inputs = vec![
            StimulusInput {
                stimulus: "tight".into(),
                labels: four_labels(),
                scores: vec![0.95, 0.90, 0.92, 0.93, 0.91, 0.94],
            },
            StimulusInput {
                stimulus: "broken".into(),
                labels: four_labels(),
                scores: vec![0.5; 3],
            },
            StimulusInput {
                stimulus: "split".into(),
                labels: four_labels(),
                scores: vec![0.9, 0.5, 0.1, 0.5, 0.1, 0.9],
            },
        ];
        let results = evaluate_batch(&inputs, &identity(0.2));
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().is_pass());
        assert_eq!(results[1].as_ref().unwrap_err().stimulus(), Some("broken"));
        assert_eq!(results[2].as_ref().unwrap().stimulus, "split");
    }

    #[test]
    fn render_layout() {
        let scores = [0.9, 0.5, 0.1, 0.5, 0.1, 0.2];
        let report = evaluate_stimulus("s1", &four_labels(), &scores, &identity(0.3)).unwrap();
        let text = report.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-".repeat(81));
        assert_eq!(lines[1], "Agglomerative Hierarchical Clustering Statistics");
        assert!(lines.contains(&"Cluster: Count"));
        assert!(lines.contains(&"1: 2"));
        assert!(lines.contains(&"3: 1"));
        assert!(lines.contains(&"Cluster 1 with 2 members has 50% of the membership."));
        assert_eq!(*lines.last().unwrap(), "Cluster coherence test: fail");
    }

    #[test]
    fn summary_and_score() {
        let scores = [0.95, 0.90, 0.92, 0.93, 0.91, 0.94];
        let report = evaluate_stimulus("s2", &four_labels(), &scores, &identity(0.2)).unwrap();
        assert_eq!(report.score(), 100.0);
        assert!(report.summary().starts_with("CoherenceReport: s2 pass"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serde_roundtrip() {
        let config = identity(0.3);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"identity\""));
        let back: CoherenceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
