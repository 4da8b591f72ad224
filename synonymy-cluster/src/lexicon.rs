//! Lexicon compilation: one representative label per coherent stimulus.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use synonymy_core::{ReportBlock, Reportable, Result, Summarizable, SynonymyError};

use crate::coherence::CoherenceReport;
use crate::weights::LabelWeight;

/// The representative label chosen for one coherent stimulus.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexiconEntry {
    pub stimulus: String,
    pub top_label: String,
    pub top_weight: f64,
    pub cophenetic_coefficient: f64,
    pub max_pct: f64,
}

/// Coherent stimuli and their top-weighted labels, ordered by stimulus id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Build a lexicon from coherence reports and per-stimulus label weights.
    ///
    /// Failing reports are skipped. A passing stimulus must have a non-empty
    /// weight list in `weights`, sorted as produced by
    /// [`label_weights`](crate::weights::label_weights). A stimulus reported
    /// twice is an error.
    pub fn compile(
        reports: &[CoherenceReport],
        weights: &HashMap<String, Vec<LabelWeight>>,
    ) -> Result<Self> {
        let mut by_stimulus: BTreeMap<&str, LexiconEntry> = BTreeMap::new();
        for report in reports {
            if !report.is_pass() {
                debug!(stimulus = %report.stimulus, max_pct = report.max_pct, "skipping incoherent stimulus");
                continue;
            }
            let stimulus = report.stimulus.as_str();
            let ranked = weights
                .get(stimulus)
                .ok_or_else(|| SynonymyError::MissingStimulus(stimulus.to_string()))?;
            let top = ranked.first().ok_or_else(|| {
                SynonymyError::EmptySample("no label weights".into()).for_stimulus(stimulus)
            })?;
            let entry = LexiconEntry {
                stimulus: stimulus.to_string(),
                top_label: top.label.clone(),
                top_weight: top.weight,
                cophenetic_coefficient: report.cophenetic_coefficient,
                max_pct: report.max_pct,
            };
            if by_stimulus.insert(stimulus, entry).is_some() {
                return Err(SynonymyError::InvalidInput(format!(
                    "stimulus {} reported more than once",
                    stimulus
                )));
            }
        }
        Ok(Self {
            entries: by_stimulus.into_values().collect(),
        })
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn get(&self, stimulus: &str) -> Option<&LexiconEntry> {
        self.entries
            .binary_search_by(|e| e.stimulus.as_str().cmp(stimulus))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Summarizable for Lexicon {
    fn summary(&self) -> String {
        format!("Lexicon: {} coherent stimuli", self.entries.len())
    }
}

impl Reportable for Lexicon {
    fn render(&self) -> String {
        ReportBlock::new("Lexicon")
            .field("Entries", self.entries.len())
            .list(
                "Stimulus: Label (weight, % in largest cluster, cophenetic)",
                self.entries.iter().map(|e| {
                    format!(
                        "{}: {} ({:.4}, {}%, {:.4})",
                        e.stimulus, e.top_label, e.top_weight, e.max_pct, e.cophenetic_coefficient
                    )
                }),
            )
            .render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coherence::{evaluate_stimulus, CoherenceConfig, ScoreScaling};
    use crate::labels::LabelSet;
    use crate::weights::label_weights;

    const TIGHT: [f64; 6] = [0.95, 0.90, 0.92, 0.93, 0.91, 0.94];
    const SPLIT: [f64; 6] = [0.9, 0.5, 0.1, 0.5, 0.1, 0.9];

    fn config() -> CoherenceConfig {
        CoherenceConfig {
            scaling: ScoreScaling::Identity,
            ..CoherenceConfig::with_cutoff(0.2)
        }
    }

    fn labels() -> LabelSet {
        LabelSet::new(["a", "b", "c", "d"]).unwrap()
    }

    fn report(stimulus: &str, scores: &[f64]) -> CoherenceReport {
        evaluate_stimulus(stimulus, &labels(), scores, &config()).unwrap()
    }

    fn weights_for(stimuli: &[(&str, &[f64])]) -> HashMap<String, Vec<LabelWeight>> {
        stimuli
            .iter()
            .map(|(id, scores)| (id.to_string(), label_weights(&labels(), scores).unwrap()))
            .collect()
    }

    #[test]
    fn keeps_passing_stimuli_in_id_order() {
        let reports = vec![report("zeta", &TIGHT), report("beta", &SPLIT), report("alpha", &TIGHT)];
        let weights = weights_for(&[("zeta", &TIGHT), ("beta", &SPLIT), ("alpha", &TIGHT)]);
        let lexicon = Lexicon::compile(&reports, &weights).unwrap();
        let ids: Vec<&str> = lexicon.entries().iter().map(|e| e.stimulus.as_str()).collect();
        assert_eq!(ids, ["alpha", "zeta"]);
        // a: 0.95+0.90+0.92, b: 0.95+0.93+0.91, c: 0.90+0.93+0.94, d: 0.92+0.91+0.94
        let entry = lexicon.get("alpha").unwrap();
        assert_eq!(entry.top_label, "b");
        assert!((entry.top_weight - 2.79).abs() < 1e-12);
        assert_eq!(entry.max_pct, 100.0);
        assert!(lexicon.get("beta").is_none());
    }

    #[test]
    fn missing_weights_is_error() {
        let reports = vec![report("alpha", &TIGHT)];
        let err = Lexicon::compile(&reports, &HashMap::new()).unwrap_err();
        assert_eq!(err, SynonymyError::MissingStimulus("alpha".into()));
    }

    #[test]
    fn failing_stimulus_needs_no_weights() {
        let reports = vec![report("beta", &SPLIT)];
        let lexicon = Lexicon::compile(&reports, &HashMap::new()).unwrap();
        assert!(lexicon.is_empty());
    }

    #[test]
    fn empty_weights_is_error() {
        let reports = vec![report("alpha", &TIGHT)];
        let weights = HashMap::from([("alpha".to_string(), Vec::new())]);
        let err = Lexicon::compile(&reports, &weights).unwrap_err();
        assert_eq!(err.stimulus(), Some("alpha"));
        assert!(matches!(err.kind(), SynonymyError::EmptySample(_)));
    }

    #[test]
    fn duplicate_stimulus_is_error() {
        let reports = vec![report("alpha", &TIGHT), report("alpha", &TIGHT)];
        let weights = weights_for(&[("alpha", &TIGHT)]);
        assert!(matches!(
            Lexicon::compile(&reports, &weights),
            Err(SynonymyError::InvalidInput(_))
        ));
    }

    #[test]
    fn render_lists_entries() {
        let reports = vec![report("alpha", &TIGHT)];
        let weights = weights_for(&[("alpha", &TIGHT)]);
        let lexicon = Lexicon::compile(&reports, &weights).unwrap();
        let text = lexicon.render();
        assert!(text.contains("Entries: 1\n"));
        assert!(text.contains("alpha: b (2.7900, 100%, "));
        assert_eq!(lexicon.summary(), "Lexicon: 1 coherent stimuli");
    }
}
