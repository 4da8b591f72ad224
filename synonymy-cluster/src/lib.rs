//! Coherence validation of free-response label sets.
//!
//! - **Labels** — label sets and the condensed pair ordering
//! - **Distances** — similarity to distance transform
//! - **Linkage** — average-linkage (UPGMA) dendrograms
//! - **Cut** — flat clusters at a height, cophenetic correlation
//! - **Coherence** — dominant-cluster verdict and the per-stimulus pipeline
//! - **Weights / Lexicon** — top-weighted label per coherent stimulus

pub mod coherence;
pub mod cut;
pub mod distance;
pub mod labels;
pub mod lexicon;
pub mod linkage;
pub mod weights;

pub use coherence::{
    evaluate, evaluate_batch, evaluate_stimulus, CoherenceConfig, CoherenceEvidence,
    CoherenceReport, ScoreScaling, StimulusInput,
};
pub use cut::{cophenetic_correlation, cophenetic_distances, cut, ClusterAssignment};
pub use distance::DistanceVector;
pub use labels::{condensed_index, pair_count, LabelSet};
pub use lexicon::{Lexicon, LexiconEntry};
pub use linkage::{average_linkage, LinkageMatrix, MergeRecord};
pub use weights::{label_weights, LabelWeight};
