//! Classification core: candidates, the per-page ledger, the classifier
//! contract and the passes that run between scoring and assembly.
//!
//! The flow for one page is:
//!
//! 1. [`duplicates::suppress_duplicates`] hides near-identical blocks.
//! 2. Every classifier of the [`Schedule`] scores in dependency order.
//! 3. [`conflicts::resolve_conflicts`] settles blocks claimed under
//!    several labels.
//! 4. The page candidate is built through a [`BuildContext`], which builds
//!    everything below it on demand.

pub mod candidate;
pub mod classifier;
pub mod conflicts;
pub mod duplicates;
pub mod label;
pub mod result;
pub mod scheduler;
pub(crate) mod union_find;

pub use candidate::{Candidate, CandidateDraft, CandidateFailure, CandidateId, ScoreDetail};
pub use classifier::{BuildContext, Classifier, ClassifierEnv};
pub use conflicts::{resolve_conflicts, ConflictConfig};
pub use duplicates::{suppress_duplicates, DuplicateConfig};
pub use label::Label;
pub use result::{ClassificationResult, Diagnostics};
pub use scheduler::Schedule;
