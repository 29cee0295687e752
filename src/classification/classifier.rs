//! The classifier contract and memoized element building.
//!
//! Classification of a page runs in two phases per classifier:
//!
//! 1. `score`: a pure function of the blocks and of the candidates of the
//!    labels the classifier requires. It returns drafts; the engine records
//!    them in the [`ClassificationResult`].
//! 2. `build`: turns one candidate into an [`Element`]. A build may ask the
//!    [`BuildContext`] to build candidates of required labels first.
//!
//! [`BuildContext::build`] is memoized: building a candidate twice returns
//! the same element, and its source blocks are claimed exactly once. A
//! candidate whose blocks were already claimed by another built candidate
//! fails instead of double-claiming them.

use super::candidate::{Candidate, CandidateDraft, CandidateFailure, CandidateId};
use super::scheduler::Schedule;
use super::{ClassificationResult, Label};
use crate::config::ClassifierConfig;
use crate::elements::Element;
use crate::hints::FontSizeHints;
use crate::rules::RuleContext;
use std::collections::BTreeSet;

/// Read-only inputs shared by every classifier on a page.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierEnv<'a> {
    /// Engine configuration
    pub config: &'a ClassifierConfig,
    /// Document font-size hints
    pub hints: &'a FontSizeHints,
}

impl<'a> ClassifierEnv<'a> {
    /// Create an environment.
    pub fn new(config: &'a ClassifierConfig, hints: &'a FontSizeHints) -> Self {
        Self { config, hints }
    }

    /// Context handed to rules while scoring blocks of `result`.
    pub fn rule_context(&self, result: &ClassificationResult) -> RuleContext<'a> {
        RuleContext {
            page_rect: result.page_rect(),
            page_index: result.page_index(),
            hints: self.hints,
        }
    }
}

/// One semantic classifier.
///
/// Implementations hold no per-page state; everything they learn about a
/// page lives in the [`ClassificationResult`].
pub trait Classifier: Send + Sync {
    /// The label this classifier produces.
    fn output(&self) -> Label;

    /// Labels whose candidates this classifier reads.
    fn requires(&self) -> &[Label] {
        &[]
    }

    /// Propose candidates for the page.
    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft>;

    /// Build the element of one of this classifier's candidates.
    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Element, CandidateFailure>;
}

/// Mutable access to a page during the build phase.
pub struct BuildContext<'a> {
    result: &'a mut ClassificationResult,
    schedule: &'a Schedule,
    env: ClassifierEnv<'a>,
    in_progress: BTreeSet<CandidateId>,
}

impl<'a> BuildContext<'a> {
    /// Create a build context over a scored page.
    pub fn new(
        result: &'a mut ClassificationResult,
        schedule: &'a Schedule,
        env: ClassifierEnv<'a>,
    ) -> Self {
        Self {
            result,
            schedule,
            env,
            in_progress: BTreeSet::new(),
        }
    }

    /// The page ledger.
    pub fn result(&self) -> &ClassificationResult {
        self.result
    }

    /// Shared classifier inputs.
    pub fn env(&self) -> &ClassifierEnv<'a> {
        &self.env
    }

    /// Reject a candidate without building it.
    pub fn fail(&mut self, id: CandidateId, reason: impl Into<String>) {
        self.result.fail_candidate(id, reason);
    }

    /// Build a candidate, or return the element it was already built into.
    pub fn build(&mut self, id: CandidateId) -> Result<Element, CandidateFailure> {
        let candidate = match self.result.candidate(id) {
            Some(c) => c,
            None => return Err(CandidateFailure::new(format!("unknown candidate {}", id))),
        };
        if let Some(element) = &candidate.constructed {
            return Ok(element.clone());
        }
        if let Some(reason) = &candidate.failure_reason {
            return Err(CandidateFailure::new(reason.clone()));
        }
        if self.in_progress.contains(&id) {
            return Err(CandidateFailure::new(format!("{} is already being built", id)));
        }
        let candidate = candidate.clone();

        if let Some(reason) = self.claimed_elsewhere(&candidate) {
            self.result.fail_candidate(id, reason.clone());
            return Err(CandidateFailure::new(reason));
        }

        let schedule: &'a Schedule = self.schedule;
        let Some(classifier) = schedule.get(candidate.label) else {
            let reason = format!("no classifier registered for {}", candidate.label);
            self.result.fail_candidate(id, reason.clone());
            return Err(CandidateFailure::new(reason));
        };

        self.in_progress.insert(id);
        let built = classifier.build(&candidate, self);
        self.in_progress.remove(&id);

        match built {
            Ok(element) => {
                // Children built along the way may have claimed our blocks.
                if let Some(reason) = self.claimed_elsewhere(&candidate) {
                    self.result.fail_candidate(id, reason.clone());
                    return Err(CandidateFailure::new(reason));
                }
                self.result.record_built(id, element.clone());
                Ok(element)
            }
            Err(failure) => {
                self.result.fail_candidate(id, failure.reason.clone());
                Err(failure)
            }
        }
    }

    /// Build a candidate and narrow the element to its concrete type.
    pub fn build_as<T>(&mut self, id: CandidateId) -> Result<T, CandidateFailure>
    where
        T: TryFrom<Element, Error = Element>,
    {
        let element = self.build(id)?;
        T::try_from(element).map_err(|other| {
            CandidateFailure::new(format!("{} built into an unexpected {}", id, other.label()))
        })
    }

    /// Build every listed candidate, keeping the ones that succeed.
    pub fn build_all<T>(&mut self, ids: &[CandidateId]) -> Vec<T>
    where
        T: TryFrom<Element, Error = Element>,
    {
        ids.iter().filter_map(|&id| self.build_as(id).ok()).collect()
    }

    fn claimed_elsewhere(&self, candidate: &Candidate) -> Option<String> {
        candidate.source_blocks.iter().find_map(|&block| {
            self.result
                .consumer_of(block)
                .filter(|&owner| owner != candidate.id)
                .map(|owner| format!("block {} already claimed by {}", block, owner))
        })
    }
}
