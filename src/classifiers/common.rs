//! Helpers shared by the built-in classifiers.

use crate::blocks::{Block, BlockId, BlockKind};
use crate::classification::{CandidateDraft, ClassificationResult, ClassifierEnv, Label, ScoreDetail};
use crate::rules::{RuleSet, RuleVerdict};
use crate::solver::{ConstraintModel, SolveStatus, Var};

/// Score every live, unclaimed block of the given kinds with `rules` and
/// keep those reaching the configured score floor.
pub(crate) fn score_blocks<'r>(
    label: Label,
    result: &'r ClassificationResult,
    env: &ClassifierEnv<'_>,
    kinds: &[BlockKind],
    rules: &RuleSet,
) -> Vec<(&'r Block, CandidateDraft)> {
    let ctx = env.rule_context(result);
    let floor = env.config.min_candidate_score;
    let mut scored = Vec::new();
    for block in result.get_unconsumed_blocks(kinds) {
        match rules.evaluate(block, &ctx) {
            RuleVerdict::Rejected { rule } => {
                log::trace!("{}: block {} rejected by rule '{}'", label, block.id(), rule);
            }
            RuleVerdict::Scored { score, .. } if score < floor => {
                log::trace!("{}: block {} scored {:.3}, below {:.3}", label, block.id(), score, floor);
            }
            RuleVerdict::Scored { score, components } => {
                let draft =
                    CandidateDraft::from_blocks(&[block], score, ScoreDetail::from_components(components));
                scored.push((block, draft));
            }
        }
    }
    scored
}

/// Solve `model` and reject every draft whose variable was not selected.
///
/// `vars[i]` is the variable of `drafts[i]`.
pub(crate) fn apply_selection(
    label: Label,
    drafts: &mut [CandidateDraft],
    vars: &[Var],
    model: &ConstraintModel,
    env: &ClassifierEnv<'_>,
) {
    if drafts.is_empty() {
        return;
    }
    let solution = model.solve(&env.config.solver);
    if solution.status == SolveStatus::Infeasible {
        log::debug!("{}: constraint model infeasible, nothing selected", label);
    }
    for (draft, &var) in drafts.iter_mut().zip(vars) {
        if !solution.is_selected(var) {
            let reason = if solution.has_assignment() {
                format!("not selected by {} constraints", label)
            } else {
                format!("{} constraints infeasible", label)
            };
            draft.reject(reason);
        }
    }
}

/// Block ids helper for [`ConstraintModel::exclusive_blocks`].
pub(crate) fn block_claims<'d>(
    drafts: &'d [CandidateDraft],
    vars: &'d [Var],
) -> impl Iterator<Item = (Var, &'d [BlockId])> {
    vars.iter()
        .copied()
        .zip(drafts.iter().map(|d| d.source_blocks.as_slice()))
}
