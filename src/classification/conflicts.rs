//! Cross-label conflict resolution.
//!
//! After every classifier has scored, one block may be claimed by candidates
//! of several labels (a lone number can look like a page number and a step
//! number at once). For each such block the strongest candidate per label
//! competes:
//!
//! * if the best score is at least [`ConflictConfig::score_ratio`] times the
//!   runner-up (and the runner-up is non-zero), the best score wins;
//! * otherwise the static [`Label::priority`] decides.
//!
//! Every candidate of a losing label that claims the block is rejected with
//! a reason and kept for diagnostics.

use super::candidate::{Candidate, CandidateId};
use super::{ClassificationResult, Label};
use crate::blocks::BlockId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tuning for conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Minimum best/runner-up score ratio for the score to override priority
    pub score_ratio: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self { score_ratio: 2.0 }
    }
}

/// Pick the winning label among the best candidate of each competing label.
/// Returns `None` when there are no contenders.
pub fn pick_winner(contenders: &[&Candidate], config: &ConflictConfig) -> Option<Label> {
    let mut by_score: Vec<&Candidate> = contenders.to_vec();
    by_score.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
    let top = *by_score.first()?;
    if let Some(second) = by_score.get(1) {
        if second.score > 0.0 && top.score >= config.score_ratio * second.score {
            return Some(top.label);
        }
    }
    by_score
        .iter()
        .max_by_key(|c| c.label.priority())
        .map(|c| c.label)
}

/// Resolve every block claimed under more than one label. Returns the
/// number of candidates rejected.
pub fn resolve_conflicts(result: &mut ClassificationResult, config: &ConflictConfig) -> usize {
    let mut claims: BTreeMap<BlockId, Vec<CandidateId>> = BTreeMap::new();
    for c in result.all_candidates() {
        if c.is_valid() && !c.is_built() {
            for &block in &c.source_blocks {
                claims.entry(block).or_default().push(c.id);
            }
        }
    }

    let mut rejected = 0;
    for (block, ids) in claims {
        // Earlier blocks may already have knocked some claimants out.
        let live: Vec<&Candidate> = ids
            .iter()
            .filter_map(|&id| result.candidate(id))
            .filter(|c| c.is_valid())
            .collect();

        let mut best: BTreeMap<Label, &Candidate> = BTreeMap::new();
        for &c in &live {
            best.entry(c.label)
                .and_modify(|b| {
                    if c.score > b.score {
                        *b = c;
                    }
                })
                .or_insert(c);
        }
        if best.len() < 2 {
            continue;
        }

        let contenders: Vec<&Candidate> = best.values().copied().collect();
        let Some(winner) = pick_winner(&contenders, config) else {
            continue;
        };
        let winner_id = best[&winner].id;
        let losers: Vec<(CandidateId, Label)> = live
            .iter()
            .filter(|c| c.label != winner)
            .map(|c| (c.id, c.label))
            .collect();

        for (id, label) in losers {
            log::trace!(
                "page {}: block {} goes to {} {} over {} {}",
                result.page_index(),
                block,
                winner,
                winner_id,
                label,
                id
            );
            result.fail_candidate(
                id,
                format!("lost block {} to {} {}", block, winner, winner_id),
            );
            rejected += 1;
        }
    }
    rejected
}
