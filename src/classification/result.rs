//! The per-page classification ledger.
//!
//! A [`ClassificationResult`] owns everything known about one page while it
//! is being classified: the block arena, every candidate any classifier has
//! proposed, which blocks have been claimed by a built candidate and which
//! have been suppressed as near-duplicates. Classifiers only communicate
//! through it.
//!
//! Blocks are never mutated or removed. Consumption and suppression are
//! claims recorded in side tables keyed by [`BlockId`].

use super::candidate::{Candidate, CandidateDraft, CandidateId};
use super::Label;
use crate::blocks::{Block, BlockId, BlockKind};
use crate::elements::Element;
use crate::geometry::Rect;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mutable classification state of a single page.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    page_index: usize,
    page_rect: Rect,
    blocks: Vec<Block>,
    block_index: BTreeMap<BlockId, usize>,
    candidates: Vec<Candidate>,
    by_label: BTreeMap<Label, Vec<CandidateId>>,
    consumed: BTreeMap<BlockId, CandidateId>,
    removed: BTreeMap<BlockId, String>,
}

impl ClassificationResult {
    /// Create a ledger over a page's blocks.
    ///
    /// Block ids are expected to be unique; if one repeats, only its first
    /// occurrence can be looked up by id.
    pub fn new(page_index: usize, page_rect: Rect, blocks: Vec<Block>) -> Self {
        let mut block_index = BTreeMap::new();
        for (i, block) in blocks.iter().enumerate() {
            block_index.entry(block.id()).or_insert(i);
        }
        Self {
            page_index,
            page_rect,
            blocks,
            block_index,
            candidates: Vec::new(),
            by_label: BTreeMap::new(),
            consumed: BTreeMap::new(),
            removed: BTreeMap::new(),
        }
    }

    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Page rectangle.
    pub fn page_rect(&self) -> Rect {
        self.page_rect
    }

    /// Every block of the page, including suppressed ones.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.block_index.get(&id).map(|&i| &self.blocks[i])
    }

    /// Blocks not suppressed as duplicates.
    pub fn live_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| !self.removed.contains_key(&b.id()))
    }

    /// Live blocks of the given kinds that no built candidate has claimed.
    ///
    /// An empty `kinds` slice means every kind.
    pub fn get_unconsumed_blocks(&self, kinds: &[BlockKind]) -> Vec<&Block> {
        self.live_blocks()
            .filter(|b| kinds.is_empty() || kinds.contains(&b.kind()))
            .filter(|b| !self.consumed.contains_key(&b.id()))
            .collect()
    }

    /// Record a new candidate and return its id.
    pub fn add_candidate(&mut self, label: Label, draft: CandidateDraft) -> CandidateId {
        let id = CandidateId(self.candidates.len() as u32);
        self.candidates.push(Candidate {
            id,
            label,
            rect: draft.rect,
            score: draft.score.clamp(0.0, 1.0),
            score_detail: draft.score_detail,
            source_blocks: draft.source_blocks,
            constructed: None,
            failure_reason: draft.failure_reason,
        });
        self.by_label.entry(label).or_default().push(id);
        id
    }

    /// Look up a candidate.
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id.0 as usize)
    }

    /// Every candidate of the page, in creation order.
    pub fn all_candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Every candidate recorded for a label, in creation order.
    pub fn get_candidates(&self, label: Label) -> Vec<&Candidate> {
        self.by_label
            .get(&label)
            .map(|ids| ids.iter().filter_map(|&id| self.candidate(id)).collect())
            .unwrap_or_default()
    }

    /// Candidates for a label with a score of at least `min_score`, best
    /// first. Equal scores keep creation order.
    pub fn get_scored_candidates(
        &self,
        label: Label,
        valid_only: bool,
        min_score: f64,
    ) -> Vec<&Candidate> {
        let mut found: Vec<&Candidate> = self
            .get_candidates(label)
            .into_iter()
            .filter(|c| !valid_only || c.is_valid())
            .filter(|c| c.score >= min_score)
            .collect();
        found.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        found
    }

    /// The best valid candidate of `label` that claims `block`.
    pub fn get_candidate_for_block(&self, block: BlockId, label: Label) -> Option<&Candidate> {
        self.get_scored_candidates(label, true, 0.0)
            .into_iter()
            .find(|c| c.source_blocks.contains(&block))
    }

    /// Reject a candidate. A candidate that is already built keeps its
    /// element; the first recorded reason wins.
    pub fn fail_candidate(&mut self, id: CandidateId, reason: impl Into<String>) {
        if let Some(c) = self.candidates.get_mut(id.0 as usize) {
            if c.constructed.is_some() || c.failure_reason.is_some() {
                return;
            }
            let reason = reason.into();
            log::trace!("page {}: {} {} rejected: {}", self.page_index, c.label, id, reason);
            c.failure_reason = Some(reason);
        }
    }

    /// Why a candidate was rejected, if it was.
    pub fn get_failure_reason(&self, id: CandidateId) -> Option<&str> {
        self.candidate(id).and_then(|c| c.failure_reason.as_deref())
    }

    /// Store the built element and claim the candidate's source blocks.
    pub(crate) fn record_built(&mut self, id: CandidateId, element: Element) {
        let Some(c) = self.candidates.get_mut(id.0 as usize) else {
            return;
        };
        for block in &c.source_blocks {
            self.consumed.entry(*block).or_insert(id);
        }
        c.constructed = Some(element);
    }

    /// The built element of a candidate.
    pub fn constructed(&self, id: CandidateId) -> Option<&Element> {
        self.candidate(id).and_then(|c| c.constructed.as_ref())
    }

    /// Whether a built candidate has claimed the block.
    pub fn is_consumed(&self, block: BlockId) -> bool {
        self.consumed.contains_key(&block)
    }

    /// The built candidate that claimed the block.
    pub fn consumer_of(&self, block: BlockId) -> Option<CandidateId> {
        self.consumed.get(&block).copied()
    }

    /// Suppress a block as a near-duplicate. The first reason is kept.
    pub fn mark_removed(&mut self, block: BlockId, reason: impl Into<String>) {
        self.removed.entry(block).or_insert_with(|| reason.into());
    }

    /// Whether the block was suppressed.
    pub fn is_removed(&self, block: BlockId) -> bool {
        self.removed.contains_key(&block)
    }

    /// Why the block was suppressed.
    pub fn removal_reason(&self, block: BlockId) -> Option<&str> {
        self.removed.get(&block).map(String::as_str)
    }

    /// Built candidates, in creation order.
    pub fn winners(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_built())
    }

    /// A serializable snapshot for offline review.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut labels = BTreeMap::new();
        for (label, ids) in &self.by_label {
            let entry: &mut LabelSummary = labels.entry(*label).or_default();
            for c in ids.iter().filter_map(|&id| self.candidate(id)) {
                entry.candidates += 1;
                if c.is_built() {
                    entry.built += 1;
                } else if !c.is_valid() {
                    entry.failed += 1;
                }
            }
        }
        Diagnostics {
            page_index: self.page_index,
            block_count: self.blocks.len(),
            labels,
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateSummary {
                    id: c.id,
                    label: c.label,
                    rect: c.rect,
                    score: c.score,
                    source_blocks: c.source_blocks.clone(),
                    built: c.is_built(),
                    failure_reason: c.failure_reason.clone(),
                })
                .collect(),
            removed_blocks: self.removed.clone(),
            consumed_blocks: self.consumed.clone(),
        }
    }
}

/// Per-label candidate counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelSummary {
    /// Candidates proposed
    pub candidates: usize,
    /// Candidates built
    pub built: usize,
    /// Candidates rejected
    pub failed: usize,
}

/// One line of the diagnostic candidate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    /// Candidate id
    pub id: CandidateId,
    /// Label
    pub label: Label,
    /// Bounding box
    pub rect: Rect,
    /// Score
    pub score: f64,
    /// Claimed blocks
    pub source_blocks: Vec<BlockId>,
    /// Whether the candidate was built
    pub built: bool,
    /// Rejection reason
    pub failure_reason: Option<String>,
}

/// Read-only snapshot of a [`ClassificationResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Zero-based page index
    pub page_index: usize,
    /// Number of input blocks
    pub block_count: usize,
    /// Counts per label
    pub labels: BTreeMap<Label, LabelSummary>,
    /// Every candidate
    pub candidates: Vec<CandidateSummary>,
    /// Suppressed blocks and why
    pub removed_blocks: BTreeMap<BlockId, String>,
    /// Claimed blocks and the candidate that claimed them
    pub consumed_blocks: BTreeMap<BlockId, CandidateId>,
}
