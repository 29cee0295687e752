//! Candidates: scored hypotheses about what a set of blocks is.

use super::Label;
use crate::blocks::{Block, BlockId};
use crate::elements::Element;
use crate::geometry::Rect;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page-unique, monotonically assigned candidate id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u32);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Structured breakdown of how a candidate scored.
///
/// `components` are named partial scores. `links` name other candidates the
/// hypothesis is built from (a part's count and image, a step's number and
/// diagram, ...). Only the classifier that produced the candidate interprets
/// the keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetail {
    /// Named partial scores, in insertion order
    pub components: IndexMap<String, f64>,
    /// Named references to other candidates, in insertion order
    pub links: IndexMap<String, Vec<CandidateId>>,
}

impl ScoreDetail {
    /// An empty breakdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from rule components.
    pub fn from_components(components: IndexMap<String, f64>) -> Self {
        Self {
            components,
            links: IndexMap::new(),
        }
    }

    /// Record a partial score.
    pub fn with_component(mut self, name: impl Into<String>, score: f64) -> Self {
        self.components.insert(name.into(), score);
        self
    }

    /// Record a single linked candidate.
    pub fn with_link(mut self, name: impl Into<String>, id: CandidateId) -> Self {
        self.links.entry(name.into()).or_default().push(id);
        self
    }

    /// Record a list of linked candidates.
    pub fn with_links(mut self, name: impl Into<String>, ids: Vec<CandidateId>) -> Self {
        self.links.entry(name.into()).or_default().extend(ids);
        self
    }

    /// The first candidate linked under `name`.
    pub fn link(&self, name: &str) -> Option<CandidateId> {
        self.links.get(name).and_then(|ids| ids.first().copied())
    }

    /// Every candidate linked under `name`.
    pub fn linked(&self, name: &str) -> &[CandidateId] {
        self.links.get(name).map_or(&[], |ids| ids.as_slice())
    }

    /// Every linked candidate, across all names.
    pub fn all_links(&self) -> impl Iterator<Item = CandidateId> + '_ {
        self.links.values().flatten().copied()
    }
}

/// A hypothesis that some blocks represent an element with a given label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Page-unique id
    pub id: CandidateId,
    /// Label this candidate would produce
    pub label: Label,
    /// Bounding box
    pub rect: Rect,
    /// Score in `[0, 1]`
    pub score: f64,
    /// How the score came about
    pub score_detail: ScoreDetail,
    /// Blocks claimed as evidence, consumed when the candidate is built
    pub source_blocks: Vec<BlockId>,
    /// The built element, once built
    pub constructed: Option<Element>,
    /// Why the candidate was rejected, if it was
    pub failure_reason: Option<String>,
}

impl Candidate {
    /// Whether the candidate is still eligible: not failed.
    pub fn is_valid(&self) -> bool {
        self.failure_reason.is_none()
    }

    /// Whether the candidate has been built.
    pub fn is_built(&self) -> bool {
        self.constructed.is_some()
    }

    /// Candidates without source blocks are composites or synthetic.
    pub fn is_synthetic(&self) -> bool {
        self.source_blocks.is_empty()
    }
}

/// A candidate as emitted by a classifier's scoring pass, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDraft {
    /// Bounding box
    pub rect: Rect,
    /// Score in `[0, 1]`
    pub score: f64,
    /// How the score came about
    pub score_detail: ScoreDetail,
    /// Blocks claimed as evidence
    pub source_blocks: Vec<BlockId>,
    /// Rejection recorded during scoring (e.g. lost a selection)
    pub failure_reason: Option<String>,
}

impl CandidateDraft {
    /// A candidate claiming exactly the given blocks; its rectangle is their
    /// union.
    pub fn from_blocks(blocks: &[&Block], score: f64, score_detail: ScoreDetail) -> Self {
        let rects: Vec<Rect> = blocks.iter().map(|b| b.rect()).collect();
        Self {
            rect: Rect::union_all(&rects).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0)),
            score,
            score_detail,
            source_blocks: blocks.iter().map(|b| b.id()).collect(),
            failure_reason: None,
        }
    }

    /// A candidate built purely from other candidates.
    pub fn synthetic(rect: Rect, score: f64, score_detail: ScoreDetail) -> Self {
        Self {
            rect,
            score,
            score_detail,
            source_blocks: Vec::new(),
            failure_reason: None,
        }
    }

    /// Mark the draft as rejected.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.failure_reason = Some(reason.into());
    }
}

/// A build step decided the hypothesis does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    /// Human readable reason, stored on the candidate
    pub reason: String,
}

impl CandidateFailure {
    /// Create a failure.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}
