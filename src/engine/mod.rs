//! Page and document classification driver.
//!
//! ```text
//! PageInput
//!     ↓
//! [validation]            missing or degenerate page box, duplicate ids → Skipped
//!     ↓
//! [duplicate suppression] near-identical blocks marked removed
//!     ↓
//! [scoring]               every classifier, in dependency order
//!     ↓
//! [conflict resolution]   one label per block
//!     ↓
//! [assembly]              memoized build of the page candidate
//!     ↓
//! Page element + ClassificationResult ledger
//! ```
//!
//! Pages share nothing but the immutable font-size hints, so
//! [`ClassificationEngine::classify_document`] can process them in parallel
//! when the `parallel` feature is enabled.

use crate::blocks::PageInput;
use crate::classification::{
    resolve_conflicts, suppress_duplicates, BuildContext, ClassificationResult, Classifier,
    ClassifierEnv, Label, Schedule,
};
use crate::classifiers::default_classifiers;
use crate::config::ClassifierConfig;
use crate::elements::Page;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::hints::FontSizeHints;
use std::collections::BTreeSet;

/// What happened to one page.
#[derive(Debug)]
#[allow(clippy::large_enum_variant)]
pub enum PageOutcome {
    /// The page was classified.
    Classified {
        /// Candidate ledger, for diagnostics
        result: ClassificationResult,
        /// The assembled page tree
        page: Page,
    },
    /// The page could not be classified.
    Skipped {
        /// Zero-based page index
        page_index: usize,
        /// Why it was skipped
        reason: String,
    },
}

impl PageOutcome {
    /// Zero-based index of the page.
    pub fn page_index(&self) -> usize {
        match self {
            PageOutcome::Classified { page, .. } => page.page_index,
            PageOutcome::Skipped { page_index, .. } => *page_index,
        }
    }

    /// The page tree, if the page was classified.
    pub fn page(&self) -> Option<&Page> {
        match self {
            PageOutcome::Classified { page, .. } => Some(page),
            PageOutcome::Skipped { .. } => None,
        }
    }

    /// The candidate ledger, if the page was classified.
    pub fn result(&self) -> Option<&ClassificationResult> {
        match self {
            PageOutcome::Classified { result, .. } => Some(result),
            PageOutcome::Skipped { .. } => None,
        }
    }

    /// The skip reason, if the page was skipped.
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            PageOutcome::Classified { .. } => None,
            PageOutcome::Skipped { reason, .. } => Some(reason),
        }
    }
}

/// Outcome of classifying a whole document.
#[derive(Debug)]
pub struct DocumentReport {
    /// Hints computed from every page
    pub hints: FontSizeHints,
    /// One outcome per input page, in input order
    pub outcomes: Vec<PageOutcome>,
}

impl DocumentReport {
    /// Number of classified pages.
    pub fn classified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.page().is_some()).count()
    }

    /// Number of skipped pages.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.classified()
    }

    /// The classified pages, in input order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.outcomes.iter().filter_map(PageOutcome::page)
    }
}

/// Classifies pages with a fixed set of classifiers.
///
/// The dependency graph is checked once, at construction.
#[derive(Debug)]
pub struct ClassificationEngine {
    config: ClassifierConfig,
    schedule: Schedule,
}

impl ClassificationEngine {
    /// Create an engine with the built-in classifiers.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let classifiers = default_classifiers(&config)?;
        Self::with_classifiers(config, classifiers)
    }

    /// Create an engine with a custom classifier set.
    ///
    /// The set must contain a classifier for [`Label::Page`]; it is the root
    /// of every page tree.
    pub fn with_classifiers(config: ClassifierConfig, classifiers: Vec<Box<dyn Classifier>>) -> Result<Self> {
        config.validate()?;
        let schedule = Schedule::new(classifiers)?;
        if schedule.get(Label::Page).is_none() {
            return Err(Error::InvalidConfig("no classifier produces the page label".to_string()));
        }
        log::debug!("classifier order: {:?}", schedule.labels());
        Ok(Self { config, schedule })
    }

    /// The engine configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The classifiers in execution order.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Compute font-size hints over a set of pages.
    pub fn hints_for(&self, pages: &[PageInput]) -> FontSizeHints {
        FontSizeHints::from_pages(pages, &self.config.hints)
    }

    /// Classify a single page, with hints computed from that page alone.
    pub fn classify_page(&self, page: &PageInput) -> PageOutcome {
        let hints = self.hints_for(std::slice::from_ref(page));
        self.classify_page_with_hints(page, &hints)
    }

    /// Classify a single page using document-wide hints.
    pub fn classify_page_with_hints(&self, input: &PageInput, hints: &FontSizeHints) -> PageOutcome {
        let page_index = input.page_index;
        let page_rect = match validate_page(input) {
            Ok(rect) => rect,
            Err(err) => {
                let reason = match err {
                    Error::InvalidPage { reason, .. } => reason,
                    other => other.to_string(),
                };
                log::warn!("skipping page {}: {}", page_index, reason);
                return PageOutcome::Skipped { page_index, reason };
            }
        };

        let mut result = ClassificationResult::new(page_index, page_rect, input.blocks.clone());
        let removed = suppress_duplicates(&mut result, &self.config.duplicates);
        if removed > 0 {
            log::debug!("page {}: suppressed {} duplicate blocks", page_index, removed);
        }

        let env = ClassifierEnv::new(&self.config, hints);
        for classifier in self.schedule.iter() {
            let label = classifier.output();
            let drafts = classifier.score(&result, &env);
            let (total, rejected) = (drafts.len(), drafts.iter().filter(|d| d.failure_reason.is_some()).count());
            for draft in drafts {
                result.add_candidate(label, draft);
            }
            log::debug!("page {}: {} produced {} candidates ({} rejected)", page_index, label, total, rejected);
        }

        let lost = resolve_conflicts(&mut result, &self.config.conflicts);
        if lost > 0 {
            log::debug!("page {}: {} candidates lost a block conflict", page_index, lost);
        }

        let winners_before: Vec<_> = result
            .all_candidates()
            .iter()
            .filter(|c| c.is_valid())
            .map(|c| c.id)
            .collect();
        let page_id = result
            .get_scored_candidates(Label::Page, true, 0.0)
            .first()
            .map(|c| c.id);
        let Some(page_id) = page_id else {
            let reason = "no page candidate".to_string();
            log::warn!("skipping page {}: {}", page_index, reason);
            return PageOutcome::Skipped { page_index, reason };
        };

        let built = {
            let mut ctx = BuildContext::new(&mut result, &self.schedule, env);
            ctx.build_as::<Page>(page_id)
        };
        let page = match built {
            Ok(page) => page,
            Err(failure) => {
                let reason = format!("page assembly failed: {}", failure);
                log::warn!("skipping page {}: {}", page_index, reason);
                return PageOutcome::Skipped { page_index, reason };
            }
        };

        let dropped = winners_before
            .iter()
            .filter(|&&id| result.get_failure_reason(id).is_some())
            .count();
        if dropped > 0 {
            log::warn!("page {}: {} selected candidates failed during assembly", page_index, dropped);
        }
        PageOutcome::Classified { result, page }
    }

    /// Classify every page of a document.
    ///
    /// Hints are computed once over all pages. Outcomes keep the input order.
    pub fn classify_document(&self, pages: &[PageInput]) -> DocumentReport {
        let hints = self.hints_for(pages);

        #[cfg(feature = "parallel")]
        let outcomes: Vec<PageOutcome> = {
            use rayon::prelude::*;
            pages
                .par_iter()
                .map(|page| self.classify_page_with_hints(page, &hints))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<PageOutcome> = pages
            .iter()
            .map(|page| self.classify_page_with_hints(page, &hints))
            .collect();

        let report = DocumentReport { hints, outcomes };
        log::info!(
            "classified {} pages, skipped {}",
            report.classified(),
            report.skipped()
        );
        report
    }
}

/// Check that a page can be classified and return its rectangle.
///
/// Rejects a missing, non-finite or empty page rectangle, duplicate block
/// ids and blocks with non-finite coordinates.
pub fn validate_page(input: &PageInput) -> Result<Rect> {
    let invalid = |reason: String| Error::InvalidPage {
        page_index: input.page_index,
        reason,
    };
    let rect = input
        .page_rect
        .ok_or_else(|| invalid("missing page rectangle".to_string()))?;
    if !is_finite(&rect) {
        return Err(invalid(format!("non-finite page rectangle {:?}", rect)));
    }
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return Err(invalid(format!("degenerate page rectangle {:?}", rect)));
    }
    let mut seen = BTreeSet::new();
    for block in &input.blocks {
        if !seen.insert(block.id()) {
            return Err(invalid(format!("duplicate block id {}", block.id())));
        }
        if !is_finite(&block.rect()) {
            return Err(invalid(format!("block {} has a non-finite rectangle", block.id())));
        }
    }
    Ok(rect)
}

fn is_finite(r: &Rect) -> bool {
    [r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite())
}
