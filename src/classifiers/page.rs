//! The page assembler: the single root of a page's element tree.
//!
//! Scoring emits exactly one hypothesis covering the whole page. Building it
//! pulls in the rest of the page in a fixed order:
//!
//! 1. steps, best first, so a stronger step wins any contested block
//! 2. bag markers and dividers
//! 3. parts not already used by a step (catalog parts)
//! 4. the page number and progress bar, skipping any that overlap content
//!    claimed above
//!
//! Every candidate that ends up unused keeps its failure reason in the
//! ledger.

use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, CandidateId, ClassificationResult,
    Classifier, ClassifierEnv, Label, ScoreDetail,
};
use crate::config::{ClassifierConfig, PageConfig};
use crate::elements::{Divider, Element, NewBag, Page, PageCategory, Part, Step};
use crate::error::Result;
use crate::geometry::Rect;

/// Assembles the page tree.
#[derive(Debug)]
pub struct PageClassifier {
    config: PageConfig,
}

impl PageClassifier {
    /// Create the classifier.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config: config.page.clone(),
        })
    }

    fn valid_ids(result: &ClassificationResult, label: Label) -> Vec<CandidateId> {
        result
            .get_scored_candidates(label, true, 0.0)
            .iter()
            .map(|c| c.id)
            .collect()
    }

    /// Build the best candidate of `label` whose rectangle stays clear of
    /// `content`; fail the rest.
    fn build_single<T>(
        ctx: &mut BuildContext<'_>,
        label: Label,
        content: &[Rect],
    ) -> Option<T>
    where
        T: TryFrom<Element, Error = Element>,
    {
        let mut chosen = None;
        for id in Self::valid_ids(ctx.result(), label) {
            if chosen.is_some() {
                ctx.fail(id, format!("another {} was already placed", label));
                continue;
            }
            let overlaps = ctx
                .result()
                .candidate(id)
                .is_some_and(|c| content.iter().any(|r| r.intersects(&c.rect)));
            if overlaps {
                ctx.fail(id, format!("{} overlaps page content", label));
                continue;
            }
            chosen = ctx.build_as::<T>(id).ok();
        }
        chosen
    }
}

impl Classifier for PageClassifier {
    fn output(&self) -> Label {
        Label::Page
    }

    fn requires(&self) -> &[Label] {
        &[
            Label::PageNumber,
            Label::ProgressBar,
            Label::Step,
            Label::NewBag,
            Label::Part,
            Label::Divider,
        ]
    }

    fn score(&self, result: &ClassificationResult, _env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        vec![CandidateDraft::synthetic(
            result.page_rect(),
            1.0,
            ScoreDetail::new().with_component("page", 1.0),
        )]
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let page_index = ctx.result().page_index();

        let step_ids = Self::valid_ids(ctx.result(), Label::Step);
        let mut steps: Vec<Step> = ctx.build_all(&step_ids);
        steps.sort_by_key(|s| s.step_number.value);
        let bag_ids = Self::valid_ids(ctx.result(), Label::NewBag);
        let new_bags: Vec<NewBag> = ctx.build_all(&bag_ids);
        let divider_ids = Self::valid_ids(ctx.result(), Label::Divider);
        let dividers: Vec<Divider> = ctx.build_all(&divider_ids);

        let loose_parts: Vec<CandidateId> = ctx
            .result()
            .get_scored_candidates(Label::Part, true, 0.0)
            .iter()
            .filter(|p| !p.is_built())
            .filter(|p| !steps.iter().any(|s| s.rect.contains(&p.rect)))
            .map(|p| p.id)
            .collect();
        let catalog_parts: Vec<Part> = ctx.build_all(&loose_parts);

        let content: Vec<Rect> = steps
            .iter()
            .map(|s| s.rect)
            .chain(catalog_parts.iter().map(|p| p.rect))
            .collect();
        let page_number = Self::build_single(ctx, Label::PageNumber, &content);
        let progress_bar = Self::build_single(ctx, Label::ProgressBar, &content);

        let mut categories = Vec::new();
        if !steps.is_empty() {
            categories.push(PageCategory::Instruction);
        }
        if catalog_parts.len() >= self.config.catalog_min_parts {
            categories.push(PageCategory::Catalog);
        }
        if categories.is_empty() {
            categories.push(PageCategory::Info);
        }
        log::debug!(
            "page {}: {} steps, {} catalog parts, categories {:?}",
            page_index,
            steps.len(),
            catalog_parts.len(),
            categories
        );

        let mut element = Element::from(Page {
            rect: candidate.rect,
            page_index,
            categories,
            page_number,
            progress_bar,
            steps,
            new_bags,
            catalog_parts,
            dividers,
        });
        // Grow the page to cover children poking out of the page box.
        let children = element.child_rects();
        if let Element::Page(page) = &mut element {
            if let Some(grown) = Rect::union_all(std::iter::once(&page.rect).chain(children.iter())) {
                page.rect = grown;
            }
        }
        Ok(element)
    }
}
