//! Dividers: long thin strokes separating regions of a page.

use super::common::score_blocks;
use crate::blocks::{Block, BlockKind};
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{Divider, Element};
use crate::error::Result;
use crate::rules::{Measure, Rule, RuleContext, RuleSet, Scale, SizeRule};

/// Length of the longer side relative to the matching page dimension.
struct SpanRule {
    scale: Scale,
}

impl Rule for SpanRule {
    fn name(&self) -> &str {
        "span"
    }

    fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> Option<f64> {
        let r = block.rect();
        let page = ctx.page_rect;
        let span = if r.width() >= r.height() {
            r.width() / page.width()
        } else {
            r.height() / page.height()
        };
        span.is_finite().then(|| self.scale.score(span))
    }
}

/// Finds divider lines.
#[derive(Debug)]
pub struct DividerClassifier {
    rules: RuleSet,
}

impl DividerClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = &config.divider;
        let rules = RuleSet::new()
            .require(
                SizeRule::new(
                    "thickness",
                    Measure::ShortSide,
                    Scale::linear(vec![(0.0, 1.0), (c.max_thickness, 1.0), (c.max_thickness * 2.0, 0.0)])?,
                ),
                1.0,
            )
            .require(
                SpanRule {
                    scale: Scale::linear(vec![(c.min_span * 0.5, 0.0), (c.min_span, 1.0)])?,
                },
                1.0,
            );
        Ok(Self { rules })
    }
}

impl Classifier for DividerClassifier {
    fn output(&self) -> Label {
        Label::Divider
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        score_blocks(Label::Divider, result, env, &[BlockKind::Path], &self.rules)
            .into_iter()
            .map(|(_, draft)| draft)
            .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        _ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        Ok(Divider {
            rect: candidate.rect,
        }
        .into())
    }
}
