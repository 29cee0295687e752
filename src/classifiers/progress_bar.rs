//! Progress bars: a long flat strip along the bottom of the page, optionally
//! with a filled indicator growing from its left edge.

use super::common::{apply_selection, block_claims, score_blocks};
use crate::blocks::{Block, BlockKind};
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{Element, ProgressBar};
use crate::error::Result;
use crate::rules::{AspectRatioRule, BandRule, Measure, RuleSet, Scale, SizeRule, VerticalBand};
use crate::solver::ConstraintModel;

/// Horizontal slack (points) for an indicator to count as starting at the
/// bar's left edge.
const EDGE_TOLERANCE: f64 = 1.0;

/// Finds the progress bar; at most one per page.
#[derive(Debug)]
pub struct ProgressBarClassifier {
    rules: RuleSet,
}

impl ProgressBarClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = &config.progress_bar;
        let rules = RuleSet::new()
            .require(BandRule::inside("bottom_band", VerticalBand::Bottom(c.bottom_band)), 1.0)
            .require(
                SizeRule::new(
                    "width",
                    Measure::WidthFraction,
                    Scale::linear(vec![(c.min_width_fraction * 0.75, 0.0), (c.min_width_fraction, 1.0)])?,
                ),
                1.0,
            )
            .require(
                AspectRatioRule::new(
                    "flat",
                    Scale::linear(vec![(c.min_aspect * 0.5, 0.0), (c.min_aspect, 1.0)])?,
                ),
                1.0,
            )
            .require(
                SizeRule::new(
                    "height",
                    Measure::Height,
                    Scale::linear(vec![(0.0, 1.0), (c.max_height, 1.0), (c.max_height * 1.5, 0.0)])?,
                ),
                1.0,
            );
        Ok(Self { rules })
    }

    /// The widest filled path inside `bar` that starts at its left edge.
    fn indicator<'r>(bar: &Block, result: &'r ClassificationResult) -> Option<&'r Block> {
        let outer = bar.rect();
        result
            .get_unconsumed_blocks(&[BlockKind::Path])
            .into_iter()
            .filter(|b| b.id() != bar.id())
            .filter(|b| b.as_path().is_some_and(|p| p.has_fill()))
            .filter(|b| {
                let r = b.rect();
                outer.contains_with_tolerance(&r, 0.5)
                    && (r.x0 - outer.x0).abs() <= EDGE_TOLERANCE
                    && r.width() < outer.width()
            })
            .max_by(|a, b| {
                a.rect()
                    .width()
                    .total_cmp(&b.rect().width())
                    .then(b.id().cmp(&a.id()))
            })
    }
}

impl Classifier for ProgressBarClassifier {
    fn output(&self) -> Label {
        Label::ProgressBar
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let mut drafts: Vec<CandidateDraft> =
            score_blocks(Label::ProgressBar, result, env, &[BlockKind::Path], &self.rules)
                .into_iter()
                .map(|(bar, draft)| match Self::indicator(bar, result) {
                    Some(ind) => {
                        let progress = (ind.rect().width() / bar.rect().width()).clamp(0.0, 1.0);
                        let mut with_indicator =
                            CandidateDraft::from_blocks(&[bar, ind], draft.score, draft.score_detail);
                        with_indicator.score_detail.components.insert("progress".into(), progress);
                        with_indicator
                    }
                    None => draft,
                })
                .collect();

        let mut model = ConstraintModel::new();
        let vars: Vec<_> = drafts.iter().map(|d| model.add_var(d.score)).collect();
        model.at_most_one_of(&vars);
        model.exclusive_blocks(block_claims(&drafts, &vars));
        apply_selection(Label::ProgressBar, &mut drafts, &vars, &model, env);
        drafts
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let result = ctx.result();
        let mut rects = candidate
            .source_blocks
            .iter()
            .filter_map(|&id| result.block(id))
            .map(|b| b.rect());
        let bar = rects
            .next()
            .ok_or_else(|| CandidateFailure::new("progress bar has no path block"))?;
        let progress = rects
            .next()
            .map(|ind| (ind.width() / bar.width()).clamp(0.0, 1.0));
        Ok(ProgressBar {
            rect: candidate.rect,
            progress,
        }
        .into())
    }
}
