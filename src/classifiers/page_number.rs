//! Page numbers: a bare number in a bottom corner.

use super::common::{apply_selection, block_claims, score_blocks};
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::{ClassifierConfig, PageNumberConfig};
use crate::elements::{Element, PageNumber};
use crate::error::Result;
use crate::hints::FontBucket;
use crate::rules::patterns::{parse_number, NUMBER};
use crate::rules::{
    BandRule, Corner, CornerDistanceRule, FontSizeRule, RuleSet, Scale, TextPatternRule, VerticalBand,
};
use crate::solver::ConstraintModel;

/// Finds the page number; at most one per page.
#[derive(Debug)]
pub struct PageNumberClassifier {
    config: PageNumberConfig,
    rules: RuleSet,
}

impl PageNumberClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = config.page_number.clone();
        let rules = RuleSet::new()
            .require(TextPatternRule::new("number", &NUMBER), 1.0)
            .require(BandRule::inside("bottom_band", VerticalBand::Bottom(c.bottom_band)), 1.0)
            .with(
                CornerDistanceRule::new(
                    "corner",
                    vec![Corner::BottomLeft, Corner::BottomRight],
                    Scale::linear_falloff(c.max_corner_distance)?,
                ),
                2.0,
            )
            .with(
                FontSizeRule::near(
                    "font_size",
                    FontBucket::PageNumber,
                    Scale::linear_falloff(c.font_tolerance)?,
                ),
                1.0,
            );
        Ok(Self { config: c, rules })
    }
}

impl Classifier for PageNumberClassifier {
    fn output(&self) -> Label {
        Label::PageNumber
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let expected = result.page_index() as u32 + 1;
        let mut drafts: Vec<CandidateDraft> = score_blocks(
            Label::PageNumber,
            result,
            env,
            &[BlockKind::Text],
            &self.rules,
        )
        .into_iter()
        .map(|(block, mut draft)| {
            let value = block.as_text().and_then(|t| parse_number(&t.text));
            if value == Some(expected) && self.config.expected_value_bonus > 0.0 {
                draft.score = (draft.score + self.config.expected_value_bonus).min(1.0);
                draft
                    .score_detail
                    .components
                    .insert("expected_value".into(), 1.0);
            }
            draft
        })
        .collect();

        let mut model = ConstraintModel::new();
        let vars: Vec<_> = drafts.iter().map(|d| model.add_var(d.score)).collect();
        model.at_most_one_of(&vars);
        model.exclusive_blocks(block_claims(&drafts, &vars));
        apply_selection(Label::PageNumber, &mut drafts, &vars, &model, env);
        drafts
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let block = candidate
            .source_blocks
            .first()
            .and_then(|&id| ctx.result().block(id))
            .and_then(|b| b.as_text())
            .ok_or_else(|| CandidateFailure::new("page number has no text block"))?;
        let value = parse_number(&block.text)
            .ok_or_else(|| CandidateFailure::new(format!("'{}' is not a number", block.text)))?;
        Ok(PageNumber {
            rect: candidate.rect,
            value,
        }
        .into())
    }
}
