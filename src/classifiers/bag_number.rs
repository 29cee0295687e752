//! Bag numbers: oversized numbers in the upper part of the page.

use super::common::score_blocks;
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{BagNumber, Element};
use crate::error::Result;
use crate::hints::FontBucket;
use crate::rules::patterns::{parse_number, NUMBER};
use crate::rules::{
    BandRule, FontSizeRule, Measure, RuleSet, Scale, SizeRule, TextPatternRule, VerticalBand,
};

/// Finds bag numbers.
#[derive(Debug)]
pub struct BagNumberClassifier {
    rules: RuleSet,
}

impl BagNumberClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = &config.bag;
        let rules = RuleSet::new()
            .require(TextPatternRule::new("number", &NUMBER), 1.0)
            .require(BandRule::inside("top_band", VerticalBand::Top(c.top_band)), 1.0)
            .require(
                SizeRule::new(
                    "height",
                    Measure::Height,
                    Scale::linear(vec![(c.min_height * 0.75, 0.0), (c.min_height, 1.0)])?,
                ),
                1.0,
            )
            .require(
                FontSizeRule::larger_than(
                    "larger_than_steps",
                    FontBucket::StepNumber,
                    c.step_number_margin,
                ),
                1.0,
            )
            .with(
                FontSizeRule::near("font_size", FontBucket::BagNumber, Scale::linear_falloff(0.5)?),
                1.0,
            );
        Ok(Self { rules })
    }
}

impl Classifier for BagNumberClassifier {
    fn output(&self) -> Label {
        Label::BagNumber
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        score_blocks(Label::BagNumber, result, env, &[BlockKind::Text], &self.rules)
            .into_iter()
            .filter(|(block, _)| {
                block
                    .as_text()
                    .and_then(|t| parse_number(&t.text))
                    .is_some_and(|v| v > 0)
            })
            .map(|(_, draft)| draft)
            .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let value = candidate
            .source_blocks
            .first()
            .and_then(|&id| ctx.result().block(id))
            .and_then(|b| b.as_text())
            .and_then(|t| parse_number(&t.text))
            .ok_or_else(|| CandidateFailure::new("bag number has no numeric text"))?;
        Ok(BagNumber {
            rect: candidate.rect,
            value,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockId};
    use crate::geometry::Rect;
    use crate::hints::FontSizeHints;

    #[test]
    fn test_large_numbers_near_the_top() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints {
            step_number_size: Some(16.0),
            ..Default::default()
        };
        let env = ClassifierEnv::new(&config, &hints);
        let result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                Block::sized_text(1, Rect::new(50.0, 40.0, 80.0, 76.0), "3", 36.0),
                // Step-number sized.
                Block::sized_text(2, Rect::new(150.0, 40.0, 170.0, 56.0), "4", 16.0),
                // Big but at the bottom.
                Block::sized_text(3, Rect::new(50.0, 240.0, 80.0, 276.0), "5", 36.0),
            ],
        );
        let drafts = BagNumberClassifier::new(&config).unwrap().score(&result, &env);
        let ids: Vec<BlockId> = drafts.iter().map(|d| d.source_blocks[0]).collect();
        assert_eq!(ids, vec![BlockId(1)]);
    }
}
