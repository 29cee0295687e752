//! Step numbers: bare numbers above the page-number band, set larger than
//! part counts.

use super::common::score_blocks;
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{Element, StepNumber};
use crate::error::Result;
use crate::hints::FontBucket;
use crate::rules::patterns::{parse_number, NUMBER};
use crate::rules::{BandRule, FontSizeRule, RuleSet, Scale, TextPatternRule, VerticalBand};

/// Finds step numbers.
#[derive(Debug)]
pub struct StepNumberClassifier {
    rules: RuleSet,
}

impl StepNumberClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = &config.step_number;
        let rules = RuleSet::new()
            .require(TextPatternRule::new("number", &NUMBER), 1.0)
            .require(
                BandRule::outside("above_footer", VerticalBand::Bottom(c.excluded_bottom_band)),
                1.0,
            )
            .with(
                FontSizeRule::near(
                    "font_size",
                    FontBucket::StepNumber,
                    Scale::linear_falloff(c.font_tolerance)?,
                ),
                2.0,
            )
            .require(
                FontSizeRule::larger_than("larger_than_counts", FontBucket::PartCount, c.part_count_margin),
                1.0,
            );
        Ok(Self { rules })
    }
}

impl Classifier for StepNumberClassifier {
    fn output(&self) -> Label {
        Label::StepNumber
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        score_blocks(Label::StepNumber, result, env, &[BlockKind::Text], &self.rules)
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
            .ok_or_else(|| CandidateFailure::new("step number has no numeric text"))?;
        Ok(StepNumber {
            rect: candidate.rect,
            value,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Block;
    use crate::geometry::Rect;
    use crate::hints::FontSizeHints;

    fn score_with(hints: FontSizeHints, blocks: Vec<Block>) -> Vec<CandidateDraft> {
        let config = ClassifierConfig::default();
        let env = ClassifierEnv::new(&config, &hints);
        let result = ClassificationResult::new(0, Rect::new(0.0, 0.0, 400.0, 300.0), blocks);
        StepNumberClassifier::new(&config).unwrap().score(&result, &env)
    }

    #[test]
    fn test_number_above_footer() {
        let drafts = score_with(
            FontSizeHints::default(),
            vec![
                Block::sized_text(1, Rect::new(10.0, 10.0, 22.0, 26.0), "12", 16.0),
                Block::sized_text(2, Rect::new(10.0, 285.0, 22.0, 295.0), "13", 16.0),
                Block::sized_text(3, Rect::new(50.0, 10.0, 62.0, 26.0), "0", 16.0),
            ],
        );
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].source_blocks[0].0, 1);
    }

    #[test]
    fn test_must_be_larger_than_part_counts() {
        let hints = FontSizeHints {
            part_count_size: Some(8.0),
            step_number_size: Some(16.0),
            ..Default::default()
        };
        let drafts = score_with(
            hints,
            vec![
                Block::sized_text(1, Rect::new(10.0, 10.0, 22.0, 26.0), "12", 16.0),
                Block::sized_text(2, Rect::new(60.0, 10.0, 66.0, 18.0), "3", 8.0),
            ],
        );
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].score, 1.0);
    }
}
