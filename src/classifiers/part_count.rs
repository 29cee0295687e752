//! Part counts: `2x` style quantities.

use super::common::score_blocks;
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{Element, PartCount};
use crate::error::Result;
use crate::hints::FontBucket;
use crate::rules::patterns::{parse_part_count, PART_COUNT};
use crate::rules::{FontSizeRule, RuleSet, Scale, TextPatternRule};

/// Finds part counts.
///
/// Counts on instruction pages and in the trailing inventory are typeset in
/// different sizes, so each block is scored against both hinted sizes and
/// keeps the better fit.
#[derive(Debug)]
pub struct PartCountClassifier {
    instruction_rules: RuleSet,
    catalog_rules: RuleSet,
}

impl PartCountClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let tolerance = config.part_count.font_tolerance;
        let rules_for = |bucket: FontBucket| -> Result<RuleSet> {
            Ok(RuleSet::new()
                .require(TextPatternRule::new("count", &PART_COUNT), 1.0)
                .with(
                    FontSizeRule::near("font_size", bucket, Scale::linear_falloff(tolerance)?),
                    1.0,
                ))
        };
        Ok(Self {
            instruction_rules: rules_for(FontBucket::PartCount)?,
            catalog_rules: rules_for(FontBucket::CatalogPartCount)?,
        })
    }
}

impl Classifier for PartCountClassifier {
    fn output(&self) -> Label {
        Label::PartCount
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let instruction =
            score_blocks(Label::PartCount, result, env, &[BlockKind::Text], &self.instruction_rules);
        let catalog = score_blocks(Label::PartCount, result, env, &[BlockKind::Text], &self.catalog_rules);

        let mut drafts: Vec<CandidateDraft> = Vec::with_capacity(instruction.len().max(catalog.len()));
        for (block, draft) in instruction.into_iter().chain(catalog) {
            let id = block.id();
            match drafts.iter_mut().find(|d| d.source_blocks.first() == Some(&id)) {
                Some(existing) if existing.score >= draft.score => {}
                Some(existing) => *existing = draft,
                None => drafts.push(draft),
            }
        }
        drafts
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let count = candidate
            .source_blocks
            .first()
            .and_then(|&id| ctx.result().block(id))
            .and_then(|b| b.as_text())
            .and_then(|t| parse_part_count(&t.text))
            .ok_or_else(|| CandidateFailure::new("part count has no count text"))?;
        Ok(PartCount {
            rect: candidate.rect,
            count,
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

    #[test]
    fn test_best_bucket_wins() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints {
            part_count_size: Some(8.0),
            catalog_part_count_size: Some(6.0),
            ..Default::default()
        };
        let env = ClassifierEnv::new(&config, &hints);
        let result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                Block::sized_text(1, Rect::new(10.0, 10.0, 18.0, 16.0), "2x", 6.0),
                Block::sized_text(2, Rect::new(30.0, 10.0, 38.0, 18.0), "1x", 8.0),
                Block::sized_text(3, Rect::new(50.0, 10.0, 58.0, 18.0), "step", 8.0),
            ],
        );
        let drafts = PartCountClassifier::new(&config).unwrap().score(&result, &env);
        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| d.score == 1.0));
    }
}
