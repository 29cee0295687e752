//! Part images: part-sized raster images.

use super::common::score_blocks;
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{Element, PartImage};
use crate::error::Result;
use crate::rules::{Measure, RuleSet, Scale, SizeRule};

/// Finds pictures of single parts.
#[derive(Debug)]
pub struct PartImageClassifier {
    rules: RuleSet,
}

impl PartImageClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = &config.part_image;
        let rules = RuleSet::new()
            .require(
                SizeRule::new(
                    "min_side",
                    Measure::ShortSide,
                    Scale::linear(vec![(c.min_side * 0.5, 0.0), (c.min_side, 1.0)])?,
                ),
                1.0,
            )
            .require(
                SizeRule::new(
                    "area",
                    Measure::AreaFraction,
                    Scale::linear(vec![
                        (0.0, 1.0),
                        (c.max_area_fraction, 1.0),
                        (c.max_area_fraction * 2.0, 0.0),
                    ])?,
                ),
                1.0,
            );
        Ok(Self { rules })
    }
}

impl Classifier for PartImageClassifier {
    fn output(&self) -> Label {
        Label::PartImage
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        score_blocks(Label::PartImage, result, env, &[BlockKind::Image], &self.rules)
            .into_iter()
            .map(|(_, draft)| draft)
            .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let image = candidate
            .source_blocks
            .first()
            .and_then(|&id| ctx.result().block(id))
            .and_then(|b| b.as_image())
            .ok_or_else(|| CandidateFailure::new("part image has no image block"))?;
        Ok(PartImage {
            rect: candidate.rect,
            image_ref: image.image_ref.clone(),
        }
        .into())
    }
}
