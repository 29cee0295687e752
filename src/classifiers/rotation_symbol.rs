//! Rotation symbols: square-ish icons placed just outside a diagram.

use super::common::score_blocks;
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::{ClassifierConfig, RotationSymbolConfig};
use crate::elements::{Element, RotationSymbol};
use crate::error::Result;
use crate::geometry::Rect;
use crate::rules::{AspectRatioRule, Measure, RuleSet, Scale, SizeRule};

/// Finds rotation symbols next to diagrams.
#[derive(Debug)]
pub struct RotationSymbolClassifier {
    config: RotationSymbolConfig,
    rules: RuleSet,
}

impl RotationSymbolClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = config.rotation_symbol.clone();
        let rules = RuleSet::new()
            .require(
                AspectRatioRule::new(
                    "square",
                    Scale::linear(vec![(0.75, 0.0), (0.9, 1.0), (1.1, 1.0), (4.0 / 3.0, 0.0)])?,
                ),
                1.0,
            )
            .require(
                SizeRule::new(
                    "size",
                    Measure::ShortSide,
                    Scale::linear(vec![
                        (c.min_size * 0.75, 0.0),
                        (c.min_size, 1.0),
                        (c.max_size, 1.0),
                        (c.max_size * 1.25, 0.0),
                    ])?,
                ),
                1.0,
            );
        Ok(Self { config: c, rules })
    }

    fn proximity(&self, rect: &Rect, diagrams: &[Rect]) -> Option<f64> {
        diagrams
            .iter()
            .filter(|d| !d.contains(rect))
            .map(|d| d.distance_to(rect))
            .filter(|&dist| dist <= self.config.max_diagram_distance)
            .fold(None, |best: Option<f64>, dist| Some(best.map_or(dist, |b| b.min(dist))))
            .map(|dist| 1.0 - dist / self.config.max_diagram_distance.max(f64::EPSILON))
    }
}

impl Classifier for RotationSymbolClassifier {
    fn output(&self) -> Label {
        Label::RotationSymbol
    }

    fn requires(&self) -> &[Label] {
        &[Label::Diagram, Label::Part]
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let diagrams: Vec<Rect> = result
            .get_scored_candidates(Label::Diagram, true, 0.0)
            .iter()
            .map(|c| c.rect)
            .collect();
        if diagrams.is_empty() {
            return Vec::new();
        }
        // Pictures of parts sit next to diagrams too.
        let parts: Vec<Rect> = result
            .get_scored_candidates(Label::Part, true, 0.0)
            .iter()
            .map(|c| c.rect)
            .collect();

        score_blocks(
            Label::RotationSymbol,
            result,
            env,
            &[BlockKind::Image, BlockKind::Path],
            &self.rules,
        )
        .into_iter()
        .filter(|(block, _)| !parts.iter().any(|p| p.contains(&block.rect())))
        .filter_map(|(block, mut draft)| {
            let proximity = self.proximity(&block.rect(), &diagrams)?;
            draft.score = 0.7 * draft.score + 0.3 * proximity;
            draft
                .score_detail
                .components
                .insert("proximity".into(), proximity);
            Some(draft)
        })
        .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        _ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        Ok(RotationSymbol {
            rect: candidate.rect,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Block;
    use crate::classification::CandidateDraft;
    use crate::hints::FontSizeHints;

    #[test]
    fn test_needs_a_nearby_diagram() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints::default();
        let env = ClassifierEnv::new(&config, &hints);
        let mut result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                Block::image(1, Rect::new(100.0, 100.0, 300.0, 250.0), "diagram"),
                Block::image(2, Rect::new(305.0, 100.0, 325.0, 120.0), "near"),
                Block::image(3, Rect::new(10.0, 10.0, 30.0, 30.0), "far"),
                Block::image(4, Rect::new(150.0, 150.0, 170.0, 170.0), "inside"),
                Block::image(5, Rect::new(305.0, 200.0, 345.0, 210.0), "flat"),
            ],
        );
        let diagram = CandidateDraft::from_blocks(
            &[result.block(crate::blocks::BlockId(1)).unwrap()],
            0.9,
            Default::default(),
        );
        result.add_candidate(Label::Diagram, diagram);

        let drafts = RotationSymbolClassifier::new(&config).unwrap().score(&result, &env);
        let ids: Vec<u32> = drafts.iter().map(|d| d.source_blocks[0].0).collect();
        assert_eq!(ids, vec![2]);
        assert!(drafts[0].score_detail.components["proximity"] > 0.8);
    }
}
