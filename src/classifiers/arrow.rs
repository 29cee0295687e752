//! Arrows: small filled polygons, usually drawn inside diagrams.

use super::common::score_blocks;
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::ClassifierConfig;
use crate::elements::{Arrow, Element};
use crate::error::Result;
use crate::rules::{
    AspectRatioRule, DiscreteScale, FilledRule, Measure, RuleSet, Scale, SegmentCountRule, SizeRule,
};

/// Finds arrow heads.
#[derive(Debug)]
pub struct ArrowClassifier {
    rules: RuleSet,
}

impl ArrowClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = &config.arrow;
        let segments = DiscreteScale::new(
            vec![(c.min_segments as f64, c.max_segments as f64 + 1.0, 1.0)],
            0.0,
        )?;
        let rules = RuleSet::new()
            .require(FilledRule::new("filled", 1.0, 0.0), 1.0)
            // Paths without recorded commands skip this gate.
            .require(SegmentCountRule::new("segments", Scale::Discrete(segments)), 1.0)
            .require(
                SizeRule::new(
                    "size",
                    Measure::ShortSide,
                    Scale::linear(vec![
                        (0.0, 0.0),
                        (c.min_size, 1.0),
                        (c.max_size, 1.0),
                        (c.max_size * 1.5, 0.0),
                    ])?,
                ),
                1.0,
            )
            .require(
                AspectRatioRule::new(
                    "compact",
                    Scale::linear(vec![(0.25, 0.0), (0.5, 1.0), (2.0, 1.0), (4.0, 0.0)])?,
                ),
                1.0,
            );
        Ok(Self { rules })
    }
}

impl Classifier for ArrowClassifier {
    fn output(&self) -> Label {
        Label::Arrow
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        score_blocks(Label::Arrow, result, env, &[BlockKind::Path], &self.rules)
            .into_iter()
            .map(|(_, draft)| draft)
            .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        _ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        Ok(Arrow {
            rect: candidate.rect,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockId, Color, PathBlock, PathCommand};
    use crate::geometry::Rect;
    use crate::hints::FontSizeHints;

    fn triangle(id: u32, rect: Rect) -> Block {
        Block::Path(PathBlock {
            id: BlockId(id),
            rect,
            fill_color: Some(Color::black()),
            stroke_color: None,
            path_commands: Some(vec![
                PathCommand::MoveTo { x: rect.x0, y: rect.y1 },
                PathCommand::LineTo { x: rect.center().x, y: rect.y0 },
                PathCommand::LineTo { x: rect.x1, y: rect.y1 },
                PathCommand::ClosePath,
            ]),
        })
    }

    #[test]
    fn test_small_filled_polygons() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints::default();
        let env = ClassifierEnv::new(&config, &hints);
        let result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                triangle(1, Rect::new(100.0, 100.0, 112.0, 112.0)),
                // Two segments only.
                Block::Path(PathBlock {
                    id: BlockId(2),
                    rect: Rect::new(150.0, 100.0, 162.0, 112.0),
                    fill_color: Some(Color::black()),
                    stroke_color: None,
                    path_commands: Some(vec![
                        PathCommand::MoveTo { x: 150.0, y: 100.0 },
                        PathCommand::LineTo { x: 162.0, y: 112.0 },
                        PathCommand::LineTo { x: 150.0, y: 112.0 },
                    ]),
                }),
                // Outline only.
                Block::path(3, Rect::new(200.0, 100.0, 212.0, 112.0), None, Some(Color::black())),
                // Far too large.
                triangle(4, Rect::new(10.0, 10.0, 110.0, 90.0)),
                // A flat filled strip.
                Block::path(5, Rect::new(20.0, 285.0, 380.0, 291.0), Some(Color::black()), None),
            ],
        );
        let drafts = ArrowClassifier::new(&config).unwrap().score(&result, &env);
        let ids: Vec<BlockId> = drafts.iter().map(|d| d.source_blocks[0]).collect();
        assert_eq!(ids, vec![BlockId(1)]);
    }
}
