//! Diagrams: large assembly illustrations.
//!
//! An illustration is often drawn as several touching images and paths.
//! Qualifying blocks whose rectangles touch (within
//! [`DiagramConfig::merge_gap`]) are merged by union-find into one
//! candidate. Building fails when the merged blocks cover too little of
//! their combined rectangle, which happens when two unrelated pictures
//! merely touch at a corner.
//!
//! Bag artwork (an artwork-sized block enclosing a bag number) and
//! parts-list boxes with their contents are left to their own classifiers.

use super::common::score_blocks;
use crate::blocks::{Block, BlockKind};
use crate::classification::union_find::UnionFind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label,
};
use crate::config::{ClassifierConfig, DiagramConfig};
use crate::elements::{Diagram, Element};
use crate::error::Result;
use crate::geometry::Rect;
use crate::rules::{Measure, RuleSet, Scale, SizeRule};

/// Finds diagrams.
#[derive(Debug)]
pub struct DiagramClassifier {
    config: DiagramConfig,
    rules: RuleSet,
}

impl DiagramClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = config.diagram.clone();
        let rules = RuleSet::new().require(
            SizeRule::new(
                "area",
                Measure::AreaFraction,
                Scale::linear(vec![(c.min_area_fraction, 0.0), (c.full_area_fraction, 1.0)])?,
            ),
            1.0,
        );
        Ok(Self { config: c, rules })
    }

    /// Share of `bounds` covered by the blocks, capped at 1.
    fn coverage(blocks: &[&Block], bounds: &Rect) -> f64 {
        if bounds.area() <= 0.0 {
            return 0.0;
        }
        let covered: f64 = blocks.iter().map(|b| b.rect().intersection_area(bounds)).sum();
        (covered / bounds.area()).min(1.0)
    }
}

impl Classifier for DiagramClassifier {
    fn output(&self) -> Label {
        Label::Diagram
    }

    fn requires(&self) -> &[Label] {
        &[Label::BagNumber, Label::PartsList]
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let bag_numbers: Vec<Rect> = result
            .get_scored_candidates(Label::BagNumber, true, 0.0)
            .iter()
            .map(|c| c.rect)
            .collect();
        let lists: Vec<Rect> = result
            .get_scored_candidates(Label::PartsList, true, 0.0)
            .iter()
            .map(|c| c.rect)
            .collect();
        // Bag artwork encloses its number and belongs to the bag marker.
        let page = result.page_rect();
        let bag = &env.config.bag;
        let scored: Vec<(&Block, f64)> = score_blocks(
            Label::Diagram,
            result,
            env,
            &[BlockKind::Image, BlockKind::Path],
            &self.rules,
        )
        .into_iter()
        .filter(|(b, _)| {
            !(bag.fits_artwork(&b.rect(), &page) && bag_numbers.iter().any(|n| b.rect().contains(n)))
        })
        .filter(|(b, _)| !lists.iter().any(|l| l.contains(&b.rect())))
        .map(|(b, d)| (b, d.score))
        .collect();

        let mut uf = UnionFind::new(scored.len());
        for i in 0..scored.len() {
            let grown = scored[i].0.rect().expand(self.config.merge_gap);
            for j in (i + 1)..scored.len() {
                if grown.intersects(&scored[j].0.rect()) {
                    uf.union(i, j);
                }
            }
        }

        uf.groups()
            .into_iter()
            .map(|group| {
                let blocks: Vec<&Block> = group.iter().map(|&i| scored[i].0).collect();
                let total_area: f64 = blocks.iter().map(|b| b.rect().area()).sum();
                let score = if total_area > 0.0 {
                    group
                        .iter()
                        .map(|&i| scored[i].1 * scored[i].0.rect().area())
                        .sum::<f64>()
                        / total_area
                } else {
                    0.0
                };
                let mut draft = CandidateDraft::from_blocks(&blocks, score, Default::default());
                draft.score_detail = draft
                    .score_detail
                    .with_component("area", score)
                    .with_component("blocks", blocks.len() as f64);
                draft
            })
            .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let blocks: Vec<&Block> = candidate
            .source_blocks
            .iter()
            .filter_map(|&id| ctx.result().block(id))
            .collect();
        let coverage = Self::coverage(&blocks, &candidate.rect);
        if coverage < self.config.min_coverage {
            return Err(CandidateFailure::new(format!(
                "merged blocks cover {:.2} of the diagram, need {:.2}",
                coverage, self.config.min_coverage
            )));
        }
        Ok(Diagram {
            rect: candidate.rect,
        }
        .into())
    }
}
