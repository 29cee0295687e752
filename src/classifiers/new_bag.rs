//! "Open bag N" markers: a bag number, usually framed by bag artwork.
//!
//! Artwork is the smallest image around the number whose area stays under
//! [`BagConfig::max_artwork_area_fraction`] of the page. Without one the
//! marker is the bare number.

use super::common::{apply_selection, block_claims};
use crate::blocks::{Block, BlockKind};
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label, ScoreDetail,
};
use crate::config::{BagConfig, ClassifierConfig};
use crate::elements::{BagNumber, Element, NewBag};
use crate::error::Result;
use crate::solver::ConstraintModel;

/// Pairs bag numbers with the artwork around them.
#[derive(Debug)]
pub struct NewBagClassifier {
    config: BagConfig,
}

impl NewBagClassifier {
    /// Create the classifier.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config: config.bag.clone(),
        })
    }
}

impl Classifier for NewBagClassifier {
    fn output(&self) -> Label {
        Label::NewBag
    }

    fn requires(&self) -> &[Label] {
        &[Label::BagNumber]
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let page = result.page_rect();
        let images: Vec<&Block> = result
            .get_unconsumed_blocks(&[BlockKind::Image])
            .into_iter()
            .filter(|img| self.config.fits_artwork(&img.rect(), &page))
            .collect();
        let mut drafts: Vec<CandidateDraft> = result
            .get_scored_candidates(Label::BagNumber, true, 0.0)
            .into_iter()
            .map(|number| {
                let frame: Option<&Block> = images
                    .iter()
                    .copied()
                    .filter(|img| img.rect().contains(&number.rect))
                    .min_by(|a, b| a.rect().area().total_cmp(&b.rect().area()));
                let detail = ScoreDetail::new()
                    .with_component("number", number.score)
                    .with_link("number", number.id);
                match frame {
                    Some(img) => CandidateDraft::from_blocks(
                        &[img],
                        number.score,
                        detail.with_component("artwork", 1.0),
                    ),
                    None => CandidateDraft::synthetic(
                        number.rect,
                        number.score * self.config.bare_number_factor,
                        detail.with_component("artwork", 0.0),
                    ),
                }
            })
            .collect();

        // Two numbers inside one piece of artwork cannot both own it.
        let mut model = ConstraintModel::new();
        let vars: Vec<_> = drafts.iter().map(|d| model.add_var(d.score)).collect();
        model.exclusive_blocks(block_claims(&drafts, &vars));
        apply_selection(Label::NewBag, &mut drafts, &vars, &model, env);
        drafts
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let id = candidate
            .score_detail
            .link("number")
            .ok_or_else(|| CandidateFailure::new("bag marker has no bag number"))?;
        let number: BagNumber = ctx.build_as(id)?;
        Ok(NewBag {
            rect: candidate.rect.union(&number.rect),
            number,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockId;
    use crate::geometry::Rect;
    use crate::hints::FontSizeHints;

    #[test]
    fn test_prefers_smallest_enclosing_artwork() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints::default();
        let env = ClassifierEnv::new(&config, &hints);
        let mut result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                Block::image(1, Rect::new(0.0, 0.0, 400.0, 300.0), "background"),
                Block::image(2, Rect::new(30.0, 20.0, 120.0, 110.0), "bag"),
                Block::sized_text(3, Rect::new(60.0, 40.0, 90.0, 76.0), "1", 36.0),
                Block::sized_text(4, Rect::new(300.0, 40.0, 330.0, 76.0), "2", 36.0),
            ],
        );
        for id in [3, 4] {
            let block = result.block(BlockId(id)).unwrap().clone();
            result.add_candidate(
                Label::BagNumber,
                CandidateDraft::from_blocks(&[&block], 0.9, Default::default()),
            );
        }

        let drafts = NewBagClassifier::new(&config).unwrap().score(&result, &env);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].source_blocks, vec![BlockId(2)]);
        assert!(drafts[0].failure_reason.is_none());
        // The page background is too large to be artwork.
        assert!(drafts[1].source_blocks.is_empty());
        assert_eq!(drafts[1].rect, Rect::new(300.0, 40.0, 330.0, 76.0));
    }

    #[test]
    fn test_background_alone_is_not_artwork() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints::default();
        let env = ClassifierEnv::new(&config, &hints);
        let mut result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                Block::image(1, Rect::new(0.0, 0.0, 400.0, 300.0), "background"),
                Block::sized_text(2, Rect::new(60.0, 40.0, 90.0, 76.0), "2", 36.0),
            ],
        );
        let block = result.block(BlockId(2)).unwrap().clone();
        result.add_candidate(
            Label::BagNumber,
            CandidateDraft::from_blocks(&[&block], 0.9, Default::default()),
        );
        let drafts = NewBagClassifier::new(&config).unwrap().score(&result, &env);
        assert_eq!(drafts.len(), 1);
        assert!(drafts[0].source_blocks.is_empty());
        assert_eq!(drafts[0].rect, Rect::new(60.0, 40.0, 90.0, 76.0));
        assert!((drafts[0].score - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_bare_number_is_synthetic() {
        let config = ClassifierConfig::default();
        let hints = FontSizeHints::default();
        let env = ClassifierEnv::new(&config, &hints);
        let mut result = ClassificationResult::new(
            0,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![Block::sized_text(1, Rect::new(60.0, 40.0, 90.0, 76.0), "1", 36.0)],
        );
        let block = result.block(BlockId(1)).unwrap().clone();
        result.add_candidate(
            Label::BagNumber,
            CandidateDraft::from_blocks(&[&block], 0.9, Default::default()),
        );
        let drafts = NewBagClassifier::new(&config).unwrap().score(&result, &env);
        assert_eq!(drafts.len(), 1);
        assert!(drafts[0].source_blocks.is_empty());
        assert!((drafts[0].score - 0.72).abs() < 1e-9);
    }
}
