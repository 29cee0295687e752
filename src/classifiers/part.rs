//! Parts: a part count paired with the picture right above it.

use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, ClassificationResult, Classifier,
    ClassifierEnv, Label, ScoreDetail,
};
use crate::config::{ClassifierConfig, PartConfig};
use crate::elements::{Element, Part, PartCount, PartImage};
use crate::error::Result;
use crate::geometry::Rect;
use crate::pairing::min_cost_assignment;

/// Pairs part counts with part images one-to-one.
#[derive(Debug)]
pub struct PartClassifier {
    config: PartConfig,
}

impl PartClassifier {
    /// Create the classifier.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config: config.part.clone(),
        })
    }

    /// Score in `[0, 1]` for `count` sitting under `image`, `None` when the
    /// two cannot belong together.
    fn pair_score(&self, count: &Rect, image: &Rect) -> Option<f64> {
        let cx = count.center().x;
        if cx < image.x0 - self.config.horizontal_slack || cx > image.x1 + self.config.horizontal_slack {
            return None;
        }
        let gap = count.y0 - image.y1;
        if gap < -count.height() * 0.5 || gap > self.config.max_gap {
            return None;
        }
        let gap_score = 1.0 - gap.max(0.0) / self.config.max_gap;
        let align = 1.0 - ((count.x0 - image.x0).abs() / image.width().max(1.0)).min(1.0);
        Some(0.7 * gap_score + 0.3 * align)
    }
}

impl Classifier for PartClassifier {
    fn output(&self) -> Label {
        Label::Part
    }

    fn requires(&self) -> &[Label] {
        &[Label::PartCount, Label::PartImage]
    }

    fn score(&self, result: &ClassificationResult, _env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let counts = result.get_scored_candidates(Label::PartCount, true, 0.0);
        let images = result.get_scored_candidates(Label::PartImage, true, 0.0);
        if counts.is_empty() || images.is_empty() {
            return Vec::new();
        }

        let costs: Vec<Vec<f64>> = counts
            .iter()
            .map(|c| {
                images
                    .iter()
                    .map(|i| self.pair_score(&c.rect, &i.rect).map_or(f64::INFINITY, |s| -s))
                    .collect()
            })
            .collect();

        min_cost_assignment(&costs)
            .into_iter()
            .map(|(ci, ii)| {
                let (count, image) = (counts[ci], images[ii]);
                let pairing = -costs[ci][ii];
                let score = 0.5 * pairing + 0.25 * (count.score + image.score);
                let detail = ScoreDetail::new()
                    .with_component("pairing", pairing)
                    .with_component("count", count.score)
                    .with_component("image", image.score)
                    .with_link("count", count.id)
                    .with_link("image", image.id);
                CandidateDraft::synthetic(count.rect.union(&image.rect), score, detail)
            })
            .collect()
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let detail = &candidate.score_detail;
        let (Some(count_id), Some(image_id)) = (detail.link("count"), detail.link("image")) else {
            return Err(CandidateFailure::new("part is missing its count or image"));
        };
        for id in [count_id, image_id] {
            if let Some(reason) = ctx.result().get_failure_reason(id) {
                return Err(CandidateFailure::new(format!("{} failed: {}", id, reason)));
            }
        }
        let count: PartCount = ctx.build_as(count_id)?;
        let image: PartImage = ctx.build_as(image_id)?;
        Ok(Part {
            rect: count.rect.union(&image.rect),
            count,
            image,
        }
        .into())
    }
}
