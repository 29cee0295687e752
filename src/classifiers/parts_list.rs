//! Parts lists: a drawn box around the parts a step needs.
//!
//! Every box-like path that encloses at least one part becomes a candidate.
//! Selection goes through the constraint model: a part belongs to at most
//! one list, overlapping boxes exclude each other, and no box path is used
//! twice.

use super::common::{apply_selection, block_claims, score_blocks};
use crate::blocks::BlockKind;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, CandidateId, ClassificationResult,
    Classifier, ClassifierEnv, Label,
};
use crate::config::{ClassifierConfig, PartsListConfig};
use crate::elements::{Element, Part, PartsList};
use crate::error::Result;
use crate::rules::{FilledRule, Measure, RuleSet, Scale, SizeRule};
use crate::solver::ConstraintModel;
use std::collections::BTreeMap;

/// Finds parts lists.
#[derive(Debug)]
pub struct PartsListClassifier {
    config: PartsListConfig,
    rules: RuleSet,
}

impl PartsListClassifier {
    /// Build the classifier's rules from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let c = config.parts_list.clone();
        let rules = RuleSet::new()
            .require(
                SizeRule::new(
                    "area",
                    Measure::AreaFraction,
                    Scale::linear(vec![
                        (c.min_area_fraction * 0.5, 0.0),
                        (c.min_area_fraction, 1.0),
                        (c.max_area_fraction, 1.0),
                        (c.max_area_fraction * 1.5, 0.0),
                    ])?,
                ),
                1.0,
            )
            .with(FilledRule::new("filled", 1.0, 0.8), 1.0);
        Ok(Self { config: c, rules })
    }
}

impl Classifier for PartsListClassifier {
    fn output(&self) -> Label {
        Label::PartsList
    }

    fn requires(&self) -> &[Label] {
        &[Label::Part]
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let parts = result.get_scored_candidates(Label::Part, true, 0.0);
        if parts.is_empty() {
            return Vec::new();
        }

        let mut drafts = Vec::new();
        let mut members: Vec<Vec<CandidateId>> = Vec::new();
        for (block, mut draft) in score_blocks(Label::PartsList, result, env, &[BlockKind::Path], &self.rules) {
            let bounds = block.rect();
            // Best parts first; a part overlapping a better one is dropped.
            let mut inside: Vec<&Candidate> = Vec::new();
            for &part in parts.iter().filter(|p| bounds.contains(&p.rect)) {
                if inside.iter().all(|kept| !kept.rect.intersects(&part.rect)) {
                    inside.push(part);
                }
            }
            if inside.is_empty() {
                continue;
            }
            inside.sort_by(|a, b| a.rect.y0.total_cmp(&b.rect.y0).then(a.rect.x0.total_cmp(&b.rect.x0)));

            let fill = (inside.len() as f64 / self.config.saturating_parts as f64).min(1.0);
            draft.score = 0.5 * draft.score + 0.5 * fill;
            draft.score_detail.components.insert("parts".into(), fill);
            let ids: Vec<CandidateId> = inside.iter().map(|p| p.id).collect();
            draft.score_detail = draft.score_detail.with_links("parts", ids.clone());
            members.push(ids);
            drafts.push(draft);
        }

        let mut model = ConstraintModel::new();
        let vars: Vec<_> = drafts.iter().map(|d| model.add_var(d.score)).collect();
        model.exclusive_blocks(block_claims(&drafts, &vars));
        let mut by_part: BTreeMap<CandidateId, Vec<_>> = BTreeMap::new();
        for (var, ids) in vars.iter().zip(&members) {
            for id in ids {
                by_part.entry(*id).or_default().push(*var);
            }
        }
        for lists in by_part.values() {
            model.at_most_one_of(lists);
        }
        for i in 0..drafts.len() {
            for j in (i + 1)..drafts.len() {
                if drafts[i].rect.intersects(&drafts[j].rect) {
                    model.at_most_one_of(&[vars[i], vars[j]]);
                }
            }
        }
        apply_selection(Label::PartsList, &mut drafts, &vars, &model, env);
        drafts
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let parts: Vec<Part> = ctx.build_all(candidate.score_detail.linked("parts"));
        if parts.is_empty() {
            return Err(CandidateFailure::new("none of the enclosed parts could be built"));
        }
        Ok(PartsList {
            rect: candidate.rect,
            parts,
        }
        .into())
    }
}
