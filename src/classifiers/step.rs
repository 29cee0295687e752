//! Steps: a step number with its parts list, diagram, arrows and rotation
//! symbols.
//!
//! Step numbers are paired with diagrams one-to-one through
//! [`crate::pairing`], never across a divider. The parts list of a step is
//! the box sitting right above its number. Arrows go to the step whose
//! diagram contains them; a rotation symbol goes to the step owning the
//! diagram closest to it.
//!
//! Competing hypotheses are settled by the constraint model: a parts list,
//! a diagram and a step value each belong to at most one step, and selected
//! steps may not overlap.

use super::common::apply_selection;
use crate::classification::{
    BuildContext, Candidate, CandidateDraft, CandidateFailure, CandidateId, ClassificationResult,
    Classifier, ClassifierEnv, Label, ScoreDetail,
};
use crate::config::{ClassifierConfig, StepConfig};
use crate::elements::{Arrow, Diagram, Element, PartsList, RotationSymbol, Step, StepNumber};
use crate::error::Result;
use crate::geometry::Rect;
use crate::pairing::{pair, pairing_cost};
use crate::rules::patterns::parse_number;
use crate::solver::ConstraintModel;
use std::collections::BTreeMap;

/// Vertical slack (points) allowed between a parts list and its number.
const LIST_OVERLAP_TOLERANCE: f64 = 2.0;

/// Assembles steps from previously scored pieces.
#[derive(Debug)]
pub struct StepClassifier {
    config: StepConfig,
}

impl StepClassifier {
    /// Create the classifier.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config: config.step.clone(),
        })
    }

    fn parts_list_for<'c>(&self, number: &Rect, lists: &[&'c Candidate]) -> Option<&'c Candidate> {
        lists
            .iter()
            .copied()
            .filter(|l| {
                let gap = number.y0 - l.rect.y1;
                gap >= -LIST_OVERLAP_TOLERANCE
                    && gap <= self.config.parts_list_max_gap
                    && number.center().x >= l.rect.x0 - self.config.parts_list_max_gap
                    && number.center().x <= l.rect.x1
            })
            .min_by(|a, b| {
                (number.y0 - a.rect.y1)
                    .abs()
                    .total_cmp(&(number.y0 - b.rect.y1).abs())
                    .then(a.id.cmp(&b.id))
            })
    }

    fn step_value(result: &ClassificationResult, number: &Candidate) -> Option<u32> {
        number
            .source_blocks
            .first()
            .and_then(|&id| result.block(id))
            .and_then(|b| b.as_text())
            .and_then(|t| parse_number(&t.text))
    }
}

impl Classifier for StepClassifier {
    fn output(&self) -> Label {
        Label::Step
    }

    fn requires(&self) -> &[Label] {
        &[
            Label::StepNumber,
            Label::PartsList,
            Label::Diagram,
            Label::Arrow,
            Label::RotationSymbol,
            Label::Divider,
        ]
    }

    fn score(&self, result: &ClassificationResult, env: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
        let numbers = result.get_scored_candidates(Label::StepNumber, true, 0.0);
        if numbers.is_empty() {
            return Vec::new();
        }
        let lists = result.get_scored_candidates(Label::PartsList, true, 0.0);
        let diagrams = result.get_scored_candidates(Label::Diagram, true, 0.0);
        let arrows = result.get_scored_candidates(Label::Arrow, true, 0.0);
        let symbols = result.get_scored_candidates(Label::RotationSymbol, true, 0.0);
        let dividers: Vec<Rect> = result
            .get_scored_candidates(Label::Divider, true, 0.0)
            .iter()
            .map(|c| c.rect)
            .collect();

        let number_rects: Vec<Rect> = numbers.iter().map(|c| c.rect).collect();
        let diagram_rects: Vec<Rect> = diagrams.iter().map(|c| c.rect).collect();
        let pairing = &env.config.pairing;
        let paired: BTreeMap<usize, usize> = pair(&number_rects, &diagram_rects, &dividers, pairing)
            .into_iter()
            .collect();

        // Nearest diagram of every rotation symbol.
        let symbol_owner: Vec<Option<usize>> = symbols
            .iter()
            .map(|s| {
                (0..diagrams.len()).min_by(|&a, &b| {
                    diagram_rects[a]
                        .distance_to(&s.rect)
                        .total_cmp(&diagram_rects[b].distance_to(&s.rect))
                })
            })
            .collect();

        let mut drafts = Vec::new();
        let mut uses: Vec<(Option<u32>, Option<CandidateId>, Option<CandidateId>)> = Vec::new();
        for (ni, number) in numbers.iter().enumerate() {
            let list = self.parts_list_for(&number.rect, &lists);
            let diagram = paired.get(&ni).map(|&di| diagrams[di]);
            let pair_score = diagram
                .map(|d| -pairing_cost(&number.rect, &d.rect, &dividers, pairing))
                .filter(|s| s.is_finite())
                .unwrap_or(0.0);

            let mut rect = number.rect;
            let mut detail = ScoreDetail::new()
                .with_component("number", number.score)
                .with_component("diagram", pair_score)
                .with_component("parts_list", if list.is_some() { 1.0 } else { 0.0 })
                .with_link("number", number.id);
            if let Some(list) = list {
                rect = rect.union(&list.rect);
                detail = detail.with_link("parts_list", list.id);
            }
            if let Some(d) = diagram {
                rect = rect.union(&d.rect);
                let inside: Vec<CandidateId> = arrows
                    .iter()
                    .filter(|a| d.rect.contains(&a.rect))
                    .map(|a| a.id)
                    .collect();
                let di = paired.get(&ni).copied();
                let near: Vec<&Candidate> = symbols
                    .iter()
                    .zip(&symbol_owner)
                    .filter(|(_, owner)| **owner == di)
                    .map(|(s, _)| *s)
                    .collect();
                // The built step covers its symbols, so overlap checks must too.
                for symbol in &near {
                    rect = rect.union(&symbol.rect);
                }
                detail = detail
                    .with_link("diagram", d.id)
                    .with_links("arrows", inside)
                    .with_links("rotation_symbols", near.iter().map(|s| s.id).collect());
            }

            let score = self.config.number_weight * number.score
                + self.config.diagram_weight * pair_score
                + self.config.parts_list_weight * if list.is_some() { 1.0 } else { 0.0 };
            uses.push((
                Self::step_value(result, number),
                list.map(|l| l.id),
                diagram.map(|d| d.id),
            ));
            drafts.push(CandidateDraft::synthetic(rect, score, detail));
        }

        let mut model = ConstraintModel::new();
        let vars: Vec<_> = drafts.iter().map(|d| model.add_var(d.score)).collect();
        let mut by_value: BTreeMap<u32, Vec<_>> = BTreeMap::new();
        let mut by_list: BTreeMap<CandidateId, Vec<_>> = BTreeMap::new();
        let mut by_diagram: BTreeMap<CandidateId, Vec<_>> = BTreeMap::new();
        for (&var, (value, list, diagram)) in vars.iter().zip(&uses) {
            if let Some(v) = value {
                by_value.entry(*v).or_default().push(var);
            }
            if let Some(l) = list {
                by_list.entry(*l).or_default().push(var);
            }
            if let Some(d) = diagram {
                by_diagram.entry(*d).or_default().push(var);
            }
        }
        for group in by_value.values().chain(by_list.values()).chain(by_diagram.values()) {
            model.at_most_one_of(group);
        }
        for i in 0..drafts.len() {
            for j in (i + 1)..drafts.len() {
                if drafts[i].rect.iou(&drafts[j].rect) > self.config.max_step_overlap {
                    model.at_most_one_of(&[vars[i], vars[j]]);
                }
            }
        }
        apply_selection(Label::Step, &mut drafts, &vars, &model, env);
        drafts
    }

    fn build(
        &self,
        candidate: &Candidate,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<Element, CandidateFailure> {
        let detail = &candidate.score_detail;
        let number_id = detail
            .link("number")
            .ok_or_else(|| CandidateFailure::new("step has no step number"))?;
        let step_number: StepNumber = ctx.build_as(number_id)?;

        let parts_list = match detail.link("parts_list") {
            Some(id) => match ctx.build_as::<PartsList>(id) {
                Ok(list) => Some(list),
                Err(failure) => {
                    log::debug!("step {}: dropping parts list {}: {}", step_number.value, id, failure);
                    None
                }
            },
            None => None,
        };
        let diagram = match detail.link("diagram") {
            Some(id) => match ctx.build_as::<Diagram>(id) {
                Ok(diagram) => Some(diagram),
                Err(failure) => {
                    log::debug!("step {}: dropping diagram {}: {}", step_number.value, id, failure);
                    None
                }
            },
            None => None,
        };
        // Arrows and symbols only make sense with the diagram they were
        // matched to.
        let (arrows, rotation_symbols) = if diagram.is_some() {
            (
                ctx.build_all::<Arrow>(detail.linked("arrows")),
                ctx.build_all::<RotationSymbol>(detail.linked("rotation_symbols")),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let rect = Rect::union_all(
            std::iter::once(&step_number.rect)
                .chain(parts_list.as_ref().map(|l| &l.rect))
                .chain(diagram.as_ref().map(|d| &d.rect))
                .chain(arrows.iter().map(|a| &a.rect))
                .chain(rotation_symbols.iter().map(|s| &s.rect)),
        )
        .unwrap_or(step_number.rect);

        Ok(Step {
            rect,
            step_number,
            parts_list,
            diagram,
            arrows,
            rotation_symbols,
        }
        .into())
    }
}
