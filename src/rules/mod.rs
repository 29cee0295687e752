//! Composable scoring rules.
//!
//! A [`Rule`] looks at one block in the context of its page and returns a
//! score in `[0, 1]`, or `None` when it has nothing to say about that block.
//! A [`RuleSet`] combines rules as a weighted average over the applicable
//! ones. Rules marked as required act as a gate: a required rule scoring
//! exactly zero rejects the block outright instead of lowering its score.

pub mod builtin;
pub mod patterns;
pub mod scale;

pub use builtin::{
    AspectRatioRule, BandRule, ClosedPathRule, CornerDistanceRule, Corner, FilledRule,
    FontSizeRule, Measure, SegmentCountRule, SizeRule, TextPatternRule, VerticalBand,
};
pub use scale::{DiscreteScale, LinearScale, Scale, StepScale};

use crate::blocks::Block;
use crate::geometry::Rect;
use crate::hints::FontSizeHints;
use indexmap::IndexMap;

/// Page-level context a rule may consult.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Page rectangle
    pub page_rect: Rect,
    /// Zero-based page index
    pub page_index: usize,
    /// Document font-size hints
    pub hints: &'a FontSizeHints,
}

/// A single scoring rule.
pub trait Rule: Send + Sync {
    /// Name used in score breakdowns.
    fn name(&self) -> &str;

    /// Score the block, or `None` when the rule does not apply to it.
    fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> Option<f64>;
}

struct WeightedRule {
    rule: Box<dyn Rule>,
    weight: f64,
    required: bool,
}

/// Outcome of running a [`RuleSet`] against one block.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleVerdict {
    /// A required rule scored zero.
    Rejected {
        /// Name of the rule that rejected the block
        rule: String,
    },
    /// Weighted average of the applicable rules.
    Scored {
        /// Combined score in `[0, 1]`
        score: f64,
        /// Per-rule scores in evaluation order
        components: IndexMap<String, f64>,
    },
}

impl RuleVerdict {
    /// The combined score, `None` if the block was rejected.
    pub fn score(&self) -> Option<f64> {
        match self {
            RuleVerdict::Scored { score, .. } => Some(*score),
            RuleVerdict::Rejected { .. } => None,
        }
    }
}

/// An ordered collection of weighted rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<WeightedRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule that contributes to the weighted average.
    pub fn with(mut self, rule: impl Rule + 'static, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Box::new(rule),
            weight,
            required: false,
        });
        self
    }

    /// Add a rule that also acts as a hard gate.
    pub fn require(mut self, rule: impl Rule + 'static, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Box::new(rule),
            weight,
            required: true,
        });
        self
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against the block.
    ///
    /// Evaluation stops at the first required rule that scores zero. When
    /// no rule applies the block scores zero.
    pub fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> RuleVerdict {
        let mut components = IndexMap::new();
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for entry in &self.rules {
            let Some(score) = entry.rule.evaluate(block, ctx) else {
                continue;
            };
            let score = score.clamp(0.0, 1.0);
            if entry.required && score == 0.0 {
                return RuleVerdict::Rejected {
                    rule: entry.rule.name().to_string(),
                };
            }
            components.insert(entry.rule.name().to_string(), score);
            weighted_sum += score * entry.weight;
            total_weight += entry.weight;
        }

        let score = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            0.0
        };
        RuleVerdict::Scored { score, components }
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| (r.rule.name(), r.weight, r.required)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Option<f64>);

    impl Rule for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn evaluate(&self, _block: &Block, _ctx: &RuleContext<'_>) -> Option<f64> {
            self.1
        }
    }

    fn ctx(hints: &FontSizeHints) -> RuleContext<'_> {
        RuleContext {
            page_rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            page_index: 0,
            hints,
        }
    }

    #[test]
    fn test_weighted_average_skips_inapplicable_rules() {
        let hints = FontSizeHints::default();
        let block = Block::text(1, Rect::new(0.0, 0.0, 1.0, 1.0), "1");
        let rules = RuleSet::new()
            .with(Fixed("a", Some(1.0)), 3.0)
            .with(Fixed("b", Some(0.0)), 1.0)
            .with(Fixed("c", None), 100.0);
        match rules.evaluate(&block, &ctx(&hints)) {
            RuleVerdict::Scored { score, components } => {
                assert_eq!(score, 0.75);
                assert_eq!(components.keys().collect::<Vec<_>>(), vec!["a", "b"]);
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_required_zero_rejects() {
        let hints = FontSizeHints::default();
        let block = Block::text(1, Rect::new(0.0, 0.0, 1.0, 1.0), "1");
        let rules = RuleSet::new()
            .with(Fixed("good", Some(1.0)), 1.0)
            .require(Fixed("gate", Some(0.0)), 1.0);
        assert_eq!(
            rules.evaluate(&block, &ctx(&hints)),
            RuleVerdict::Rejected {
                rule: "gate".to_string()
            }
        );
    }

    #[test]
    fn test_required_rule_not_applicable_does_not_reject() {
        let hints = FontSizeHints::default();
        let block = Block::text(1, Rect::new(0.0, 0.0, 1.0, 1.0), "1");
        let rules = RuleSet::new()
            .require(Fixed("gate", None), 1.0)
            .with(Fixed("good", Some(0.4)), 1.0);
        assert_eq!(rules.evaluate(&block, &ctx(&hints)).score(), Some(0.4));
    }

    #[test]
    fn test_no_applicable_rules_scores_zero() {
        let hints = FontSizeHints::default();
        let block = Block::text(1, Rect::new(0.0, 0.0, 1.0, 1.0), "1");
        let rules = RuleSet::new().with(Fixed("c", None), 1.0);
        assert_eq!(rules.evaluate(&block, &ctx(&hints)).score(), Some(0.0));
    }
}
