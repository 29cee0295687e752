//! Built-in classifiers.
//!
//! Each classifier produces one [`Label`](crate::classification::Label).
//! Leaf classifiers score raw blocks with a [`RuleSet`](crate::rules::RuleSet);
//! composite classifiers combine the candidates of the labels they require.
//!
//! Dependency graph (arrows point at what a classifier requires):
//!
//! ```text
//! page ─┬─> page_number
//!       ├─> progress_bar
//!       ├─> divider
//!       ├─> part ──> part_count, part_image
//!       ├─> new_bag ──> bag_number
//!       └─> step ─┬─> step_number
//!                 ├─> parts_list ──> part
//!                 ├─> diagram ──> bag_number, parts_list
//!                 ├─> arrow
//!                 ├─> rotation_symbol ──> diagram, part
//!                 └─> divider
//! ```

pub mod arrow;
pub mod bag_number;
pub(crate) mod common;
pub mod diagram;
pub mod divider;
pub mod new_bag;
pub mod page;
pub mod page_number;
pub mod part;
pub mod part_count;
pub mod part_image;
pub mod parts_list;
pub mod progress_bar;
pub mod rotation_symbol;
pub mod step;
pub mod step_number;

pub use arrow::ArrowClassifier;
pub use bag_number::BagNumberClassifier;
pub use diagram::DiagramClassifier;
pub use divider::DividerClassifier;
pub use new_bag::NewBagClassifier;
pub use page::PageClassifier;
pub use page_number::PageNumberClassifier;
pub use part::PartClassifier;
pub use part_count::PartCountClassifier;
pub use part_image::PartImageClassifier;
pub use parts_list::PartsListClassifier;
pub use progress_bar::ProgressBarClassifier;
pub use rotation_symbol::RotationSymbolClassifier;
pub use step::StepClassifier;
pub use step_number::StepNumberClassifier;

use crate::classification::Classifier;
use crate::config::ClassifierConfig;
use crate::error::Result;

/// One instance of every built-in classifier, configured from `config`.
///
/// The order is irrelevant; [`Schedule`](crate::classification::Schedule)
/// sorts them by dependency.
pub fn default_classifiers(config: &ClassifierConfig) -> Result<Vec<Box<dyn Classifier>>> {
    Ok(vec![
        Box::new(PageNumberClassifier::new(config)?),
        Box::new(StepNumberClassifier::new(config)?),
        Box::new(PartCountClassifier::new(config)?),
        Box::new(PartImageClassifier::new(config)?),
        Box::new(PartClassifier::new(config)?),
        Box::new(PartsListClassifier::new(config)?),
        Box::new(DividerClassifier::new(config)?),
        Box::new(DiagramClassifier::new(config)?),
        Box::new(ArrowClassifier::new(config)?),
        Box::new(RotationSymbolClassifier::new(config)?),
        Box::new(ProgressBarClassifier::new(config)?),
        Box::new(BagNumberClassifier::new(config)?),
        Box::new(NewBagClassifier::new(config)?),
        Box::new(StepClassifier::new(config)?),
        Box::new(PageClassifier::new(config)?),
    ])
}
