//! Semantic labels produced by classifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The output type of a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Page number in a bottom corner
    PageNumber,
    /// Number labelling a build step
    StepNumber,
    /// `2x` style quantity under a part
    PartCount,
    /// Picture of a single part
    PartImage,
    /// Part count paired with its picture
    Part,
    /// Box listing the parts needed for a step
    PartsList,
    /// Line separating page regions
    Divider,
    /// Assembly illustration
    Diagram,
    /// Arrow inside a diagram
    Arrow,
    /// "Rotate the model" symbol
    RotationSymbol,
    /// Progress indicator along the bottom edge
    ProgressBar,
    /// Large number on a "open bag N" marker
    BagNumber,
    /// "Open bag N" marker
    NewBag,
    /// Build step
    Step,
    /// Whole page
    Page,
}

impl Label {
    /// Every label, in declaration order.
    pub const ALL: [Label; 15] = [
        Label::PageNumber,
        Label::StepNumber,
        Label::PartCount,
        Label::PartImage,
        Label::Part,
        Label::PartsList,
        Label::Divider,
        Label::Diagram,
        Label::Arrow,
        Label::RotationSymbol,
        Label::ProgressBar,
        Label::BagNumber,
        Label::NewBag,
        Label::Step,
        Label::Page,
    ];

    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::PageNumber => "page_number",
            Label::StepNumber => "step_number",
            Label::PartCount => "part_count",
            Label::PartImage => "part_image",
            Label::Part => "part",
            Label::PartsList => "parts_list",
            Label::Divider => "divider",
            Label::Diagram => "diagram",
            Label::Arrow => "arrow",
            Label::RotationSymbol => "rotation_symbol",
            Label::ProgressBar => "progress_bar",
            Label::BagNumber => "bag_number",
            Label::NewBag => "new_bag",
            Label::Step => "step",
            Label::Page => "page",
        }
    }

    /// Static tie-break priority used by conflict resolution.
    ///
    /// Labels tied to a specific page location or shape outrank generic
    /// ones: a number in the bottom corner is far more telling than a number
    /// that merely looks like a step number.
    pub fn priority(&self) -> u8 {
        match self {
            Label::PageNumber => 100,
            Label::ProgressBar => 95,
            Label::BagNumber => 90,
            Label::PartCount => 85,
            Label::Divider => 80,
            Label::PartsList => 75,
            Label::RotationSymbol => 70,
            Label::Arrow => 65,
            Label::PartImage => 60,
            Label::StepNumber => 50,
            Label::Diagram => 40,
            Label::Part => 30,
            Label::NewBag => 25,
            Label::Step => 20,
            Label::Page => 0,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
