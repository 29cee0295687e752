//! Configuration for page classification.
//!
//! [`ClassifierConfig`] gathers the engine settings and the thresholds of
//! every built-in classifier. All structs deserialize with
//! `#[serde(default)]`, so a JSON file only needs to name the values it
//! overrides:
//!
//! ```
//! use instruction_oxide::config::ClassifierConfig;
//!
//! let config = ClassifierConfig::from_json_str(r#"{
//!     "min_candidate_score": 0.4,
//!     "divider": { "max_thickness": 3.0 }
//! }"#).unwrap();
//! assert_eq!(config.min_candidate_score, 0.4);
//! assert_eq!(config.divider.max_thickness, 3.0);
//! assert_eq!(config.divider.min_span, ClassifierConfig::default().divider.min_span);
//! ```

use crate::classification::{ConflictConfig, DuplicateConfig};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::hints::HintsConfig;
use crate::pairing::PairingConfig;
use crate::solver::SolverLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page number thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberConfig {
    /// Fraction of the page height, measured from the bottom, where page
    /// numbers live
    pub bottom_band: f64,
    /// Corner distance (fraction of the page diagonal) at which the corner
    /// score reaches zero
    pub max_corner_distance: f64,
    /// Relative font-size deviation at which the size score reaches zero
    pub font_tolerance: f64,
    /// Bonus when the printed value equals `page_index + 1`
    pub expected_value_bonus: f64,
}

impl Default for PageNumberConfig {
    fn default() -> Self {
        Self {
            bottom_band: 0.1,
            max_corner_distance: 0.25,
            font_tolerance: 0.5,
            expected_value_bonus: 0.05,
        }
    }
}

/// Step number thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepNumberConfig {
    /// Band at the bottom of the page where step numbers never appear
    pub excluded_bottom_band: f64,
    /// Relative font-size deviation at which the size score reaches zero
    pub font_tolerance: f64,
    /// Step numbers must exceed the part-count size by this relative margin
    pub part_count_margin: f64,
}

impl Default for StepNumberConfig {
    fn default() -> Self {
        Self {
            excluded_bottom_band: 0.1,
            font_tolerance: 0.4,
            part_count_margin: 0.1,
        }
    }
}

/// Part count thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartCountConfig {
    /// Relative font-size deviation at which the size score reaches zero
    pub font_tolerance: f64,
}

impl Default for PartCountConfig {
    fn default() -> Self {
        Self {
            font_tolerance: 0.5,
        }
    }
}

/// Part image thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartImageConfig {
    /// Shorter side (points) below which an image is too small
    pub min_side: f64,
    /// Page area fraction above which the score starts to fall
    pub max_area_fraction: f64,
}

impl Default for PartImageConfig {
    fn default() -> Self {
        Self {
            min_side: 4.0,
            max_area_fraction: 0.04,
        }
    }
}

/// Part (count + image) pairing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartConfig {
    /// Largest vertical gap (points) between image bottom and count top
    pub max_gap: f64,
    /// Horizontal slack (points) when checking the count sits under the image
    pub horizontal_slack: f64,
}

impl Default for PartConfig {
    fn default() -> Self {
        Self {
            max_gap: 25.0,
            horizontal_slack: 5.0,
        }
    }
}

/// Parts list thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartsListConfig {
    /// Smallest box as a fraction of the page area
    pub min_area_fraction: f64,
    /// Largest box as a fraction of the page area
    pub max_area_fraction: f64,
    /// Number of parts at which the content score saturates
    pub saturating_parts: usize,
}

impl Default for PartsListConfig {
    fn default() -> Self {
        Self {
            min_area_fraction: 0.002,
            max_area_fraction: 0.35,
            saturating_parts: 2,
        }
    }
}

/// Divider thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerConfig {
    /// Largest stroke thickness (points)
    pub max_thickness: f64,
    /// Minimum span as a fraction of the page width or height
    pub min_span: f64,
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self {
            max_thickness: 2.5,
            min_span: 0.4,
        }
    }
}

/// Diagram thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Page area fraction below which a block scores zero
    pub min_area_fraction: f64,
    /// Page area fraction at which a block scores one
    pub full_area_fraction: f64,
    /// Blocks closer than this (points) merge into one diagram
    pub merge_gap: f64,
    /// Minimum share of the merged rectangle covered by its blocks
    pub min_coverage: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            min_area_fraction: 0.02,
            full_area_fraction: 0.06,
            merge_gap: 2.0,
            min_coverage: 0.3,
        }
    }
}

/// Arrow thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    /// Smallest shorter side (points)
    pub min_size: f64,
    /// Largest shorter side (points) before the score falls
    pub max_size: f64,
    /// Fewest drawn segments
    pub min_segments: usize,
    /// Most drawn segments
    pub max_segments: usize,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            min_size: 3.0,
            max_size: 30.0,
            min_segments: 3,
            max_segments: 8,
        }
    }
}

/// Rotation symbol thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSymbolConfig {
    /// Smallest side (points)
    pub min_size: f64,
    /// Largest side (points)
    pub max_size: f64,
    /// Largest distance (points) to a diagram
    pub max_diagram_distance: f64,
}

impl Default for RotationSymbolConfig {
    fn default() -> Self {
        Self {
            min_size: 8.0,
            max_size: 45.0,
            max_diagram_distance: 30.0,
        }
    }
}

/// Progress bar thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBarConfig {
    /// Fraction of the page height, measured from the bottom, to search
    pub bottom_band: f64,
    /// Minimum width as a fraction of the page width
    pub min_width_fraction: f64,
    /// Largest bar height (points)
    pub max_height: f64,
    /// Minimum width/height ratio
    pub min_aspect: f64,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            bottom_band: 0.15,
            min_width_fraction: 0.3,
            max_height: 12.0,
            min_aspect: 8.0,
        }
    }
}

/// Bag number and bag marker thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BagConfig {
    /// Fraction of the page height, from the top, where bag markers appear
    pub top_band: f64,
    /// Text height (points) at which a number is surely large enough
    pub min_height: f64,
    /// Bag numbers must exceed the step-number size by this relative margin
    pub step_number_margin: f64,
    /// Score factor for a bag number without enclosing artwork
    pub bare_number_factor: f64,
    /// Largest share of the page area an image may cover and still count
    /// as bag artwork
    pub max_artwork_area_fraction: f64,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            top_band: 0.6,
            min_height: 24.0,
            step_number_margin: 0.3,
            bare_number_factor: 0.8,
            max_artwork_area_fraction: 0.25,
        }
    }
}

impl BagConfig {
    /// Whether `rect` is small enough on `page` to be bag artwork.
    pub fn fits_artwork(&self, rect: &Rect, page: &Rect) -> bool {
        rect.area() <= self.max_artwork_area_fraction * page.area()
    }
}

/// Step assembly thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Largest gap (points) between a parts list and the step number below it
    pub parts_list_max_gap: f64,
    /// Largest IOU two selected steps may have
    pub max_step_overlap: f64,
    /// Weight of the step number score
    pub number_weight: f64,
    /// Weight of the diagram pairing score
    pub diagram_weight: f64,
    /// Weight of having a parts list
    pub parts_list_weight: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            parts_list_max_gap: 40.0,
            max_step_overlap: 0.05,
            number_weight: 0.5,
            diagram_weight: 0.3,
            parts_list_weight: 0.2,
        }
    }
}

/// Page assembly thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Standalone parts needed for the catalog category
    pub catalog_min_parts: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            catalog_min_parts: 3,
        }
    }
}

/// Complete configuration of the classification engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Rule-scored candidates below this score are not recorded
    pub min_candidate_score: f64,
    /// Font-size hint collection
    pub hints: HintsConfig,
    /// Near-duplicate suppression
    pub duplicates: DuplicateConfig,
    /// Cross-label conflict resolution
    pub conflicts: ConflictConfig,
    /// Constraint solver budget
    pub solver: SolverLimits,
    /// Step-to-diagram pairing
    pub pairing: PairingConfig,
    /// Page numbers
    pub page_number: PageNumberConfig,
    /// Step numbers
    pub step_number: StepNumberConfig,
    /// Part counts
    pub part_count: PartCountConfig,
    /// Part images
    pub part_image: PartImageConfig,
    /// Parts
    pub part: PartConfig,
    /// Parts lists
    pub parts_list: PartsListConfig,
    /// Dividers
    pub divider: DividerConfig,
    /// Diagrams
    pub diagram: DiagramConfig,
    /// Arrows
    pub arrow: ArrowConfig,
    /// Rotation symbols
    pub rotation_symbol: RotationSymbolConfig,
    /// Progress bars
    pub progress_bar: ProgressBarConfig,
    /// Bag numbers and bag markers
    pub bag: BagConfig,
    /// Steps
    pub step: StepConfig,
    /// Page assembly
    pub page: PageConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierConfig {
    /// Create a configuration with the tuned defaults.
    pub fn new() -> Self {
        Self {
            min_candidate_score: 0.5,
            hints: HintsConfig::default(),
            duplicates: DuplicateConfig::default(),
            conflicts: ConflictConfig::default(),
            solver: SolverLimits::default(),
            pairing: PairingConfig::default(),
            page_number: PageNumberConfig::default(),
            step_number: StepNumberConfig::default(),
            part_count: PartCountConfig::default(),
            part_image: PartImageConfig::default(),
            part: PartConfig::default(),
            parts_list: PartsListConfig::default(),
            divider: DividerConfig::default(),
            diagram: DiagramConfig::default(),
            arrow: ArrowConfig::default(),
            rotation_symbol: RotationSymbolConfig::default(),
            progress_bar: ProgressBarConfig::default(),
            bag: BagConfig::default(),
            step: StepConfig::default(),
            page: PageConfig::default(),
        }
    }

    /// Set the score floor for rule-scored candidates.
    pub fn with_min_candidate_score(mut self, score: f64) -> Self {
        self.min_candidate_score = score;
        self
    }

    /// Set the duplicate suppression settings.
    pub fn with_duplicates(mut self, duplicates: DuplicateConfig) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Set the conflict resolution settings.
    pub fn with_conflicts(mut self, conflicts: ConflictConfig) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Set the solver budget.
    pub fn with_solver(mut self, solver: SolverLimits) -> Self {
        self.solver = solver;
        self
    }

    /// Set the pairing weights.
    pub fn with_pairing(mut self, pairing: PairingConfig) -> Self {
        self.pairing = pairing;
        self
    }

    /// Set the hint collection settings.
    pub fn with_hints(mut self, hints: HintsConfig) -> Self {
        self.hints = hints;
        self
    }

    /// Parse a (partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a (partial) JSON configuration file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values no classifier can work with.
    pub fn validate(&self) -> Result<()> {
        fn fraction(name: &str, value: f64) -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must lie in [0, 1], got {value}")))
            }
        }
        fn positive(name: &str, value: f64) -> Result<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")))
            }
        }

        fraction("min_candidate_score", self.min_candidate_score)?;
        fraction("hints.catalog_start", self.hints.catalog_start)?;
        fraction("hints.bottom_band", self.hints.bottom_band)?;
        positive("hints.bin_width", self.hints.bin_width)?;
        fraction("duplicates.iou_threshold", self.duplicates.iou_threshold)?;
        fraction("duplicates.min_area_ratio", self.duplicates.min_area_ratio)?;
        if self.conflicts.score_ratio < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "conflicts.score_ratio must be at least 1, got {}",
                self.conflicts.score_ratio
            )));
        }
        if self.solver.max_nodes == 0 {
            return Err(Error::InvalidConfig("solver.max_nodes must be positive".into()));
        }
        positive("pairing.position_decay", self.pairing.position_decay)?;
        positive("pairing.max_distance", self.pairing.max_distance)?;
        if self.pairing.position_weight < 0.0
            || self.pairing.distance_weight < 0.0
            || self.pairing.position_weight + self.pairing.distance_weight <= 0.0
        {
            return Err(Error::InvalidConfig(
                "pairing weights must be non-negative and not both zero".into(),
            ));
        }
        fraction("page_number.bottom_band", self.page_number.bottom_band)?;
        positive("page_number.max_corner_distance", self.page_number.max_corner_distance)?;
        positive("page_number.font_tolerance", self.page_number.font_tolerance)?;
        fraction("step_number.excluded_bottom_band", self.step_number.excluded_bottom_band)?;
        positive("step_number.font_tolerance", self.step_number.font_tolerance)?;
        positive("part_count.font_tolerance", self.part_count.font_tolerance)?;
        positive("part_image.min_side", self.part_image.min_side)?;
        positive("part_image.max_area_fraction", self.part_image.max_area_fraction)?;
        positive("part.max_gap", self.part.max_gap)?;
        positive("parts_list.min_area_fraction", self.parts_list.min_area_fraction)?;
        fraction("parts_list.max_area_fraction", self.parts_list.max_area_fraction)?;
        if self.parts_list.min_area_fraction >= self.parts_list.max_area_fraction {
            return Err(Error::InvalidConfig(
                "parts_list.min_area_fraction must be below max_area_fraction".into(),
            ));
        }
        if self.parts_list.saturating_parts == 0 {
            return Err(Error::InvalidConfig("parts_list.saturating_parts must be positive".into()));
        }
        positive("divider.max_thickness", self.divider.max_thickness)?;
        fraction("divider.min_span", self.divider.min_span)?;
        positive("divider.min_span", self.divider.min_span)?;
        positive("diagram.min_area_fraction", self.diagram.min_area_fraction)?;
        if self.diagram.full_area_fraction <= self.diagram.min_area_fraction {
            return Err(Error::InvalidConfig(
                "diagram.full_area_fraction must exceed min_area_fraction".into(),
            ));
        }
        fraction("diagram.min_coverage", self.diagram.min_coverage)?;
        positive("arrow.min_size", self.arrow.min_size)?;
        if self.arrow.max_size <= self.arrow.min_size {
            return Err(Error::InvalidConfig("arrow.max_size must exceed min_size".into()));
        }
        if self.arrow.min_segments > self.arrow.max_segments {
            return Err(Error::InvalidConfig(
                "arrow.min_segments must not exceed max_segments".into(),
            ));
        }
        positive("rotation_symbol.min_size", self.rotation_symbol.min_size)?;
        if self.rotation_symbol.max_size <= self.rotation_symbol.min_size {
            return Err(Error::InvalidConfig(
                "rotation_symbol.max_size must exceed min_size".into(),
            ));
        }
        fraction("progress_bar.bottom_band", self.progress_bar.bottom_band)?;
        positive("progress_bar.min_width_fraction", self.progress_bar.min_width_fraction)?;
        positive("progress_bar.max_height", self.progress_bar.max_height)?;
        positive("progress_bar.min_aspect", self.progress_bar.min_aspect)?;
        fraction("bag.top_band", self.bag.top_band)?;
        positive("bag.min_height", self.bag.min_height)?;
        fraction("bag.bare_number_factor", self.bag.bare_number_factor)?;
        fraction("bag.max_artwork_area_fraction", self.bag.max_artwork_area_fraction)?;
        fraction("step.max_step_overlap", self.step.max_step_overlap)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ClassifierConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ClassifierConfig::new()
            .with_min_candidate_score(0.3)
            .with_solver(SolverLimits::default().with_max_nodes(10));
        assert_eq!(config.min_candidate_score, 0.3);
        assert_eq!(config.solver.max_nodes, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ClassifierConfig::from_json_str(r#"{"min_candidate_score": 1.5}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = ClassifierConfig::from_json_str(r#"{"arrow": {"min_size": 10, "max_size": 5}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("arrow.max_size"));
    }

    #[test]
    fn test_malformed_json_is_a_json_error() {
        let err = ClassifierConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_round_trip() {
        let config = ClassifierConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ClassifierConfig::from_json_str(&json).unwrap(), config);
    }
}
