//! Built-in rules used by the classifier library.

use super::{Rule, RuleContext};
use crate::blocks::Block;
use crate::geometry::{euclidean_distance, Point};
use crate::hints::FontBucket;
use crate::rules::scale::Scale;
use regex::Regex;

/// Matches the text of a text block against a pattern.
///
/// Scores 1.0 on a match and 0.0 otherwise; not applicable to images and
/// paths.
pub struct TextPatternRule {
    name: String,
    pattern: &'static Regex,
}

impl TextPatternRule {
    /// Create a pattern rule.
    pub fn new(name: impl Into<String>, pattern: &'static Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }
}

impl Rule for TextPatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, _ctx: &RuleContext<'_>) -> Option<f64> {
        let text = block.as_text()?;
        Some(if self.pattern.is_match(&text.text) {
            1.0
        } else {
            0.0
        })
    }
}

#[derive(Debug, Clone)]
enum FontSizeMode {
    Near(Scale),
    LargerThan { margin: f64 },
}

/// Compares a text block's font size with a hinted ideal size.
///
/// Not applicable when the document produced no hint for the bucket.
pub struct FontSizeRule {
    name: String,
    bucket: FontBucket,
    mode: FontSizeMode,
}

impl FontSizeRule {
    /// Score by the relative deviation `|size - ideal| / ideal` fed into
    /// `scale`.
    pub fn near(name: impl Into<String>, bucket: FontBucket, scale: Scale) -> Self {
        Self {
            name: name.into(),
            bucket,
            mode: FontSizeMode::Near(scale),
        }
    }

    /// Score 1.0 when the size exceeds the hinted size by more than
    /// `margin` (relative), 0.0 otherwise.
    pub fn larger_than(name: impl Into<String>, bucket: FontBucket, margin: f64) -> Self {
        Self {
            name: name.into(),
            bucket,
            mode: FontSizeMode::LargerThan { margin },
        }
    }
}

impl Rule for FontSizeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> Option<f64> {
        let text = block.as_text()?;
        let ideal = ctx.hints.size_for(self.bucket)?;
        if ideal <= 0.0 {
            return None;
        }
        let size = text.effective_font_size();
        Some(match &self.mode {
            FontSizeMode::Near(scale) => scale.score((size - ideal).abs() / ideal),
            FontSizeMode::LargerThan { margin } => {
                if size > ideal * (1.0 + margin) {
                    1.0
                } else {
                    0.0
                }
            }
        })
    }
}

/// A page corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// Top-left corner
    TopLeft,
    /// Top-right corner
    TopRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-right corner
    BottomRight,
}

/// Scores the distance from the block center to the nearest of the given
/// page corners, measured as a fraction of the page diagonal.
pub struct CornerDistanceRule {
    name: String,
    corners: Vec<Corner>,
    scale: Scale,
}

impl CornerDistanceRule {
    /// Create a corner rule.
    pub fn new(name: impl Into<String>, corners: Vec<Corner>, scale: Scale) -> Self {
        Self {
            name: name.into(),
            corners,
            scale,
        }
    }
}

impl Rule for CornerDistanceRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> Option<f64> {
        let page = ctx.page_rect;
        let diagonal = (page.width().powi(2) + page.height().powi(2)).sqrt();
        if diagonal <= 0.0 {
            return None;
        }
        let center = block.rect().center();
        let nearest = self
            .corners
            .iter()
            .map(|corner| {
                let p = match corner {
                    Corner::TopLeft => Point::new(page.x0, page.y0),
                    Corner::TopRight => Point::new(page.x1, page.y0),
                    Corner::BottomLeft => Point::new(page.x0, page.y1),
                    Corner::BottomRight => Point::new(page.x1, page.y1),
                };
                euclidean_distance(&center, &p)
            })
            .fold(f64::INFINITY, f64::min);
        if !nearest.is_finite() {
            return None;
        }
        Some(self.scale.score(nearest / diagonal))
    }
}

/// A horizontal band of the page, as a fraction of its height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalBand {
    /// The top `f` of the page
    Top(f64),
    /// The bottom `f` of the page
    Bottom(f64),
}

/// Checks whether the block's center lies inside (or outside) a band.
pub struct BandRule {
    name: String,
    band: VerticalBand,
    inside: bool,
}

impl BandRule {
    /// Score 1.0 when the block center is inside the band.
    pub fn inside(name: impl Into<String>, band: VerticalBand) -> Self {
        Self {
            name: name.into(),
            band,
            inside: true,
        }
    }

    /// Score 1.0 when the block center is outside the band.
    pub fn outside(name: impl Into<String>, band: VerticalBand) -> Self {
        Self {
            name: name.into(),
            band,
            inside: false,
        }
    }
}

impl Rule for BandRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> Option<f64> {
        let page = ctx.page_rect;
        let cy = block.rect().center().y;
        let in_band = match self.band {
            VerticalBand::Top(f) => cy <= page.y0 + page.height() * f,
            VerticalBand::Bottom(f) => cy >= page.y1 - page.height() * f,
        };
        Some(if in_band == self.inside { 1.0 } else { 0.0 })
    }
}

/// The measured dimension of a [`SizeRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Absolute width
    Width,
    /// Absolute height
    Height,
    /// Absolute area
    Area,
    /// Width as a fraction of the page width
    WidthFraction,
    /// Height as a fraction of the page height
    HeightFraction,
    /// Area as a fraction of the page area
    AreaFraction,
    /// The shorter side
    ShortSide,
}

/// Feeds a size measurement into a scale.
pub struct SizeRule {
    name: String,
    measure: Measure,
    scale: Scale,
}

impl SizeRule {
    /// Create a size rule.
    pub fn new(name: impl Into<String>, measure: Measure, scale: Scale) -> Self {
        Self {
            name: name.into(),
            measure,
            scale,
        }
    }
}

impl Rule for SizeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, ctx: &RuleContext<'_>) -> Option<f64> {
        let r = block.rect();
        let page = ctx.page_rect;
        let value = match self.measure {
            Measure::Width => r.width(),
            Measure::Height => r.height(),
            Measure::Area => r.area(),
            Measure::WidthFraction if page.width() > 0.0 => r.width() / page.width(),
            Measure::HeightFraction if page.height() > 0.0 => r.height() / page.height(),
            Measure::AreaFraction if page.area() > 0.0 => r.area() / page.area(),
            Measure::ShortSide => r.width().min(r.height()),
            _ => return None,
        };
        Some(self.scale.score(value))
    }
}

/// Feeds the width/height ratio into a scale.
pub struct AspectRatioRule {
    name: String,
    scale: Scale,
}

impl AspectRatioRule {
    /// Create an aspect-ratio rule.
    pub fn new(name: impl Into<String>, scale: Scale) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }
}

impl Rule for AspectRatioRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, _ctx: &RuleContext<'_>) -> Option<f64> {
        block.rect().aspect_ratio().map(|ar| self.scale.score(ar))
    }
}

/// Scores whether a path is filled. Not applicable to text and images.
pub struct FilledRule {
    name: String,
    filled: f64,
    unfilled: f64,
}

impl FilledRule {
    /// Create a fill rule with the scores for filled and unfilled paths.
    pub fn new(name: impl Into<String>, filled: f64, unfilled: f64) -> Self {
        Self {
            name: name.into(),
            filled,
            unfilled,
        }
    }
}

impl Rule for FilledRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, _ctx: &RuleContext<'_>) -> Option<f64> {
        let path = block.as_path()?;
        Some(if path.has_fill() {
            self.filled
        } else {
            self.unfilled
        })
    }
}

/// Scores 1.0 for closed paths; needs recorded path commands.
pub struct ClosedPathRule {
    name: String,
}

impl ClosedPathRule {
    /// Create a closed-path rule.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Rule for ClosedPathRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, _ctx: &RuleContext<'_>) -> Option<f64> {
        let path = block.as_path()?;
        path.path_commands.as_ref()?;
        Some(if path.is_closed() { 1.0 } else { 0.0 })
    }
}

/// Feeds the number of drawn segments into a scale.
pub struct SegmentCountRule {
    name: String,
    scale: Scale,
}

impl SegmentCountRule {
    /// Create a segment-count rule.
    pub fn new(name: impl Into<String>, scale: Scale) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }
}

impl Rule for SegmentCountRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, block: &Block, _ctx: &RuleContext<'_>) -> Option<f64> {
        let path = block.as_path()?;
        path.path_commands.as_ref()?;
        Some(self.scale.score(path.segment_count() as f64))
    }
}
