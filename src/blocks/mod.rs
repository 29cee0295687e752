//! Raw page primitives handed over by the extraction step.
//!
//! A page arrives as a flat list of [`Block`]s: text runs, raster images and
//! vector paths, each with a page-unique [`BlockId`] and a bounding rectangle.
//! Blocks are immutable. Classification never edits or drops them; which
//! blocks are claimed is tracked by the
//! [`ClassificationResult`](crate::classification::ClassificationResult).

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable page-scoped identifier of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel (0.0 - 1.0)
    pub r: f64,
    /// Green channel (0.0 - 1.0)
    pub g: f64,
    /// Blue channel (0.0 - 1.0)
    pub b: f64,
}

impl Color {
    /// Create a new color.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a black color.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Create a white color.
    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Perceived brightness (Rec. 601 luma).
    pub fn luminance(&self) -> f64 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

/// A single drawing command of a vector path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathCommand {
    /// Begin a new subpath
    MoveTo {
        /// Target point x
        x: f64,
        /// Target point y
        y: f64,
    },
    /// Straight line to the point
    LineTo {
        /// Target point x
        x: f64,
        /// Target point y
        y: f64,
    },
    /// Cubic Bézier curve ending at `(x, y)`
    CurveTo {
        /// First control point x
        x1: f64,
        /// First control point y
        y1: f64,
        /// Second control point x
        x2: f64,
        /// Second control point y
        y2: f64,
        /// End point x
        x: f64,
        /// End point y
        y: f64,
    },
    /// Axis-aligned rectangle subpath
    Rectangle {
        /// Left edge
        x: f64,
        /// Top edge
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
    },
    /// Close the current subpath
    ClosePath,
}

/// A run of text with optional font information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Page-unique id
    pub id: BlockId,
    /// Bounding box
    pub rect: Rect,
    /// Text content
    pub text: String,
    /// Font name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    /// Font size in points, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl TextBlock {
    /// Font size, falling back to the box height when extraction had none.
    pub fn effective_font_size(&self) -> f64 {
        self.font_size.unwrap_or_else(|| self.rect.height())
    }
}

/// A raster image placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Page-unique id
    pub id: BlockId,
    /// Bounding box
    pub rect: Rect,
    /// Reference to the image data (xref or digest)
    pub image_ref: String,
}

/// A vector path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathBlock {
    /// Page-unique id
    pub id: BlockId,
    /// Bounding box
    pub rect: Rect,
    /// Fill color (None for no fill)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    /// Stroke color (None for no stroke)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    /// Drawing commands, if extraction recorded them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_commands: Option<Vec<PathCommand>>,
}

impl PathBlock {
    /// Check if this path has a fill.
    pub fn has_fill(&self) -> bool {
        self.fill_color.is_some()
    }

    /// Check if this path has a stroke.
    pub fn has_stroke(&self) -> bool {
        self.stroke_color.is_some()
    }

    /// Number of straight or curved segments drawn by the path.
    ///
    /// A `ClosePath` adds the closing edge unless the current point is
    /// already back at the subpath start.
    pub fn segment_count(&self) -> usize {
        let Some(cmds) = self.path_commands.as_ref() else {
            return 0;
        };
        let mut count = 0;
        let mut start: Option<Point> = None;
        let mut current: Option<Point> = None;
        for cmd in cmds {
            match cmd {
                PathCommand::MoveTo { x, y } => {
                    start = Some(Point::new(*x, *y));
                    current = start;
                },
                PathCommand::LineTo { x, y } | PathCommand::CurveTo { x, y, .. } => {
                    count += 1;
                    if start.is_none() {
                        start = Some(Point::new(*x, *y));
                    }
                    current = Some(Point::new(*x, *y));
                },
                PathCommand::Rectangle { x, y, .. } => {
                    count += 4;
                    start = Some(Point::new(*x, *y));
                    current = start;
                },
                PathCommand::ClosePath => {
                    if let (Some(s), Some(c)) = (start, current) {
                        if !same_point(&s, &c) {
                            count += 1;
                        }
                    }
                    current = start;
                },
            }
        }
        count
    }

    /// Whether the path ends with an explicit close or is a rectangle.
    pub fn is_closed(&self) -> bool {
        self.path_commands.as_ref().is_some_and(|cmds| {
            matches!(
                cmds.last(),
                Some(PathCommand::ClosePath) | Some(PathCommand::Rectangle { .. })
            ) || closes_on_start(cmds)
        })
    }
}

fn closes_on_start(cmds: &[PathCommand]) -> bool {
    let start = cmds.iter().find_map(|c| match c {
        PathCommand::MoveTo { x, y } => Some(Point::new(*x, *y)),
        _ => None,
    });
    let end = cmds.iter().rev().find_map(|c| match c {
        PathCommand::LineTo { x, y } | PathCommand::CurveTo { x, y, .. } => {
            Some(Point::new(*x, *y))
        }
        _ => None,
    });
    match (start, end) {
        (Some(s), Some(e)) => same_point(&s, &e),
        _ => false,
    }
}

fn same_point(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() < 0.5 && (a.y - b.y).abs() < 0.5
}

/// Kind discriminant of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Text run
    Text,
    /// Raster image
    Image,
    /// Vector path
    Path,
}

impl BlockKind {
    /// All block kinds.
    pub const ALL: [BlockKind; 3] = [BlockKind::Text, BlockKind::Image, BlockKind::Path];
}

/// A geometric primitive on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Text run
    Text(TextBlock),
    /// Raster image
    Image(ImageBlock),
    /// Vector path
    Path(PathBlock),
}

impl Block {
    /// Page-unique id.
    pub fn id(&self) -> BlockId {
        match self {
            Block::Text(t) => t.id,
            Block::Image(i) => i.id,
            Block::Path(p) => p.id,
        }
    }

    /// Bounding box.
    pub fn rect(&self) -> Rect {
        match self {
            Block::Text(t) => t.rect,
            Block::Image(i) => i.rect,
            Block::Path(p) => p.rect,
        }
    }

    /// Kind discriminant.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Text(_) => BlockKind::Text,
            Block::Image(_) => BlockKind::Image,
            Block::Path(_) => BlockKind::Path,
        }
    }

    /// Get as text block if this is a text run.
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get as image block if this is an image.
    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            Block::Image(i) => Some(i),
            _ => None,
        }
    }

    /// Get as path block if this is a vector path.
    pub fn as_path(&self) -> Option<&PathBlock> {
        match self {
            Block::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Convenience constructor for a text block.
    pub fn text(id: u32, rect: Rect, text: impl Into<String>) -> Self {
        Block::Text(TextBlock {
            id: BlockId(id),
            rect,
            text: text.into(),
            font_name: None,
            font_size: None,
        })
    }

    /// Convenience constructor for a text block with a font size.
    pub fn sized_text(id: u32, rect: Rect, text: impl Into<String>, font_size: f64) -> Self {
        Block::Text(TextBlock {
            id: BlockId(id),
            rect,
            text: text.into(),
            font_name: None,
            font_size: Some(font_size),
        })
    }

    /// Convenience constructor for an image block.
    pub fn image(id: u32, rect: Rect, image_ref: impl Into<String>) -> Self {
        Block::Image(ImageBlock {
            id: BlockId(id),
            rect,
            image_ref: image_ref.into(),
        })
    }

    /// Convenience constructor for a plain path with no commands.
    pub fn path(id: u32, rect: Rect, fill: Option<Color>, stroke: Option<Color>) -> Self {
        Block::Path(PathBlock {
            id: BlockId(id),
            rect,
            fill_color: fill,
            stroke_color: stroke,
            path_commands: None,
        })
    }
}

/// One page as delivered by the extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    /// Zero-based position of the page in the document
    pub page_index: usize,
    /// Page rectangle; `None` when extraction could not determine it
    #[serde(default)]
    pub page_rect: Option<Rect>,
    /// Blocks in extraction order, ids unique within the page
    pub blocks: Vec<Block>,
}

impl PageInput {
    /// Create a page input with a known page rectangle.
    pub fn new(page_index: usize, page_rect: Rect, blocks: Vec<Block>) -> Self {
        Self {
            page_index,
            page_rect: Some(page_rect),
            blocks,
        }
    }

    /// Iterate the text blocks of the page.
    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter_map(Block::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_accessors() {
        let b = Block::text(7, Rect::new(0.0, 0.0, 10.0, 5.0), "12");
        assert_eq!(b.id(), BlockId(7));
        assert_eq!(b.kind(), BlockKind::Text);
        assert_eq!(b.as_text().map(|t| t.text.as_str()), Some("12"));
        assert!(b.as_image().is_none());
    }

    #[test]
    fn test_effective_font_size_falls_back_to_height() {
        let b = Block::text(1, Rect::new(0.0, 0.0, 10.0, 8.0), "x");
        assert_eq!(b.as_text().map(|t| t.effective_font_size()), Some(8.0));
        let sized = Block::sized_text(2, Rect::new(0.0, 0.0, 10.0, 8.0), "x", 11.5);
        assert_eq!(sized.as_text().map(|t| t.effective_font_size()), Some(11.5));
    }

    #[test]
    fn test_block_json_is_tagged() {
        let b = Block::image(3, Rect::new(1.0, 2.0, 3.0, 4.0), "img-3");
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["kind"], "image");
        assert_eq!(json["id"], 3);
        assert_eq!(json["rect"]["x1"], 3.0);
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_path_segments_and_closure() {
        let triangle = PathBlock {
            id: BlockId(1),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            fill_color: Some(Color::black()),
            stroke_color: None,
            path_commands: Some(vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::LineTo { x: 10.0, y: 5.0 },
                PathCommand::LineTo { x: 0.0, y: 10.0 },
                PathCommand::LineTo { x: 0.0, y: 0.0 },
            ]),
        };
        assert_eq!(triangle.segment_count(), 3);
        assert!(triangle.is_closed());

        let open = PathBlock {
            path_commands: Some(vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::LineTo { x: 10.0, y: 0.0 },
            ]),
            ..triangle
        };
        assert!(!open.is_closed());
    }

    #[test]
    fn test_close_path_counts_the_closing_edge() {
        let triangle = PathBlock {
            id: BlockId(1),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            fill_color: Some(Color::black()),
            stroke_color: None,
            path_commands: Some(vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::LineTo { x: 10.0, y: 5.0 },
                PathCommand::LineTo { x: 0.0, y: 10.0 },
                PathCommand::ClosePath,
            ]),
        };
        assert_eq!(triangle.segment_count(), 3);
        assert!(triangle.is_closed());

        // Already back at the start: the close adds nothing.
        let explicit = PathBlock {
            path_commands: Some(vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::LineTo { x: 10.0, y: 5.0 },
                PathCommand::LineTo { x: 0.0, y: 10.0 },
                PathCommand::LineTo { x: 0.0, y: 0.0 },
                PathCommand::ClosePath,
            ]),
            ..triangle.clone()
        };
        assert_eq!(explicit.segment_count(), 3);

        let rect = PathBlock {
            path_commands: Some(vec![
                PathCommand::Rectangle { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
                PathCommand::ClosePath,
            ]),
            ..triangle
        };
        assert_eq!(rect.segment_count(), 4);
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Color::black().luminance(), 0.0);
        assert!((Color::white().luminance() - 1.0).abs() < 1e-9);
    }
}
