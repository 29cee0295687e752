//! The typed document tree produced by classification.
//!
//! Every node is an [`Element`] variant wrapping a label-specific struct.
//! Elements are only ever created from winning candidates and are immutable
//! afterwards.
//!
//! ## JSON form
//!
//! Elements serialize internally tagged: each object carries a `"type"` field
//! naming its variant, and rectangles serialize as `{x0, y0, x1, y1}`. Typed
//! children (the `Part`s inside a `PartsList`, the `Step`s of a `Page`, ...)
//! go through the same tagged form, so every node in the JSON tree carries
//! its discriminant and `Element -> JSON -> Element` is lossless.
//!
//! ```
//! use instruction_oxide::elements::{Element, PageNumber};
//! use instruction_oxide::geometry::Rect;
//!
//! let element = Element::from(PageNumber {
//!     rect: Rect::new(5.0, 190.0, 15.0, 198.0),
//!     value: 42,
//! });
//! let json = element.to_json().unwrap();
//! assert!(json.contains("\"type\":\"PageNumber\""));
//! assert_eq!(Element::from_json(&json).unwrap(), element);
//! ```

mod tagged;

use crate::classification::Label;
use crate::error::Result;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A page number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNumber {
    /// Bounding box
    pub rect: Rect,
    /// Printed value
    pub value: u32,
}

/// A step number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepNumber {
    /// Bounding box
    pub rect: Rect,
    /// Printed value
    pub value: u32,
}

/// A `2x` style part quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartCount {
    /// Bounding box
    pub rect: Rect,
    /// Quantity
    pub count: u32,
}

/// The picture of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartImage {
    /// Bounding box
    pub rect: Rect,
    /// Reference of the underlying image
    pub image_ref: String,
}

/// A part: a count paired with its picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Union of the count and the picture
    pub rect: Rect,
    /// Quantity label
    #[serde(with = "tagged::one")]
    pub count: PartCount,
    /// Picture
    #[serde(with = "tagged::one")]
    pub image: PartImage,
}

/// A boxed list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsList {
    /// The enclosing box
    pub rect: Rect,
    /// Parts inside the box, top-to-bottom then left-to-right
    #[serde(with = "tagged::many")]
    pub parts: Vec<Part>,
}

impl PartsList {
    /// Total number of pieces in the list.
    pub fn total_pieces(&self) -> u32 {
        self.parts.iter().map(|p| p.count.count).sum()
    }
}

/// A divider line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divider {
    /// Bounding box
    pub rect: Rect,
}

/// An assembly diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Bounding box
    pub rect: Rect,
}

/// An arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    /// Bounding box
    pub rect: Rect,
}

/// A rotation symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSymbol {
    /// Bounding box
    pub rect: Rect,
}

/// A progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBar {
    /// Bounding box
    pub rect: Rect,
    /// Filled fraction when an indicator was found inside the bar
    pub progress: Option<f64>,
}

/// A bag number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagNumber {
    /// Bounding box
    pub rect: Rect,
    /// Printed value
    pub value: u32,
}

/// An "open bag N" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBag {
    /// Bag artwork, or the number alone when no artwork was found
    pub rect: Rect,
    /// The bag number
    #[serde(with = "tagged::one")]
    pub number: BagNumber,
}

/// A build step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Union of all children
    pub rect: Rect,
    /// Step number
    #[serde(with = "tagged::one")]
    pub step_number: StepNumber,
    /// Parts needed for the step
    #[serde(default, with = "tagged::optional")]
    pub parts_list: Option<PartsList>,
    /// Assembly diagram
    #[serde(default, with = "tagged::optional")]
    pub diagram: Option<Diagram>,
    /// Arrows inside the diagram
    #[serde(default, with = "tagged::many")]
    pub arrows: Vec<Arrow>,
    /// Rotation symbols next to the diagram
    #[serde(default, with = "tagged::many")]
    pub rotation_symbols: Vec<RotationSymbol>,
}

/// What a page contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCategory {
    /// Has build steps
    Instruction,
    /// Has a parts inventory
    Catalog,
    /// Neither: covers, adverts, notices
    Info,
}

/// A classified page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page rectangle (grown to cover any child poking out of it)
    pub rect: Rect,
    /// Zero-based page index
    pub page_index: usize,
    /// Categories, sorted
    pub categories: Vec<PageCategory>,
    /// Page number
    #[serde(default, with = "tagged::optional")]
    pub page_number: Option<PageNumber>,
    /// Progress bar
    #[serde(default, with = "tagged::optional")]
    pub progress_bar: Option<ProgressBar>,
    /// Steps, ordered by step number
    #[serde(default, with = "tagged::many")]
    pub steps: Vec<Step>,
    /// Bag markers
    #[serde(default, with = "tagged::many")]
    pub new_bags: Vec<NewBag>,
    /// Parts not belonging to any step
    #[serde(default, with = "tagged::many")]
    pub catalog_parts: Vec<Part>,
    /// Divider lines
    #[serde(default, with = "tagged::many")]
    pub dividers: Vec<Divider>,
}

impl Page {
    /// Whether the page carries the category.
    pub fn is(&self, category: PageCategory) -> bool {
        self.categories.contains(&category)
    }
}

/// Any node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::large_enum_variant)]
pub enum Element {
    /// Page number
    PageNumber(PageNumber),
    /// Step number
    StepNumber(StepNumber),
    /// Part count
    PartCount(PartCount),
    /// Part picture
    PartImage(PartImage),
    /// Part
    Part(Part),
    /// Parts list
    PartsList(PartsList),
    /// Divider
    Divider(Divider),
    /// Diagram
    Diagram(Diagram),
    /// Arrow
    Arrow(Arrow),
    /// Rotation symbol
    RotationSymbol(RotationSymbol),
    /// Progress bar
    ProgressBar(ProgressBar),
    /// Bag number
    BagNumber(BagNumber),
    /// Bag marker
    NewBag(NewBag),
    /// Step
    Step(Step),
    /// Page
    Page(Page),
}

macro_rules! element_conversions {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Element {
                fn from(value: $variant) -> Self {
                    Element::$variant(value)
                }
            }

            impl tagged::ElementType for $variant {
                const TYPE: &'static str = stringify!($variant);
            }

            impl TryFrom<Element> for $variant {
                type Error = Element;

                fn try_from(element: Element) -> std::result::Result<Self, Element> {
                    match element {
                        Element::$variant(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }
        )*

        impl Element {
            /// The label this element was built for.
            pub fn label(&self) -> Label {
                match self {
                    $(Element::$variant(_) => Label::$variant,)*
                }
            }

            /// Bounding box.
            pub fn rect(&self) -> Rect {
                match self {
                    $(Element::$variant(e) => e.rect,)*
                }
            }
        }
    };
}

element_conversions!(
    PageNumber,
    StepNumber,
    PartCount,
    PartImage,
    Part,
    PartsList,
    Divider,
    Diagram,
    Arrow,
    RotationSymbol,
    ProgressBar,
    BagNumber,
    NewBag,
    Step,
    Page,
);

impl Element {
    /// Rectangles of the direct children.
    pub fn child_rects(&self) -> Vec<Rect> {
        match self {
            Element::Part(p) => vec![p.count.rect, p.image.rect],
            Element::PartsList(l) => l.parts.iter().map(|p| p.rect).collect(),
            Element::NewBag(b) => vec![b.number.rect],
            Element::Step(s) => {
                let mut rects = vec![s.step_number.rect];
                rects.extend(s.parts_list.iter().map(|l| l.rect));
                rects.extend(s.diagram.iter().map(|d| d.rect));
                rects.extend(s.arrows.iter().map(|a| a.rect));
                rects.extend(s.rotation_symbols.iter().map(|r| r.rect));
                rects
            }
            Element::Page(p) => {
                let mut rects = Vec::new();
                rects.extend(p.page_number.iter().map(|e| e.rect));
                rects.extend(p.progress_bar.iter().map(|e| e.rect));
                rects.extend(p.steps.iter().map(|e| e.rect));
                rects.extend(p.new_bags.iter().map(|e| e.rect));
                rects.extend(p.catalog_parts.iter().map(|e| e.rect));
                rects.extend(p.dividers.iter().map(|e| e.rect));
                rects
            }
            Element::PageNumber(_)
            | Element::StepNumber(_)
            | Element::PartCount(_)
            | Element::PartImage(_)
            | Element::Divider(_)
            | Element::Diagram(_)
            | Element::Arrow(_)
            | Element::RotationSymbol(_)
            | Element::ProgressBar(_)
            | Element::BagNumber(_) => Vec::new(),
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
