// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::type_complexity)]
#![warn(missing_docs)]

//! # Instruction Oxide
//!
//! Classification engine that turns the raw geometry of an instruction
//! manual page (text runs, raster images, vector paths) into a typed
//! document tree: page → steps → parts lists → parts, plus page numbers,
//! progress bars, bag markers, diagrams, arrows and rotation symbols.
//!
//! ## How it works
//!
//! - **Rules and scales** score individual blocks ([`rules`]).
//! - **Font-size hints** learned once per document tell numbers apart
//!   ([`hints`]).
//! - **Classifiers** propose scored candidates, one label each, in
//!   dependency order ([`classification`], [`classifiers`]).
//! - **Conflict resolution** keeps one label per block, and a small
//!   **constraint solver** enforces structural exclusivity ([`solver`]).
//! - **Bipartite pairing** matches step numbers with diagrams and part
//!   counts with part images ([`pairing`]).
//! - **Assembly** builds the page tree lazily, claiming each block at most
//!   once ([`elements`]).
//!
//! ## Quick Start
//!
//! ```
//! use instruction_oxide::{Block, ClassificationEngine, ClassifierConfig, PageInput, Rect};
//!
//! # fn main() -> instruction_oxide::Result<()> {
//! let engine = ClassificationEngine::new(ClassifierConfig::default())?;
//! let page = PageInput::new(
//!     0,
//!     Rect::new(0.0, 0.0, 100.0, 200.0),
//!     vec![Block::text(1, Rect::new(85.0, 190.0, 95.0, 198.0), "1")],
//! );
//!
//! let outcome = engine.classify_page(&page);
//! let tree = outcome.page().expect("page is valid");
//! assert_eq!(tree.page_number.as_ref().map(|n| n.value), Some(1));
//! println!("{}", instruction_oxide::Element::from(tree.clone()).to_json_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Documents
//!
//! [`ClassificationEngine::classify_document`] computes hints over every page
//! and classifies each page independently. With the `parallel` feature the
//! pages are processed on a `rayon` thread pool.

// Geometry and input model
pub mod blocks;
pub mod geometry;

// Scoring
pub mod hints;
pub mod rules;

// Classification framework
pub mod classification;
pub mod pairing;
pub mod solver;

// Output tree
pub mod elements;

// Built-in classifiers and the driver
pub mod classifiers;
pub mod engine;

// Configuration and errors
pub mod config;
pub mod error;

// Re-exports
pub use blocks::{Block, BlockId, BlockKind, PageInput};
pub use classification::{
    Candidate, CandidateId, ClassificationResult, Classifier, Label, Schedule,
};
pub use config::ClassifierConfig;
pub use elements::{Element, Page, PageCategory};
pub use engine::{ClassificationEngine, DocumentReport, PageOutcome};
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use hints::FontSizeHints;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "instruction_oxide";
