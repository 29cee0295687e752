//! Synthetic pages shared by the integration tests.
#![allow(dead_code)]

use instruction_oxide::blocks::{Color, PathBlock, PathCommand};
use instruction_oxide::{Block, BlockId, PageInput, Rect};

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

pub fn gray(level: f64) -> Color {
    Color::new(level, level, level)
}

/// A filled triangle pointing up; the third edge comes from the close.
pub fn triangle(id: u32, r: Rect) -> Block {
    Block::Path(PathBlock {
        id: BlockId(id),
        rect: r,
        fill_color: Some(Color::black()),
        stroke_color: None,
        path_commands: Some(vec![
            PathCommand::MoveTo { x: r.x0, y: r.y1 },
            PathCommand::LineTo { x: r.center().x, y: r.y0 },
            PathCommand::LineTo { x: r.x1, y: r.y1 },
            PathCommand::ClosePath,
        ]),
    })
}

/// A thin vertical rule at `x`.
pub fn vertical_divider(id: u32, x: f64) -> Block {
    Block::path(id, rect(x - 0.5, 10.0, x + 0.5, 290.0), None, Some(Color::black()))
}

/// Instruction page: one step with a two-part list, a diagram with an
/// arrow, a rotation symbol, a progress bar and page number 5.
pub fn instruction_page(page_index: usize) -> PageInput {
    PageInput::new(
        page_index,
        rect(0.0, 0.0, 400.0, 300.0),
        vec![
            Block::path(10, rect(20.0, 20.0, 140.0, 80.0), Some(gray(0.9)), None),
            Block::image(11, rect(30.0, 30.0, 60.0, 55.0), "brick-2x4"),
            Block::sized_text(12, rect(32.0, 57.0, 46.0, 65.0), "2x", 8.0),
            Block::image(13, rect(80.0, 30.0, 110.0, 55.0), "plate-1x6"),
            Block::sized_text(14, rect(82.0, 57.0, 96.0, 65.0), "1x", 8.0),
            Block::sized_text(15, rect(22.0, 84.0, 34.0, 100.0), "1", 16.0),
            Block::image(16, rect(160.0, 40.0, 380.0, 240.0), "assembly"),
            triangle(17, rect(250.0, 120.0, 262.0, 132.0)),
            Block::image(18, rect(385.0, 40.0, 395.0, 50.0), "rotate"),
            Block::path(19, rect(20.0, 285.0, 380.0, 291.0), Some(gray(0.8)), None),
            Block::path(20, rect(20.0, 285.0, 80.0, 291.0), Some(Color::black()), None),
            Block::sized_text(21, rect(382.0, 288.0, 392.0, 297.0), "5", 8.0),
        ],
    )
}

/// Bag page: bag 2 artwork, step 3 right of a divider, page number 6.
pub fn bag_page(page_index: usize) -> PageInput {
    PageInput::new(
        page_index,
        rect(0.0, 0.0, 400.0, 300.0),
        vec![
            Block::image(1, rect(20.0, 20.0, 120.0, 120.0), "bag"),
            Block::sized_text(2, rect(50.0, 45.0, 80.0, 95.0), "2", 40.0),
            Block::sized_text(3, rect(150.0, 20.0, 162.0, 36.0), "3", 16.0),
            Block::image(4, rect(160.0, 40.0, 380.0, 240.0), "assembly"),
            vertical_divider(5, 140.0),
            Block::sized_text(6, rect(8.0, 288.0, 18.0, 297.0), "6", 8.0),
        ],
    )
}

/// Catalog page: three loose parts and page number 7.
pub fn catalog_page(page_index: usize) -> PageInput {
    let mut blocks = Vec::new();
    for (i, (x, count)) in [(40.0, "4x"), (120.0, "12x"), (200.0, "1x")].iter().enumerate() {
        let id = (i as u32) * 2 + 1;
        blocks.push(Block::image(id, rect(*x, 40.0, x + 40.0, 80.0), format!("part-{}", i)));
        blocks.push(Block::sized_text(id + 1, rect(x + 2.0, 82.0, x + 18.0, 90.0), *count, 8.0));
    }
    blocks.push(Block::sized_text(7, rect(382.0, 288.0, 392.0, 297.0), "7", 8.0));
    PageInput::new(page_index, rect(0.0, 0.0, 400.0, 300.0), blocks)
}

/// Two steps side by side, each with a two-part list and a diagram. A
/// rotation symbol sits in the gap between the diagrams, closer to the left
/// one.
pub fn two_step_page(page_index: usize) -> PageInput {
    let mut blocks = Vec::new();
    for (i, dx) in [0.0, 195.0].iter().enumerate() {
        let base = 10 + (i as u32) * 10;
        let value = (i + 1).to_string();
        blocks.push(Block::path(base, rect(10.0 + dx, 20.0, 100.0 + dx, 70.0), Some(gray(0.9)), None));
        blocks.push(Block::image(base + 1, rect(15.0 + dx, 25.0, 40.0 + dx, 50.0), format!("brick-{}a", i)));
        blocks.push(Block::sized_text(base + 2, rect(17.0 + dx, 52.0, 29.0 + dx, 60.0), "2x", 8.0));
        blocks.push(Block::image(base + 3, rect(55.0 + dx, 25.0, 80.0 + dx, 50.0), format!("brick-{}b", i)));
        blocks.push(Block::sized_text(base + 4, rect(57.0 + dx, 52.0, 69.0 + dx, 60.0), "1x", 8.0));
        blocks.push(Block::sized_text(base + 5, rect(12.0 + dx, 74.0, 24.0 + dx, 90.0), value, 16.0));
        blocks.push(Block::image(base + 6, rect(30.0 + dx, 100.0, 185.0 + dx, 260.0), "assembly"));
    }
    blocks.push(Block::image(30, rect(188.0, 150.0, 198.0, 160.0), "rotate"));
    blocks.push(Block::sized_text(31, rect(382.0, 288.0, 392.0, 297.0), "9", 8.0));
    PageInput::new(page_index, rect(0.0, 0.0, 400.0, 300.0), blocks)
}

/// The three sample pages as one document.
pub fn sample_document() -> Vec<PageInput> {
    vec![instruction_page(4), bag_page(5), catalog_page(6)]
}
