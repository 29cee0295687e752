//! Benchmarks for page classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use instruction_oxide::blocks::Color;
use instruction_oxide::{Block, ClassificationEngine, ClassifierConfig, PageInput, Rect};

/// A page with `steps` instruction steps laid out in two columns, each with
/// a small parts list, a number and a diagram.
fn synthetic_page(page_index: usize, steps: usize) -> PageInput {
    let rows = steps.div_ceil(2).max(1);
    let row_height = 560.0 / rows as f64;
    let mut blocks = Vec::new();
    let mut id = 0u32;
    let mut next = || {
        id += 1;
        id
    };

    for step in 0..steps {
        let x = if step % 2 == 0 { 20.0 } else { 310.0 };
        let y = 20.0 + (step / 2) as f64 * row_height;
        let list = Rect::new(x, y, x + 90.0, y + 40.0);
        blocks.push(Block::path(next(), list, Some(Color::new(0.9, 0.9, 0.9)), None));
        blocks.push(Block::image(next(), Rect::new(x + 5.0, y + 5.0, x + 25.0, y + 25.0), "part"));
        blocks.push(Block::sized_text(next(), Rect::new(x + 6.0, y + 27.0, x + 16.0, y + 35.0), "2x", 8.0));
        blocks.push(Block::sized_text(
            next(),
            Rect::new(x, y + 44.0, x + 12.0, y + 60.0),
            (step + 1).to_string(),
            16.0,
        ));
        blocks.push(Block::image(
            next(),
            Rect::new(x + 100.0, y + 10.0, x + 270.0, y + row_height - 15.0),
            "diagram",
        ));
    }
    blocks.push(Block::sized_text(
        next(),
        Rect::new(575.0, 785.0, 585.0, 795.0),
        (page_index + 1).to_string(),
        8.0,
    ));
    PageInput::new(page_index, Rect::new(0.0, 0.0, 600.0, 800.0), blocks)
}

fn benchmark_single_page(c: &mut Criterion) {
    let engine = ClassificationEngine::new(ClassifierConfig::default()).unwrap();

    let mut group = c.benchmark_group("classify_page_by_steps");
    for steps in [1, 2, 4, 8].iter() {
        let page = synthetic_page(0, *steps);
        group.throughput(Throughput::Elements(page.blocks.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &page, |b, page| {
            b.iter(|| engine.classify_page(black_box(page)))
        });
    }
    group.finish();
}

fn benchmark_document(c: &mut Criterion) {
    let engine = ClassificationEngine::new(ClassifierConfig::default()).unwrap();
    let pages: Vec<PageInput> = (0..20).map(|i| synthetic_page(i, 1 + i % 4)).collect();

    c.bench_function("hints_20_pages", |b| b.iter(|| engine.hints_for(black_box(&pages))));
    c.bench_function("classify_document_20_pages", |b| {
        b.iter(|| engine.classify_document(black_box(&pages)))
    });
}

criterion_group!(benches, benchmark_single_page, benchmark_document);
criterion_main!(benches);
