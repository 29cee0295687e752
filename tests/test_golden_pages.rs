//! Golden-file comparison of classified page trees.
//!
//! The expected trees live in `tests/golden/`. Set `UPDATE_GOLDEN=1` to
//! regenerate them after an intended behavior change.

mod common;

use std::fs;
use std::path::PathBuf;

use common::*;
use instruction_oxide::{ClassificationEngine, ClassifierConfig, Element, PageInput};

fn golden_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("golden")
        .join(format!("{}.json", name))
}

fn check_golden(name: &str, page: &PageInput) {
    let engine = ClassificationEngine::new(ClassifierConfig::default()).unwrap();
    let hints = engine.hints_for(&sample_document());
    let outcome = engine.classify_page_with_hints(page, &hints);
    let tree = Element::from(outcome.page().unwrap().clone());
    let actual = tree.to_json_pretty().unwrap();

    let path = golden_path(name);
    let update = std::env::var("UPDATE_GOLDEN").is_ok_and(|v| v == "1");
    if update {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, &actual).unwrap();
        eprintln!("Wrote golden file {}", path.display());
        return;
    }

    let expected = fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "missing golden file {} ({}); run with UPDATE_GOLDEN=1 to create it",
            path.display(),
            e
        )
    });
    let expected = Element::from_json(&expected).unwrap();
    assert_eq!(tree, expected, "classified tree differs from {}", path.display());
}

#[test]
fn test_golden_instruction_page() {
    check_golden("instruction_page", &instruction_page(4));
}

#[test]
fn test_golden_bag_page() {
    check_golden("bag_page", &bag_page(5));
}

#[test]
fn test_golden_catalog_page() {
    check_golden("catalog_page", &catalog_page(6));
}
