//! Structural guarantees every classified page must satisfy.

mod common;

use std::collections::BTreeMap;

use common::*;
use instruction_oxide::{
    ClassificationEngine, ClassificationResult, ClassifierConfig, Element, Page, PageInput,
};

fn classify(page: &PageInput) -> (Page, ClassificationResult) {
    let engine = ClassificationEngine::new(ClassifierConfig::default()).unwrap();
    let hints = engine.hints_for(&sample_document());
    let outcome = engine.classify_page_with_hints(page, &hints);
    (outcome.page().unwrap().clone(), outcome.result().unwrap().clone())
}

fn all_pages() -> Vec<PageInput> {
    let mut pages = sample_document();
    pages.push(two_step_page(8));
    pages
}

fn assert_contains_children(element: &Element) {
    let rect = element.rect();
    for child in element.child_rects() {
        assert!(
            rect.contains(&child),
            "{} at {:?} does not contain child {:?}",
            element.label(),
            rect,
            child
        );
    }
}

#[test]
fn test_built_candidates_own_their_blocks() {
    for page in all_pages() {
        let (_, result) = classify(&page);
        let mut owners = BTreeMap::new();
        for candidate in result.all_candidates().iter().filter(|c| c.is_built()) {
            for &block in &candidate.source_blocks {
                assert_eq!(result.consumer_of(block), Some(candidate.id));
                if let Some(previous) = owners.insert(block, candidate.id) {
                    panic!("block {} built into {} and {}", block, previous, candidate.id);
                }
            }
        }
    }
}

#[test]
fn test_unbuilt_candidates_explain_themselves() {
    for page in all_pages() {
        let (_, result) = classify(&page);
        for candidate in result.all_candidates() {
            assert!(
                candidate.is_built() || candidate.failure_reason.is_some(),
                "{} {} neither built nor failed",
                candidate.label,
                candidate.id
            );
        }
    }
}

#[test]
fn test_elements_contain_their_children() {
    for page in all_pages() {
        let (tree, _) = classify(&page);
        assert_contains_children(&Element::from(tree.clone()));
        for step in &tree.steps {
            assert_contains_children(&Element::from(step.clone()));
            if let Some(list) = &step.parts_list {
                assert_contains_children(&Element::from(list.clone()));
                for part in &list.parts {
                    assert_contains_children(&Element::from(part.clone()));
                }
            }
        }
        for bag in &tree.new_bags {
            assert_contains_children(&Element::from(bag.clone()));
        }
    }
}

#[test]
fn test_steps_do_not_overlap() {
    for page in all_pages() {
        let (tree, _) = classify(&page);
        for (i, a) in tree.steps.iter().enumerate() {
            for b in &tree.steps[i + 1..] {
                assert!(
                    a.rect.iou(&b.rect) <= 0.05,
                    "steps {} and {} overlap",
                    a.step_number.value,
                    b.step_number.value
                );
            }
        }
    }
}

#[test]
fn test_parts_lists_are_disjoint() {
    for page in all_pages() {
        let (tree, _) = classify(&page);
        let lists: Vec<_> = tree.steps.iter().filter_map(|s| s.parts_list.as_ref()).collect();
        for (i, a) in lists.iter().enumerate() {
            for b in &lists[i + 1..] {
                assert_eq!(a.rect.iou(&b.rect), 0.0);
            }
            for (j, p) in a.parts.iter().enumerate() {
                for q in &a.parts[j + 1..] {
                    assert_eq!(p.rect.iou(&q.rect), 0.0);
                }
            }
        }
    }
}

#[test]
fn test_page_furniture_clears_content() {
    for page in all_pages() {
        let (tree, _) = classify(&page);
        let content: Vec<_> = tree
            .steps
            .iter()
            .map(|s| s.rect)
            .chain(tree.catalog_parts.iter().map(|p| p.rect))
            .collect();
        for furniture in tree
            .page_number
            .iter()
            .map(|n| n.rect)
            .chain(tree.progress_bar.iter().map(|b| b.rect))
        {
            assert!(content.iter().all(|c| !c.intersects(&furniture)));
        }
    }
}

#[test]
fn test_classification_is_deterministic() {
    for page in all_pages() {
        let (first, first_result) = classify(&page);
        let (second, second_result) = classify(&page);
        assert_eq!(
            Element::from(first).to_json().unwrap(),
            Element::from(second).to_json().unwrap()
        );
        assert_eq!(
            serde_json::to_string(&first_result.diagnostics()).unwrap(),
            serde_json::to_string(&second_result.diagnostics()).unwrap()
        );
    }
}

#[test]
fn test_tree_survives_json() {
    for page in all_pages() {
        let (tree, _) = classify(&page);
        let element = Element::from(tree);
        let json = element.to_json_pretty().unwrap();
        assert_eq!(Element::from_json(&json).unwrap(), element);
    }
}

#[test]
fn test_competing_steps_keep_their_own_pieces() {
    let (tree, _) = classify(&two_step_page(8));
    let values: Vec<u32> = tree.steps.iter().map(|s| s.step_number.value).collect();
    assert_eq!(values, vec![1, 2]);
    for step in &tree.steps {
        let list = step.parts_list.as_ref().expect("each step has a parts list");
        assert_eq!(list.parts.len(), 2);
        assert!(step.diagram.is_some());
    }
    let (first, second) = (&tree.steps[0], &tree.steps[1]);
    assert_ne!(first.parts_list, second.parts_list);
    assert_eq!(first.rotation_symbols.len(), 1);
    assert!(second.rotation_symbols.is_empty());
    assert!(first.rect.contains(&first.rotation_symbols[0].rect));
    assert!(!first.rect.intersects(&second.rect));
}
