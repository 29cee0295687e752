//! Near-duplicate block suppression.
//!
//! Printed instructions often draw the same thing twice: a drop shadow under
//! a number, an outline stroked on top of a fill. Before scoring, blocks of
//! the same kind whose rectangles nearly coincide are grouped and only the
//! largest one of each group stays live.

use super::union_find::UnionFind;
use super::ClassificationResult;
use crate::blocks::{Block, BlockId};
use crate::geometry::euclidean_distance;
use serde::{Deserialize, Serialize};

/// Thresholds for duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    /// Enable suppression
    pub enabled: bool,
    /// Blocks with an IOU above this are duplicates
    pub iou_threshold: f64,
    /// Maximum center distance for the center/area test
    pub center_tolerance: f64,
    /// Minimum smaller/larger area ratio for the center/area test
    pub min_area_ratio: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            iou_threshold: 0.8,
            center_tolerance: 1.0,
            min_area_ratio: 0.8,
        }
    }
}

impl DuplicateConfig {
    /// Disable or enable suppression.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the IOU threshold.
    pub fn with_iou_threshold(mut self, threshold: f64) -> Self {
        self.iou_threshold = threshold;
        self
    }
}

fn same_content(a: &Block, b: &Block) -> bool {
    match (a, b) {
        (Block::Text(x), Block::Text(y)) => x.text.trim() == y.text.trim(),
        (Block::Image(_), Block::Image(_)) | (Block::Path(_), Block::Path(_)) => true,
        _ => false,
    }
}

/// Whether two blocks are near-duplicates of each other.
pub fn is_duplicate(a: &Block, b: &Block, config: &DuplicateConfig) -> bool {
    if !same_content(a, b) {
        return false;
    }
    let (ra, rb) = (a.rect(), b.rect());
    if ra.iou(&rb) > config.iou_threshold {
        return true;
    }
    let (small, large) = if ra.area() <= rb.area() {
        (ra.area(), rb.area())
    } else {
        (rb.area(), ra.area())
    };
    let similar_area = large > 0.0 && small / large >= config.min_area_ratio;
    similar_area && euclidean_distance(&ra.center(), &rb.center()) <= config.center_tolerance
}

/// Group near-duplicate blocks and mark all but the largest of each group
/// removed. Returns the number of blocks suppressed.
///
/// Within a group the block with the largest area is kept; equal areas keep
/// the lower id.
pub fn suppress_duplicates(result: &mut ClassificationResult, config: &DuplicateConfig) -> usize {
    if !config.enabled {
        return 0;
    }
    let blocks = result.blocks();
    let mut uf = UnionFind::new(blocks.len());
    for i in 0..blocks.len() {
        for j in (i + 1)..blocks.len() {
            if is_duplicate(&blocks[i], &blocks[j], config) {
                uf.union(i, j);
            }
        }
    }

    let mut removals: Vec<(BlockId, BlockId)> = Vec::new();
    for group in uf.groups().into_iter().filter(|g| g.len() > 1) {
        let keep = group
            .iter()
            .map(|&i| &blocks[i])
            .max_by(|a, b| {
                a.rect()
                    .area()
                    .total_cmp(&b.rect().area())
                    .then(b.id().cmp(&a.id()))
            })
            .map(|b| b.id());
        let Some(keep) = keep else { continue };
        for &i in &group {
            let id = blocks[i].id();
            if id != keep {
                removals.push((id, keep));
            }
        }
    }

    for (removed, kept) in &removals {
        log::trace!(
            "page {}: block {} suppressed as duplicate of {}",
            result.page_index(),
            removed,
            kept
        );
        result.mark_removed(*removed, format!("duplicate of {}", kept));
    }
    removals.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn result(blocks: Vec<Block>) -> ClassificationResult {
        ClassificationResult::new(0, Rect::new(0.0, 0.0, 100.0, 200.0), blocks)
    }

    #[test]
    fn test_shadow_block_is_suppressed() {
        let mut r = result(vec![
            Block::text(1, Rect::new(10.2, 190.1, 14.1, 195.9), "7"),
            Block::text(2, Rect::new(10.0, 190.0, 14.0, 196.0), "7"),
        ]);
        assert_eq!(suppress_duplicates(&mut r, &DuplicateConfig::default()), 1);
        assert!(r.is_removed(BlockId(1)));
        assert!(!r.is_removed(BlockId(2)));
        assert_eq!(r.removal_reason(BlockId(1)), Some("duplicate of #2"));
    }

    #[test]
    fn test_different_kinds_or_text_are_kept() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        let mut r = result(vec![
            Block::text(1, rect, "1"),
            Block::text(2, rect, "2"),
            Block::image(3, rect, "img"),
        ]);
        assert_eq!(suppress_duplicates(&mut r, &DuplicateConfig::default()), 0);
    }

    #[test]
    fn test_groups_are_transitive_and_ties_keep_lower_id() {
        let mut r = result(vec![
            Block::image(5, Rect::new(0.0, 0.0, 10.0, 10.0), "a"),
            Block::image(3, Rect::new(0.5, 0.0, 10.5, 10.0), "b"),
            Block::image(9, Rect::new(1.0, 0.0, 11.0, 10.0), "c"),
        ]);
        assert_eq!(suppress_duplicates(&mut r, &DuplicateConfig::default()), 2);
        assert!(!r.is_removed(BlockId(3)));
        assert!(r.is_removed(BlockId(5)));
        assert!(r.is_removed(BlockId(9)));
    }

    #[test]
    fn test_disabled() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        let mut r = result(vec![Block::image(1, rect, "a"), Block::image(2, rect, "a")]);
        let config = DuplicateConfig::default().with_enabled(false);
        assert_eq!(suppress_duplicates(&mut r, &config), 0);
    }
}
