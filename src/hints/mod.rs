//! Document-wide font-size hints.
//!
//! Instruction booklets typeset each kind of number (part counts, step
//! numbers, page numbers, bag numbers) in a consistent size. Before any page
//! is classified, every text run of the document is sorted into a bucket by a
//! cheap positional heuristic and the most frequent size per bucket becomes
//! the "ideal" size rules compare against.
//!
//! The first two thirds of the document are treated as instruction pages and
//! the last third as catalog pages, since part counts in the trailing
//! inventory are set in their own size. A bucket with fewer than
//! [`HintsConfig::min_samples`] observations yields no hint.

use crate::blocks::PageInput;
use crate::rules::patterns::{parse_number, parse_part_count};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kinds of numbers whose size is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontBucket {
    /// `2x` style counts on instruction pages
    PartCount,
    /// `2x` style counts on catalog pages
    CatalogPartCount,
    /// Step numbers
    StepNumber,
    /// Page numbers
    PageNumber,
    /// Bag numbers (noticeably larger than step numbers)
    BagNumber,
}

/// Tuning for hint collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintsConfig {
    /// Minimum observations before a bucket yields a hint
    pub min_samples: usize,
    /// Histogram bin width in points
    pub bin_width: f64,
    /// Fraction of the page height treated as the page-number band
    pub bottom_band: f64,
    /// Fraction of the document after which pages count as catalog pages
    pub catalog_start: f64,
    /// Minimum size ratio over the step-number size for bag numbers
    pub bag_size_ratio: f64,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            min_samples: 3,
            bin_width: 0.5,
            bottom_band: 0.1,
            catalog_start: 2.0 / 3.0,
            bag_size_ratio: 1.5,
        }
    }
}

/// Inferred ideal font sizes, computed once per document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSizeHints {
    /// Ideal part-count size on instruction pages
    pub part_count_size: Option<f64>,
    /// Ideal part-count size on catalog pages
    pub catalog_part_count_size: Option<f64>,
    /// Ideal step-number size
    pub step_number_size: Option<f64>,
    /// Ideal page-number size
    pub page_number_size: Option<f64>,
    /// Ideal bag-number size
    pub bag_number_size: Option<f64>,
    /// Observations per bucket
    pub samples: BTreeMap<FontBucket, usize>,
}

#[derive(Default)]
struct Histogram {
    bins: BTreeMap<i64, usize>,
    total: usize,
}

impl Histogram {
    fn add(&mut self, size: f64, bin_width: f64) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        let bin = (size / bin_width).round() as i64;
        *self.bins.entry(bin).or_insert(0) += 1;
        self.total += 1;
    }

    /// Most frequent bin; ties resolve to the smaller size.
    fn mode(&self, bin_width: f64, min_samples: usize) -> Option<f64> {
        if self.total < min_samples {
            return None;
        }
        let mut best: Option<(i64, usize)> = None;
        for (&bin, &count) in &self.bins {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((bin, count));
            }
        }
        best.map(|(bin, _)| bin as f64 * bin_width)
    }
}

impl FontSizeHints {
    /// Collect hints from every page of a document.
    pub fn from_pages(pages: &[PageInput], config: &HintsConfig) -> Self {
        let mut histograms: BTreeMap<FontBucket, Histogram> = BTreeMap::new();
        let mut numbers_above_band: Vec<f64> = Vec::new();
        let page_count = pages.len().max(1);

        for (position, page) in pages.iter().enumerate() {
            let Some(page_rect) = page.page_rect else {
                continue;
            };
            let is_catalog = position as f64 >= page_count as f64 * config.catalog_start;
            let band_top = page_rect.y1 - page_rect.height() * config.bottom_band;

            for text in page.text_blocks() {
                let size = text.effective_font_size();
                if parse_part_count(&text.text).is_some() {
                    let bucket = if is_catalog {
                        FontBucket::CatalogPartCount
                    } else {
                        FontBucket::PartCount
                    };
                    histograms
                        .entry(bucket)
                        .or_default()
                        .add(size, config.bin_width);
                } else if parse_number(&text.text).is_some() {
                    if text.rect.y0 >= band_top {
                        histograms
                            .entry(FontBucket::PageNumber)
                            .or_default()
                            .add(size, config.bin_width);
                    } else if !is_catalog {
                        numbers_above_band.push(size);
                    }
                }
            }
        }

        // Step numbers are the dominant size among numbers above the page
        // number band; anything clearly larger is a bag number.
        let mut step_hist = Histogram::default();
        for &size in &numbers_above_band {
            step_hist.add(size, config.bin_width);
        }
        let step_size = step_hist.mode(config.bin_width, config.min_samples);
        if let Some(step) = step_size {
            let (steps, bags): (Vec<f64>, Vec<f64>) = numbers_above_band
                .iter()
                .partition(|&&s| s < step * config.bag_size_ratio);
            let step_entry = histograms.entry(FontBucket::StepNumber).or_default();
            for s in steps {
                step_entry.add(s, config.bin_width);
            }
            let bag_entry = histograms.entry(FontBucket::BagNumber).or_default();
            for s in bags {
                bag_entry.add(s, config.bin_width);
            }
        } else {
            let step_entry = histograms.entry(FontBucket::StepNumber).or_default();
            for &s in &numbers_above_band {
                step_entry.add(s, config.bin_width);
            }
        }

        let mode = |bucket: FontBucket| {
            histograms
                .get(&bucket)
                .and_then(|h| h.mode(config.bin_width, config.min_samples))
        };
        let hints = Self {
            part_count_size: mode(FontBucket::PartCount),
            catalog_part_count_size: mode(FontBucket::CatalogPartCount),
            step_number_size: mode(FontBucket::StepNumber),
            page_number_size: mode(FontBucket::PageNumber),
            bag_number_size: mode(FontBucket::BagNumber),
            samples: histograms
                .iter()
                .filter(|(_, h)| h.total > 0)
                .map(|(&b, h)| (b, h.total))
                .collect(),
        };
        log::debug!(
            "Font size hints: part_count={:?} catalog={:?} step={:?} page={:?} bag={:?}",
            hints.part_count_size,
            hints.catalog_part_count_size,
            hints.step_number_size,
            hints.page_number_size,
            hints.bag_number_size
        );
        hints
    }

    /// The ideal size for a bucket, if one was inferred.
    pub fn size_for(&self, bucket: FontBucket) -> Option<f64> {
        match bucket {
            FontBucket::PartCount => self.part_count_size,
            FontBucket::CatalogPartCount => self.catalog_part_count_size,
            FontBucket::StepNumber => self.step_number_size,
            FontBucket::PageNumber => self.page_number_size,
            FontBucket::BagNumber => self.bag_number_size,
        }
    }

    /// The smallest size a step number may have: anything at or below the
    /// inferred part-count size is more likely a count.
    pub fn min_step_number_size(&self) -> Option<f64> {
        match (self.part_count_size, self.catalog_part_count_size) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}
