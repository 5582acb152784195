//! Ink coverage classification of rendered pages.

mod coverage;

pub use coverage::ink_coverage;

use std::collections::BTreeSet;
use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RenderError, Result};
use crate::models::config::{ClassifierConfig, RenderConfig};
use crate::pdf::{self, PageRasterizer};
use crate::ranges::{PageRangeSet, parse_page_ranges};

/// Outcome of measuring one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageClass {
    /// Substantive text or graphics.
    Content,
    /// Mostly blank or faint output.
    LowOutput,
}

/// Measurement for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// Page number (1-indexed).
    pub page: u32,
    /// Fraction of dark pixels (0.0 - 1.0).
    pub coverage: f32,
    /// Resulting class.
    pub class: PageClass,
}

/// Classification of the requested pages of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Total pages in the document.
    pub page_count: u32,
    /// Pages with substantive content.
    pub black_content: BTreeSet<u32>,
    /// Pages below the ink threshold.
    pub non_black: BTreeSet<u32>,
    /// Per-page measurements, in page order.
    pub reports: Vec<PageReport>,
}

impl Classification {
    /// Number of requested pages that were actually measured.
    pub fn measured(&self) -> usize {
        self.reports.len()
    }

    fn record(&mut self, report: PageReport) {
        match report.class {
            PageClass::Content => self.black_content.insert(report.page),
            PageClass::LowOutput => self.non_black.insert(report.page),
        };
        self.reports.push(report);
    }
}

/// Classifies pages by rendering them and measuring dark pixel coverage.
pub struct InkClassifier<R: PageRasterizer> {
    rasterizer: R,
    dpi: u32,
    dark_luma: u8,
    min_coverage: f32,
}

impl<R: PageRasterizer> InkClassifier<R> {
    /// Create a classifier with default thresholds.
    pub fn new(rasterizer: R) -> Self {
        let render = RenderConfig::default();
        let thresholds = ClassifierConfig::default();
        Self {
            rasterizer,
            dpi: render.dpi,
            dark_luma: thresholds.dark_luma,
            min_coverage: thresholds.min_coverage,
        }
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the luma below which a pixel counts as ink.
    pub fn with_dark_luma(mut self, dark_luma: u8) -> Self {
        self.dark_luma = dark_luma;
        self
    }

    /// Set the coverage a page must exceed to count as content.
    pub fn with_min_coverage(mut self, min_coverage: f32) -> Self {
        self.min_coverage = min_coverage;
        self
    }

    /// Apply thresholds from configuration.
    pub fn with_config(self, config: &ClassifierConfig) -> Self {
        self.with_dark_luma(config.dark_luma)
            .with_min_coverage(config.min_coverage)
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Classify an already rendered page.
    pub fn classify_image(&self, page: u32, image: &DynamicImage) -> PageReport {
        let coverage = ink_coverage(image, self.dark_luma);
        let class = if coverage > self.min_coverage {
            PageClass::Content
        } else {
            PageClass::LowOutput
        };
        debug!("Page {}: coverage {:.4} -> {:?}", page, coverage, class);
        PageReport {
            page,
            coverage,
            class,
        }
    }

    /// Classify the given pages of a PDF on disk.
    ///
    /// Pages beyond the end of the document are ignored, and each page is
    /// measured once however often it is listed.
    pub fn classify(&self, pdf_path: &Path, pages: &PageRangeSet) -> Result<Classification> {
        let page_count = pdf::page_count(pdf_path)?;
        let requested = pages.within(page_count);

        if requested.len() < pages.distinct().len() {
            debug!(
                "Ignoring {} pages beyond the {}-page document",
                pages.distinct().len() - requested.len(),
                page_count
            );
        }

        let mut result = Classification {
            page_count,
            ..Classification::default()
        };

        for page in requested {
            let image = self
                .rasterizer
                .render_page(pdf_path, page, self.dpi)
                .map_err(|e| match e {
                    RenderError::Unavailable(_) | RenderError::Page { .. } | RenderError::Decode { .. } => e,
                    other => RenderError::page(page, other.to_string()),
                })?;
            result.record(self.classify_image(page, &image));
        }

        info!(
            "Classified {} pages via {}: {} content, {} low output",
            result.measured(),
            self.rasterizer.name(),
            result.black_content.len(),
            result.non_black.len()
        );

        Ok(result)
    }

    /// Parse a range expression and classify those pages.
    pub fn classify_expr(&self, pdf_path: &Path, page_ranges: &str) -> Result<Classification> {
        let pages = parse_page_ranges(page_ranges)?;
        self.classify(pdf_path, &pages)
    }
}
