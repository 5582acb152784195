//! PDF loading and page rasterization.

mod embedded;
mod pdftoppm;

pub use embedded::EmbeddedImageRasterizer;
pub use pdftoppm::PdftoppmRasterizer;

use std::path::Path;

use image::DynamicImage;
use lopdf::Document;
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::models::config::{RasterBackend, RenderConfig};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Trait for page rasterization backends.
///
/// Implementations turn one page of a PDF on disk into a bitmap. Pages are
/// 1-indexed and assumed to exist; callers clamp to [`page_count`] first.
pub trait PageRasterizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Render a page as an image at the specified DPI.
    fn render_page(&self, pdf_path: &Path, page: u32, dpi: u32) -> Result<DynamicImage>;
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render_page(&self, pdf_path: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        (**self).render_page(pdf_path, page, dpi)
    }
}

/// Tries each backend in order, moving on only when one is unavailable.
pub struct FallbackRasterizer {
    backends: Vec<Box<dyn PageRasterizer>>,
}

impl FallbackRasterizer {
    pub fn new(backends: Vec<Box<dyn PageRasterizer>>) -> Self {
        Self { backends }
    }
}

impl PageRasterizer for FallbackRasterizer {
    fn name(&self) -> &str {
        "fallback"
    }

    fn render_page(&self, pdf_path: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        let mut tried = Vec::new();

        for backend in &self.backends {
            match backend.render_page(pdf_path, page, dpi) {
                Err(RenderError::Unavailable(reason)) => {
                    warn!("Rasterizer {} unavailable: {}", backend.name(), reason);
                    tried.push(backend.name().to_string());
                }
                other => return other,
            }
        }

        Err(RenderError::Unavailable(format!(
            "no rasterizer available (tried: {})",
            tried.join(", ")
        )))
    }
}

/// Build the rasterizer selected in the configuration.
pub fn rasterizer_from_config(config: &RenderConfig) -> Box<dyn PageRasterizer> {
    match config.backend {
        RasterBackend::Pdftoppm => Box::new(PdftoppmRasterizer::new(&config.pdftoppm_program)),
        RasterBackend::Embedded => Box::new(EmbeddedImageRasterizer::new()),
        RasterBackend::Auto => {
            let backends: Vec<Box<dyn PageRasterizer>> = vec![
                Box::new(PdftoppmRasterizer::new(&config.pdftoppm_program)),
                Box::new(EmbeddedImageRasterizer::new()),
            ];
            Box::new(FallbackRasterizer::new(backends))
        }
    }
}

/// Load a PDF, decrypting it when it only uses the empty password.
pub fn load_document(pdf_path: &Path) -> Result<Document> {
    let mut doc = Document::load(pdf_path).map_err(|e| RenderError::Parse(e.to_string()))?;

    if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(RenderError::Encrypted);
        }
        debug!("Decrypted {} with empty password", pdf_path.display());
    }

    Ok(doc)
}

/// Number of pages in a PDF on disk.
pub fn page_count(pdf_path: &Path) -> Result<u32> {
    let doc = load_document(pdf_path)?;
    let count = doc.get_pages().len() as u32;
    debug!("{} has {} pages", pdf_path.display(), count);
    Ok(count)
}
