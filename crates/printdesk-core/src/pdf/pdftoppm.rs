//! Page rendering through poppler's `pdftoppm`.

use std::io;
use std::path::Path;
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::{PageRasterizer, Result};
use crate::error::RenderError;

/// Renders pages by invoking `pdftoppm` in grayscale PNG mode.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: String,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn render_page(&self, pdf_path: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        // Output lands next to the PDF so it shares the caller's scope.
        let parent = pdf_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let out_dir = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(parent)
            .map_err(|e| RenderError::page(page, e.to_string()))?;
        let prefix = out_dir.path().join(format!("page-{}", page));

        trace!("Rendering page {} of {} at {} dpi", page, pdf_path.display(), dpi);

        let output = Command::new(&self.program)
            .arg("-gray")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RenderError::Unavailable(format!(
                    "{} not found; is poppler-utils installed?",
                    self.program
                )));
            }
            Err(e) => return Err(RenderError::page(page, e.to_string())),
        };

        if !output.status.success() {
            return Err(RenderError::page(
                page,
                format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        // -singlefile writes exactly `<prefix>.png`
        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            return Err(RenderError::page(
                page,
                format!("expected rendered image not found: {}", image_path.display()),
            ));
        }

        let image = image::open(&image_path).map_err(|source| RenderError::Decode { page, source })?;
        debug!("Rendered page {} as {}x{}", page, image.width(), image.height());

        Ok(image)
    }
}
