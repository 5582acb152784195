//! Configuration structures for the pricing pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the printdesk pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintdeskConfig {
    /// Per-page prices.
    pub pricing: PricingConfig,

    /// Page rasterization configuration.
    pub render: RenderConfig,

    /// Ink coverage thresholds.
    pub classifier: ClassifierConfig,

    /// Document conversion configuration.
    pub convert: ConvertConfig,

    /// Scoped temporary storage configuration.
    pub storage: StorageConfig,
}

/// Price per page, in shop currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Monochrome page below the ink threshold.
    pub low_output_page: Decimal,

    /// Monochrome page with substantive content.
    pub content_page: Decimal,

    /// Each occurrence of a page in the colored range.
    pub colored_page: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            low_output_page: Decimal::from(2),
            content_page: Decimal::from(5),
            colored_page: Decimal::from(10),
        }
    }
}

/// Which rasterizer to use for page rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterBackend {
    /// Poppler's `pdftoppm`.
    Pdftoppm,
    /// Embedded page images only (scanned documents).
    Embedded,
    /// `pdftoppm`, falling back to embedded images when it is missing.
    Auto,
}

/// Page rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// DPI for rendering PDF pages to images.
    pub dpi: u32,

    /// Rasterizer backend.
    pub backend: RasterBackend,

    /// `pdftoppm` executable name or path.
    pub pdftoppm_program: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 100,
            backend: RasterBackend::Auto,
            pdftoppm_program: "pdftoppm".to_string(),
        }
    }
}

/// Ink coverage classification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Pixels with luma below this value count as ink (0 - 255).
    pub dark_luma: u8,

    /// Minimum fraction of ink pixels for a content page (0.0 - 1.0).
    pub min_coverage: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            dark_luma: 128,
            min_coverage: 0.005,
        }
    }
}

/// Document conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Office converter programs, tried in order.
    pub programs: Vec<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            programs: vec!["soffice".to_string(), "libreoffice".to_string()],
        }
    }
}

/// Scoped temporary storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory under which request scopes are created (system temp dir
    /// when unset).
    pub temp_root: Option<PathBuf>,
}

impl PrintdeskConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check threshold and resolution values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.render.dpi == 0 {
            return Err(crate::PrintdeskError::Config(
                "render.dpi must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.min_coverage) {
            return Err(crate::PrintdeskError::Config(format!(
                "classifier.min_coverage must be within 0.0 - 1.0, got {}",
                self.classifier.min_coverage
            )));
        }
        let prices = [
            self.pricing.low_output_page,
            self.pricing.content_page,
            self.pricing.colored_page,
        ];
        if prices.iter().any(|p| p.is_sign_negative()) {
            return Err(crate::PrintdeskError::Config(
                "prices must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
