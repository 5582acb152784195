//! Uploaded documents and their page annotations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{PrintdeskError, Result};

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Determine the format from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(PrintdeskError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Determine the format from a file name.
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One uploaded document with its declared page ranges.
#[derive(Debug, Clone)]
pub struct Document {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Original file name (the extension decides the format).
    pub filename: String,
    /// Range expression of monochrome pages to classify.
    pub content_pages: String,
    /// Range expression of pages printed in color.
    pub colored_pages: String,
}

impl Document {
    pub fn new(
        bytes: Vec<u8>,
        filename: impl Into<String>,
        content_pages: impl Into<String>,
        colored_pages: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_pages: content_pages.into(),
            colored_pages: colored_pages.into(),
        }
    }

    /// Build documents from parallel per-field lists.
    ///
    /// Lists of different lengths are rejected rather than truncated.
    pub fn zip_parts(
        files: Vec<(String, Vec<u8>)>,
        content_pages: Vec<String>,
        colored_pages: Vec<String>,
    ) -> Result<Vec<Self>> {
        if files.len() != content_pages.len() || files.len() != colored_pages.len() {
            return Err(PrintdeskError::Validation(format!(
                "expected one page range and one colored range per file, got {} files, {} page ranges, {} colored ranges",
                files.len(),
                content_pages.len(),
                colored_pages.len()
            )));
        }

        Ok(files
            .into_iter()
            .zip(content_pages)
            .zip(colored_pages)
            .map(|(((filename, bytes), content), colored)| {
                Self::new(bytes, filename, content, colored)
            })
            .collect())
    }

    pub fn format(&self) -> Result<DocumentFormat> {
        DocumentFormat::from_filename(&self.filename)
    }
}
