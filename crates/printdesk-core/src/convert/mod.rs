//! Normalization of uploads to PDF.

mod office;

pub use office::OfficeConverter;

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::models::document::DocumentFormat;
use crate::scope::DocumentScope;

/// Trait for word-processor to PDF converters.
pub trait DocumentConverter: Send + Sync {
    /// Short converter name for logs.
    fn name(&self) -> &str;

    /// Convert the document at `source` and return the PDF bytes.
    ///
    /// `out_dir` is a scratch directory owned by the caller.
    fn convert_to_pdf(&self, source: &Path, out_dir: &Path) -> std::result::Result<Vec<u8>, ConvertError>;
}

impl<C: DocumentConverter + ?Sized> DocumentConverter for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn convert_to_pdf(&self, source: &Path, out_dir: &Path) -> std::result::Result<Vec<u8>, ConvertError> {
        (**self).convert_to_pdf(source, out_dir)
    }
}

/// Convert a document on disk to PDF bytes, rejecting empty output.
pub fn convert_file<C: DocumentConverter + ?Sized>(
    converter: &C,
    source: &Path,
    out_dir: &Path,
) -> std::result::Result<Vec<u8>, ConvertError> {
    let pdf = converter.convert_to_pdf(source, out_dir)?;
    if pdf.is_empty() {
        return Err(ConvertError::NoOutput(source.display().to_string()));
    }
    debug!("{} converted {} to {} PDF bytes", converter.name(), source.display(), pdf.len());
    Ok(pdf)
}

/// Normalize raw upload bytes to PDF.
///
/// PDF input is returned untouched; DOCX input is written into `scope` and
/// converted there.
pub fn normalize<'a, C: DocumentConverter + ?Sized>(
    converter: &C,
    bytes: &'a [u8],
    extension: &str,
    scope: &DocumentScope,
) -> Result<Cow<'a, [u8]>> {
    match DocumentFormat::from_extension(extension)? {
        DocumentFormat::Pdf => Ok(Cow::Borrowed(bytes)),
        DocumentFormat::Docx => {
            let source = scope.persist("source.docx", bytes)?;
            let pdf = convert_file(converter, &source, scope.path())?;
            Ok(Cow::Owned(pdf))
        }
    }
}
