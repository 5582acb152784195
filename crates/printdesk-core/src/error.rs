//! Error types for the printdesk-core library.

use thiserror::Error;

/// Main error type for the printdesk library.
#[derive(Error, Debug)]
pub enum PrintdeskError {
    /// The document extension is neither `pdf` nor `docx`.
    #[error("unsupported file type '{0}', only pdf and docx are accepted")]
    UnsupportedFormat(String),

    /// Page range expression could not be parsed.
    #[error("malformed page range: {0}")]
    Range(#[from] RangeError),

    /// Document conversion to PDF failed.
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    /// Rendering or classifying a page failed.
    #[error("classification failed: {0}")]
    Render(#[from] RenderError),

    /// Request data was inconsistent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// I/O error on scoped storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors produced by the page range parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// A token was empty (e.g. `"1,,2"` or a trailing comma).
    #[error("empty token in '{0}'")]
    EmptyToken(String),

    /// A token was not a positive integer.
    #[error("invalid page number '{0}'")]
    InvalidNumber(String),

    /// Page numbers are 1-based.
    #[error("page numbers start at 1, got 0 in '{0}'")]
    ZeroPage(String),

    /// Range start is greater than its end.
    #[error("reversed range {start}-{end}")]
    Reversed { start: u32, end: u32 },

    /// Range expands to too many pages.
    #[error("range {start}-{end} spans more than {max} pages")]
    TooLarge { start: u32, end: u32, max: u32 },

    /// The whole expression expands to too many pages.
    #[error("expression expands to more than {max} pages")]
    TooManyPages { max: usize },
}

/// Errors produced while converting a document to PDF.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// None of the configured converter programs is installed.
    #[error("no converter available (tried: {0})")]
    Unavailable(String),

    /// The converter ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The converter produced no PDF output.
    #[error("converter produced no output for {0}")]
    NoOutput(String),

    /// I/O error while driving the converter.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while rasterizing a PDF page.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to open or parse the PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The rasterization backend is not installed.
    #[error("rasterizer unavailable: {0}")]
    Unavailable(String),

    /// Rendering a specific page failed.
    #[error("failed to render page {page}: {reason}")]
    Page { page: u32, reason: String },

    /// The rendered bitmap could not be decoded.
    #[error("failed to decode page {page}: {source}")]
    Decode {
        page: u32,
        #[source]
        source: image::ImageError,
    },
}

impl RenderError {
    pub fn page(page: u32, reason: impl Into<String>) -> Self {
        Self::Page {
            page,
            reason: reason.into(),
        }
    }
}

/// Coarse error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    ConversionFailed,
    MalformedRange,
    ClassificationFailed,
    IoFailure,
    Validation,
    Config,
}

impl PrintdeskError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::Range(_) => ErrorKind::MalformedRange,
            Self::Convert(_) => ErrorKind::ConversionFailed,
            Self::Render(_) => ErrorKind::ClassificationFailed,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Io(_) => ErrorKind::IoFailure,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the caller sent bad input (not worth retrying) as opposed to
    /// a backend failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnsupportedFormat | ErrorKind::MalformedRange | ErrorKind::Validation
        )
    }

    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

/// Result type for the printdesk library.
pub type Result<T> = std::result::Result<T, PrintdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_server_split() {
        let err = PrintdeskError::UnsupportedFormat("txt".into());
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 400);

        let err = PrintdeskError::from(RangeError::Reversed { start: 3, end: 1 });
        assert_eq!(err.kind(), ErrorKind::MalformedRange);
        assert_eq!(err.status_code(), 400);

        let err = PrintdeskError::from(ConvertError::NoOutput("a.docx".into()));
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert_eq!(err.status_code(), 500);

        let err = PrintdeskError::from(RenderError::page(2, "boom"));
        assert_eq!(err.kind(), ErrorKind::ClassificationFailed);
        assert!(!err.is_client_error());
    }
}
