//! Core library for print shop printout pricing.
//!
//! This crate provides:
//! - Document normalization (DOCX to PDF through an office converter)
//! - Page range expressions (`"1-5,7,9-12"`)
//! - Page rasterization and ink coverage classification
//! - Batch cost calculation with request-scoped temporary storage
//! - Printout order drafts for the order-creation flow

pub mod classify;
pub mod convert;
pub mod cost;
pub mod error;
pub mod models;
pub mod pdf;
pub mod ranges;
pub mod scope;

pub use classify::{Classification, InkClassifier, PageClass, PageReport};
pub use convert::{DocumentConverter, OfficeConverter};
pub use cost::CostCalculator;
pub use error::{ErrorKind, PrintdeskError, Result};
pub use models::config::PrintdeskConfig;
pub use models::document::{Document, DocumentFormat};
pub use models::printout::PrintoutDraft;
pub use models::quote::{CostLineItem, CostQuote};
pub use pdf::{EmbeddedImageRasterizer, FallbackRasterizer, PageRasterizer, PdftoppmRasterizer};
pub use ranges::{PageRangeSet, parse_page_ranges};
pub use scope::RequestScope;
