//! Printout cost calculation for batches of uploaded documents.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::classify::{Classification, InkClassifier};
use crate::convert::{DocumentConverter, OfficeConverter, normalize};
use crate::error::Result;
use crate::models::config::{PricingConfig, PrintdeskConfig};
use crate::models::document::{Document, DocumentFormat};
use crate::models::quote::{CostLineItem, CostQuote};
use crate::pdf::{PageRasterizer, rasterizer_from_config};
use crate::ranges::{PageRangeSet, parse_page_ranges};
use crate::scope::{DocumentScope, RequestScope};

/// File name of the normalized PDF inside a document scope.
const NORMALIZED_PDF: &str = "document.pdf";

/// A document whose format and page ranges have been checked.
#[derive(Debug)]
struct PreparedDocument<'a> {
    source: &'a Document,
    format: DocumentFormat,
    content_pages: PageRangeSet,
    colored_pages: PageRangeSet,
}

impl<'a> PreparedDocument<'a> {
    fn prepare(source: &'a Document) -> Result<Self> {
        Ok(Self {
            source,
            format: source.format()?,
            content_pages: parse_page_ranges(&source.content_pages)?,
            colored_pages: parse_page_ranges(&source.colored_pages)?,
        })
    }
}

/// Prices batches of documents.
///
/// Holds no per-request state: every call works in its own scoped temp
/// directory, which is gone by the time the call returns.
pub struct CostCalculator<C: DocumentConverter, R: PageRasterizer> {
    converter: C,
    classifier: InkClassifier<R>,
    pricing: PricingConfig,
    temp_root: Option<PathBuf>,
}

impl CostCalculator<OfficeConverter, Box<dyn PageRasterizer>> {
    /// Build a calculator with the production backends.
    pub fn from_config(config: &PrintdeskConfig) -> Result<Self> {
        config.validate()?;

        let converter = OfficeConverter::new(config.convert.programs.clone());
        let classifier = InkClassifier::new(rasterizer_from_config(&config.render))
            .with_dpi(config.render.dpi)
            .with_config(&config.classifier);

        Ok(Self {
            converter,
            classifier,
            pricing: config.pricing.clone(),
            temp_root: config.storage.temp_root.clone(),
        })
    }
}

impl<C: DocumentConverter, R: PageRasterizer> CostCalculator<C, R> {
    /// Create a calculator with default pricing and thresholds.
    pub fn new(converter: C, rasterizer: R) -> Self {
        Self::with_classifier(converter, InkClassifier::new(rasterizer))
    }

    /// Create a calculator around a configured classifier.
    pub fn with_classifier(converter: C, classifier: InkClassifier<R>) -> Self {
        Self {
            converter,
            classifier,
            pricing: PricingConfig::default(),
            temp_root: None,
        }
    }

    /// Set the price table.
    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Create request scopes under `root` instead of the system temp dir.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Price a batch of documents.
    ///
    /// Formats and page ranges of the whole batch are checked before any
    /// document is converted or rendered. The first failing document fails
    /// the batch; no partial total is returned.
    pub fn compute_cost(&self, documents: &[Document]) -> Result<CostQuote> {
        let start = Instant::now();

        let prepared = documents
            .iter()
            .map(PreparedDocument::prepare)
            .collect::<Result<Vec<_>>>()?;

        let scope = RequestScope::new(self.temp_root.as_deref())?;
        info!("Pricing {} documents in scope {}", prepared.len(), scope.token());

        let mut quote = CostQuote::new();
        for doc in &prepared {
            let priced = self.price_document(&scope, doc).and_then(|item| {
                debug!("{}: {}", item.filename, item.cost);
                quote.push(item)
            });
            if let Err(e) = priced {
                warn!("Pricing {} failed: {}", doc.source.filename, e);
                return Err(e);
            }
        }

        scope.close()?;
        info!(
            "Quoted {} for {} documents in {:?}",
            quote.total,
            quote.items.len(),
            start.elapsed()
        );

        Ok(quote)
    }

    /// Price documents given as parallel lists of files and page ranges.
    pub fn compute_cost_from_parts(
        &self,
        files: Vec<(String, Vec<u8>)>,
        content_pages: Vec<String>,
        colored_pages: Vec<String>,
    ) -> Result<CostQuote> {
        let documents = Document::zip_parts(files, content_pages, colored_pages)?;
        self.compute_cost(&documents)
    }

    /// Normalize and classify a single document without pricing it.
    pub fn classify_document(&self, document: &Document) -> Result<Classification> {
        let prepared = PreparedDocument::prepare(document)?;
        let scope = RequestScope::new(self.temp_root.as_deref())?;

        let doc_scope = scope.document()?;
        let pdf_path = self.materialize_pdf(&doc_scope, &prepared)?;
        let classification = self.classifier.classify(&pdf_path, &prepared.content_pages)?;
        doc_scope.close()?;

        scope.close()?;
        Ok(classification)
    }

    fn price_document(&self, scope: &RequestScope, doc: &PreparedDocument<'_>) -> Result<CostLineItem> {
        let doc_scope = scope.document()?;
        let pdf_path = self.materialize_pdf(&doc_scope, doc)?;

        let classification = self.classifier.classify(&pdf_path, &doc.content_pages)?;
        let item = CostLineItem::priced(
            &doc.source.filename,
            doc.format,
            classification.non_black.len(),
            classification.black_content.len(),
            doc.colored_pages.len(),
            &self.pricing,
        )?;

        doc_scope.close()?;
        Ok(item)
    }

    /// Normalize the upload to PDF inside the document scope and return the
    /// path of the PDF to classify.
    fn materialize_pdf(&self, doc_scope: &DocumentScope, doc: &PreparedDocument<'_>) -> Result<PathBuf> {
        let pdf = normalize(
            &self.converter,
            &doc.source.bytes,
            doc.format.extension(),
            doc_scope,
        )?;
        Ok(doc_scope.persist(NORMALIZED_PDF, &pdf)?)
    }
}
