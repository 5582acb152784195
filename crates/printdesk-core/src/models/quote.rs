//! Price quotes for printout batches.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::config::PricingConfig;
use crate::error::{PrintdeskError, Result};
use super::document::DocumentFormat;

/// Page counts and cost for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    /// Original file name.
    pub filename: String,

    /// Format the document was uploaded in.
    pub format: DocumentFormat,

    /// Declared pages below the ink threshold.
    pub non_black_pages: usize,

    /// Declared pages with substantive content.
    pub black_pages: usize,

    /// Entries in the colored range, duplicates included.
    pub colored_pages: usize,

    /// Price of this document.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

impl CostLineItem {
    /// Price the given page counts.
    ///
    /// Fails with a configuration error when the prices are too large for
    /// the total to be represented.
    pub fn priced(
        filename: impl Into<String>,
        format: DocumentFormat,
        non_black_pages: usize,
        black_pages: usize,
        colored_pages: usize,
        pricing: &PricingConfig,
    ) -> Result<Self> {
        let cost = line_cost(pricing.low_output_page, non_black_pages)
            .zip(line_cost(pricing.content_page, black_pages))
            .and_then(|(low, content)| low.checked_add(content))
            .zip(line_cost(pricing.colored_page, colored_pages))
            .and_then(|(mono, colored)| mono.checked_add(colored))
            .ok_or_else(|| overflow("document cost"))?;

        Ok(Self {
            filename: filename.into(),
            format,
            non_black_pages,
            black_pages,
            colored_pages,
            cost,
        })
    }
}

fn line_cost(price: Decimal, pages: usize) -> Option<Decimal> {
    price.checked_mul(Decimal::from(pages))
}

fn overflow(what: &str) -> PrintdeskError {
    PrintdeskError::Config(format!("{} overflows; check the configured prices", what))
}

/// Cost of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostQuote {
    /// Batch total.
    #[serde(rename = "cost", with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Per-document breakdown, in submission order.
    pub items: Vec<CostLineItem>,
}

impl CostQuote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to the batch.
    pub fn push(&mut self, item: CostLineItem) -> Result<()> {
        self.total = self
            .total
            .checked_add(item.cost)
            .ok_or_else(|| overflow("batch total"))?;
        self.items.push(item);
        Ok(())
    }

    /// Total as a float, the way the order-creation flow receives it.
    pub fn cost(&self) -> f64 {
        self.total.to_f64().unwrap_or_default()
    }

    pub fn total_pages(&self) -> usize {
        self.items
            .iter()
            .map(|i| i.non_black_pages + i.black_pages + i.colored_pages)
            .sum()
    }
}
