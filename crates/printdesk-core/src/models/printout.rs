//! Printout order drafts handed to the order-creation flow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PrintdeskError, Result};
use crate::ranges::parse_page_ranges;

/// Maximum stored length of a page range expression.
pub const MAX_RANGE_FIELD_LEN: usize = 20;

/// Largest cost the order store accepts (6 digits, 2 decimal places).
pub fn max_cost() -> Decimal {
    Decimal::new(999_999, 2)
}

/// An active printout order, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintoutDraft {
    /// Ordering user.
    pub user: String,

    /// Quoted cost.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,

    /// Free-form note for the shop staff.
    #[serde(default)]
    pub custom_message: String,

    /// Colored page range expression.
    #[serde(default)]
    pub colored_pages: String,

    /// Monochrome page range expression.
    #[serde(default)]
    pub black_and_white_pages: String,

    /// Single-sided printing, when the student chose explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_on_one_side: Option<bool>,

    /// Uploaded file name.
    pub file: String,

    /// When the draft was created.
    pub requested_at: DateTime<Utc>,
}

impl PrintoutDraft {
    pub fn new(user: impl Into<String>, file: impl Into<String>, cost: Decimal) -> Self {
        Self {
            user: user.into(),
            cost,
            custom_message: String::new(),
            colored_pages: String::new(),
            black_and_white_pages: String::new(),
            print_on_one_side: None,
            file: file.into(),
            requested_at: Utc::now(),
        }
    }

    pub fn with_pages(
        mut self,
        black_and_white_pages: impl Into<String>,
        colored_pages: impl Into<String>,
    ) -> Self {
        self.black_and_white_pages = black_and_white_pages.into();
        self.colored_pages = colored_pages.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.custom_message = message.into();
        self
    }

    pub fn with_one_side(mut self, one_side: Option<bool>) -> Self {
        self.print_on_one_side = one_side;
        self
    }

    /// Check the draft against the constraints of the order store.
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(PrintdeskError::Validation("user is required".to_string()));
        }
        if self.file.trim().is_empty() {
            return Err(PrintdeskError::Validation("file is required".to_string()));
        }

        for (field, value) in [
            ("colored_pages", &self.colored_pages),
            ("black_and_white_pages", &self.black_and_white_pages),
        ] {
            if value.len() > MAX_RANGE_FIELD_LEN {
                return Err(PrintdeskError::Validation(format!(
                    "{} must be at most {} characters, got {}",
                    field,
                    MAX_RANGE_FIELD_LEN,
                    value.len()
                )));
            }
            parse_page_ranges(value)?;
        }

        if self.cost.is_sign_negative() {
            return Err(PrintdeskError::Validation("cost must not be negative".to_string()));
        }
        if self.cost.scale() > 2 && self.cost != self.cost.round_dp(2) {
            return Err(PrintdeskError::Validation(format!(
                "cost {} has more than 2 decimal places",
                self.cost
            )));
        }
        if self.cost > max_cost() {
            return Err(PrintdeskError::Validation(format!(
                "cost {} exceeds {}",
                self.cost,
                max_cost()
            )));
        }

        Ok(())
    }
}
