use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

use crate::model::{Category, Field, InvoiceDraft};

pub const CURRENCY_MAX_LEN: usize = 6;

/// Input rule broken by a single field value.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("{0} is required")]
    Required(Field),
    #[error("please enter a URL, e.g. https://pay.example/invoice")]
    InvalidUrl,
    #[error("please enter a number")]
    NotANumber,
    #[error("value must be 0 or more")]
    BelowMinimum,
    #[error("value must use at most two decimal places")]
    StepMismatch,
    #[error("please enter a date as YYYY-MM-DD")]
    InvalidDate,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
    #[error("invoice type must be crypto or general")]
    UnknownCategory,
}

/// Fields the form insists on for a given invoice type.
pub fn required_fields(category: Category) -> Vec<Field> {
    let mut fields = vec![
        Field::Client,
        Field::From,
        Field::Description,
        Field::Amount,
        Field::Currency,
        Field::Deadline,
    ];
    match category {
        Category::Crypto => fields.extend([Field::CryptoAddress, Field::BlockchainNetwork]),
        Category::General => fields.push(Field::PaymentLink),
    }
    fields
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:(//[^\s/?#]+\S*|[^\s/]\S*)$").expect("valid url pattern")
    })
}

/// Checks one value the way the creation form's inputs do.
///
/// Fields that are inactive under `category` are never required, but a value
/// typed into them still has to be well-formed.
pub fn check_constraint(field: Field, value: &str, category: Category) -> Result<(), ConstraintViolation> {
    if value.is_empty() {
        return if required_fields(category).contains(&field) {
            Err(ConstraintViolation::Required(field))
        } else {
            Ok(())
        };
    }

    match field {
        Field::PaymentLink if !url_re().is_match(value.trim()) => Err(ConstraintViolation::InvalidUrl),
        Field::Amount => check_amount(value),
        Field::Deadline => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| ConstraintViolation::InvalidDate),
        Field::Currency if value.chars().count() > CURRENCY_MAX_LEN => {
            Err(ConstraintViolation::TooLong { field, max: CURRENCY_MAX_LEN })
        }
        Field::Category if !matches!(value, "crypto" | "general") => Err(ConstraintViolation::UnknownCategory),
        _ => Ok(()),
    }
}

// min="0" step="0.01"
fn check_amount(value: &str) -> Result<(), ConstraintViolation> {
    let trimmed = value.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ConstraintViolation::NotANumber)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ConstraintViolation::BelowMinimum);
    }
    if !(amount * Decimal::ONE_HUNDRED).fract().is_zero() {
        return Err(ConstraintViolation::StepMismatch);
    }
    Ok(())
}

/// Owns the draft while it is being edited.
#[derive(Debug, Default, Clone)]
pub struct FormController {
    draft: InvoiceDraft,
    submitted: bool,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Any edit after "Generate Invoice" drops the success notice.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        if self.submitted {
            debug!(field = field.wire_name(), "edit after submit, clearing submitted flag");
            self.submitted = false;
        }
    }

    /// Switches the payment block. Values typed into the other block are kept.
    pub fn category_change(&mut self, category: Category) {
        self.edit(Field::Category, category.as_str());
    }

    pub fn submit(&mut self) {
        self.submitted = true;
    }

    /// Every active field that currently fails its input rule.
    pub fn violations(&self) -> Vec<(Field, ConstraintViolation)> {
        let category = self.draft.category;
        Field::ALL
            .into_iter()
            .filter_map(|f| {
                check_constraint(f, self.draft.get(f), category)
                    .err()
                    .map(|e| (f, e))
            })
            .collect()
    }

    pub fn missing_required(&self) -> Vec<Field> {
        required_fields(self.draft.category)
            .into_iter()
            .filter(|f| self.draft.get(*f).is_empty())
            .collect()
    }

    /// Submits only when every input rule holds.
    pub fn try_submit(&mut self) -> Result<(), Vec<(Field, ConstraintViolation)>> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(violations);
        }
        self.submit();
        Ok(())
    }
}
