//! Input validation for bill creation and editing.
//!
//! Rules are evaluated in a fixed priority order and the first failing rule is
//! reported: title, then total value, then installment count.

use thiserror::Error;

use crate::{currency::LocaleCurrency, schedule::round_to_cents};

/// Upper bound on schedule length accepted from user input.
pub const MAX_INSTALLMENTS: u32 = 1_000;

/// Smallest total that can be split into cent-denominated installments.
pub const MIN_TOTAL: f64 = 0.01;

/// A rejected bill form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a bill title is required")]
    MissingTitle,
    #[error("the total value must be at least one cent")]
    InvalidTotal,
    #[error("the installment count must be a positive whole number")]
    InvalidInstallmentCount,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Raw user input for creating or editing a bill, as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillDraft {
    pub title: String,
    pub description: String,
    /// Localized currency text, e.g. `"1.234,56"`.
    pub total_value: String,
    pub paid_value: Option<String>,
    pub has_installments: bool,
    pub installment_count: Option<String>,
}

impl BillDraft {
    pub fn new(title: impl Into<String>, total_value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            total_value: total_value.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_paid_value(mut self, paid_value: impl Into<String>) -> Self {
        self.paid_value = Some(paid_value.into());
        self
    }

    /// Switches the draft to installment mode with the given count text.
    pub fn with_installments(mut self, count: impl Into<String>) -> Self {
        self.has_installments = true;
        self.installment_count = Some(count.into());
        self
    }
}

/// A draft that passed validation, with amounts parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub title: String,
    pub description: String,
    pub total_value: f64,
    pub paid_value: Option<f64>,
    pub has_installments: bool,
    /// Always 1 for single-payment drafts.
    pub installment_count: u32,
}

/// Validates `draft` with the default locale, reporting the first failing rule.
pub fn validate_draft(draft: &BillDraft) -> ValidationResult<ValidatedDraft> {
    validate_draft_in(draft, &LocaleCurrency::default())
}

/// Validates `draft`, reading amounts with `locale`'s separators.
pub fn validate_draft_in(
    draft: &BillDraft,
    locale: &LocaleCurrency,
) -> ValidationResult<ValidatedDraft> {
    let title = validate_title(&draft.title)?;
    let total_value = validate_total_in(&draft.total_value, locale)?;
    let installment_count = if draft.has_installments {
        validate_installment_count(draft.installment_count.as_deref())?
    } else {
        1
    };
    let paid_value = draft
        .paid_value
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(|text| locale.parse_strict(text).unwrap_or(0.0));

    Ok(ValidatedDraft {
        title,
        description: draft.description.trim().to_string(),
        total_value,
        paid_value,
        has_installments: draft.has_installments,
        installment_count,
    })
}

pub fn validate_title(title: &str) -> ValidationResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    Ok(title.to_string())
}

pub fn validate_total(text: &str) -> ValidationResult<f64> {
    validate_total_in(text, &LocaleCurrency::default())
}

/// Parses a total and rounds it to cents. Totals below one cent are rejected.
pub fn validate_total_in(text: &str, locale: &LocaleCurrency) -> ValidationResult<f64> {
    match locale.parse_strict(text).map(round_to_cents) {
        Some(total) if total.is_finite() && total >= MIN_TOTAL => Ok(total),
        _ => Err(ValidationError::InvalidTotal),
    }
}

pub fn validate_installment_count(text: Option<&str>) -> ValidationResult<u32> {
    let text = text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(ValidationError::InvalidInstallmentCount)?;
    let count: i64 = text
        .parse()
        .map_err(|_| ValidationError::InvalidInstallmentCount)?;
    if count <= 0 || count > i64::from(MAX_INSTALLMENTS) {
        return Err(ValidationError::InvalidInstallmentCount);
    }
    Ok(count as u32)
}
