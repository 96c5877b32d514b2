//! Field-level checks run on user input before it reaches the store.
//!
//! Every rule is evaluated, so a single candidate can produce several
//! errors, including more than one for the same field.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{NewTransaction, Transaction};

static NO_OUTER_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S(?:.*\S)?$").unwrap());
static THREE_TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\S+\s+){2,}\S+$").unwrap());
static BASIC_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9\s.,!?]+$").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());
static AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|[1-9]\d*)(\.\d{1,2})?$").unwrap());
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").unwrap()
});
static CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+(?:[ -][A-Za-z]+)*$").unwrap());

pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const DESCRIPTION_SPACES: &str = "Description cannot start or end with spaces";
pub const DESCRIPTION_STRENGTH: &str =
    "Description should be at least 3 words with only basic punctuation";
pub const DESCRIPTION_DUPLICATE: &str = "Description cannot contain duplicate words";
pub const AMOUNT_REQUIRED: &str = "Amount is required";
pub const AMOUNT_FORMAT: &str = "Amount must be positive with max 2 decimal places";
pub const DATE_REQUIRED: &str = "Date is required";
pub const DATE_FORMAT: &str = "Date must be in YYYY-MM-DD format";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const CATEGORY_FORMAT: &str = "Category must contain only letters, spaces or hyphens";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Description,
    Amount,
    Date,
    Category,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Date => "date",
            Field::Category => "category",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of [`validate`]. Valid iff there are no errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages reported for one field, in rule order.
    pub fn messages_for(&self, field: Field) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    fn extend(&mut self, field: Field, messages: Vec<&'static str>) {
        self.errors.extend(messages.into_iter().map(|m| FieldError {
            field,
            message: m.to_string(),
        }));
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "invalid transaction: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationReport {}

/// Raw candidate as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl TransactionInput {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    /// Validates the input and converts it into a [`NewTransaction`].
    pub fn validated(&self) -> Result<NewTransaction, ValidationReport> {
        let report = validate(self);
        if !report.is_valid() {
            return Err(report);
        }
        let amount = self
            .amount
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| ValidationReport {
                errors: vec![FieldError {
                    field: Field::Amount,
                    message: AMOUNT_FORMAT.to_string(),
                }],
            })?;
        Ok(NewTransaction {
            description: self.description.clone(),
            amount,
            category: self.category.clone(),
            date: self.date.clone(),
        })
    }
}

/// Fields to change on an existing transaction; `None` keeps the stored
/// value. The merged result goes through the same rules as a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEdit {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl TransactionEdit {
    /// Fills unspecified fields from `current`.
    pub fn merged_onto(&self, current: &Transaction) -> TransactionInput {
        TransactionInput {
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            amount: self
                .amount
                .clone()
                .unwrap_or_else(|| current.amount.to_string()),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| current.category.clone()),
            date: self.date.clone().unwrap_or_else(|| current.date.clone()),
        }
    }
}

/// Runs every field rule against `input`.
pub fn validate(input: &TransactionInput) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.extend(Field::Description, validate_description(&input.description));
    report.extend(Field::Amount, validate_amount(&input.amount));
    report.extend(Field::Date, validate_date(&input.date));
    report.extend(Field::Category, validate_category(&input.category));
    report
}

pub fn validate_description(description: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();
    if description.trim().is_empty() {
        errors.push(DESCRIPTION_REQUIRED);
    } else if !NO_OUTER_SPACE.is_match(description) {
        errors.push(DESCRIPTION_SPACES);
    }
    if !(THREE_TOKENS.is_match(description) && BASIC_CHARS.is_match(description)) {
        errors.push(DESCRIPTION_STRENGTH);
    }
    if has_repeated_word(description) {
        errors.push(DESCRIPTION_DUPLICATE);
    }
    errors
}

pub fn validate_amount(amount: &str) -> Vec<&'static str> {
    if amount.is_empty() {
        return vec![AMOUNT_REQUIRED];
    }
    let representable = amount.parse::<f64>().is_ok_and(f64::is_finite);
    if AMOUNT.is_match(amount) && representable {
        Vec::new()
    } else {
        vec![AMOUNT_FORMAT]
    }
}

/// Pattern-level check only: `2024-02-30` passes.
pub fn validate_date(date: &str) -> Vec<&'static str> {
    if date.is_empty() {
        return vec![DATE_REQUIRED];
    }
    if DATE.is_match(date) {
        Vec::new()
    } else {
        vec![DATE_FORMAT]
    }
}

pub fn validate_category(category: &str) -> Vec<&'static str> {
    if category.trim().is_empty() {
        return vec![CATEGORY_REQUIRED];
    }
    if CATEGORY.is_match(category) {
        Vec::new()
    } else {
        vec![CATEGORY_FORMAT]
    }
}

/// True when a word is directly followed, across whitespace only, by the
/// same word ignoring case.
fn has_repeated_word(text: &str) -> bool {
    let mut prev: Option<regex::Match<'_>> = None;
    for word in WORD.find_iter(text) {
        if let Some(p) = prev {
            let gap = &text[p.end()..word.start()];
            if !gap.is_empty()
                && gap.chars().all(char::is_whitespace)
                && p.as_str().eq_ignore_ascii_case(word.as_str())
            {
                return true;
            }
        }
        prev = Some(word);
    }
    false
}
