//! Core logic for the transaction store and everything derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod currency;
pub mod debounce;
pub mod query;
pub mod settings;
pub mod stats;
pub mod tracker;
pub mod validation;

pub use currency::{BASE_CURRENCY, CurrencyError, convert};
pub use debounce::Debouncer;
pub use query::{Highlighter, Preset, SearchHit, SortKey, compile, search, search_with, sort_by};
pub use settings::{Settings, SettingsError};
pub use stats::{BudgetStatus, DailyTotal, DashboardStats, WeeklySummary, budget_status, weekly};
pub use tracker::{Committed, EditError, Tracker};
pub use validation::{
    Field, FieldError, TransactionEdit, TransactionInput, ValidationReport, validate,
};

/// Errors that can occur when mutating a [`Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No transaction has the given id.
    NotFound(String),
    /// A replacement list contains the same id twice.
    DuplicateId(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "transaction not found: {id}"),
            StoreError::DuplicateId(id) => write!(f, "duplicate transaction id: {id}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A validated candidate ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    /// Amount in the base currency.
    pub amount: f64,
    pub category: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// Fields to overwrite on an existing transaction. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

impl From<NewTransaction> for TransactionPatch {
    fn from(t: NewTransaction) -> Self {
        Self {
            description: Some(t.description),
            amount: Some(t.amount),
            category: Some(t.category),
            date: Some(t.date),
        }
    }
}

/// Represents a transaction held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier, never changed after creation.
    pub id: String,
    pub description: String,
    /// Monetary amount in the base currency.
    pub amount: f64,
    pub category: String,
    /// Date the money was spent, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    fn apply(&mut self, patch: TransactionPatch, now: DateTime<Utc>) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        self.updated_at = now;
    }
}

const ID_PREFIX: &str = "txn_";

/// In-memory ordered list of transactions.
///
/// The store knows nothing about persistence; see [`Tracker`] for the
/// session object that writes every mutation back to a backend.
#[derive(Debug, Default, Clone)]
pub struct Store {
    transactions: Vec<Transaction>,
    last_issued: i64,
}

impl Store {
    /// Create a store holding `transactions` in the given order.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self, StoreError> {
        let mut store = Store::default();
        store.replace_all(transactions)?;
        Ok(store)
    }

    /// Transactions in insertion order.
    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Appends a new transaction and returns the stored record.
    pub fn add(&mut self, candidate: NewTransaction, now: DateTime<Utc>) -> Transaction {
        let id = self.next_id(now);
        let record = Transaction {
            id,
            description: candidate.description,
            amount: candidate.amount,
            category: candidate.category,
            date: candidate.date,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %record.id, "Appending transaction");
        self.transactions.push(record.clone());
        record
    }

    /// Merges `patch` into the transaction with the given id.
    pub fn edit(
        &mut self,
        id: &str,
        patch: TransactionPatch,
        now: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        let record = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(patch, now);
        Ok(record.clone())
    }

    /// Removes the transaction with the given id, returning whether one was removed.
    ///
    /// Asking the user for confirmation is the caller's job.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }

    /// Replaces the whole list, e.g. after an import.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::new();
        for t in &transactions {
            if !seen.insert(t.id.as_str()) {
                return Err(StoreError::DuplicateId(t.id.clone()));
            }
        }
        self.transactions = transactions;
        Ok(())
    }

    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let mut n = now.timestamp_millis().max(self.last_issued + 1);
        let mut id = format!("{ID_PREFIX}{n}");
        while self.get(&id).is_some() {
            n += 1;
            id = format!("{ID_PREFIX}{n}");
        }
        self.last_issued = n;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coffee() -> NewTransaction {
        NewTransaction {
            description: "Morning coffee run".into(),
            amount: 4.5,
            category: "Food".into(),
            date: "2024-03-15".into(),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn add_assigns_id_and_timestamps() {
        let mut store = Store::default();
        let rec = store.add(coffee(), at(0));
        assert_eq!(rec.id, format!("txn_{}", at(0).timestamp_millis()));
        assert_eq!(rec.description, "Morning coffee run");
        assert_eq!(rec.amount, 4.5);
        assert_eq!(rec.created_at, at(0));
        assert_eq!(rec.updated_at, at(0));
        assert_eq!(store.list(), &[rec]);
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let mut store = Store::default();
        let a = store.add(coffee(), at(0));
        let b = store.add(coffee(), at(0));
        let c = store.add(coffee(), at(0));
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn ids_skip_over_imported_ones() {
        let taken = format!("txn_{}", at(0).timestamp_millis());
        let mut store = Store::default();
        let mut existing = store.add(coffee(), at(-10));
        existing.id = taken.clone();
        store.replace_all(vec![existing]).unwrap();
        let fresh = store.add(coffee(), at(0));
        assert_ne!(fresh.id, taken);
    }

    #[test]
    fn edit_is_a_shallow_merge() {
        let mut store = Store::default();
        let rec = store.add(coffee(), at(0));
        let patch = TransactionPatch {
            amount: Some(6.0),
            ..Default::default()
        };
        let edited = store.edit(&rec.id, patch, at(60)).unwrap();
        assert_eq!(edited.amount, 6.0);
        assert_eq!(edited.description, rec.description);
        assert_eq!(edited.created_at, at(0));
        assert_eq!(edited.updated_at, at(60));
        assert_eq!(store.get(&rec.id), Some(&edited));
    }

    #[test]
    fn edit_unknown_id_fails() {
        let mut store = Store::default();
        let err = store
            .edit("txn_missing", TransactionPatch::default(), at(0))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("txn_missing".into()));
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let mut store = Store::default();
        let rec = store.add(coffee(), at(0));
        assert!(!store.delete("txn_missing"));
        assert_eq!(store.len(), 1);
        assert!(store.delete(&rec.id));
        assert!(store.is_empty());
    }

    #[test]
    fn replace_all_rejects_duplicate_ids() {
        let mut store = Store::default();
        let rec = store.add(coffee(), at(0));
        let err = store.replace_all(vec![rec.clone(), rec.clone()]).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(rec.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn transaction_json_uses_camel_case() {
        let mut store = Store::default();
        let rec = store.add(coffee(), at(0));
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert_eq!(serde_json::from_str::<Transaction>(&json).unwrap(), rec);
    }

    #[test]
    fn missing_timestamps_default_on_parse() {
        let json = r#"{"id":"txn_1","description":"Bus fare home","amount":2,"category":"Transport","date":"2024-01-02"}"#;
        let rec: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(rec.amount, 2.0);
        assert!(rec.created_at <= Utc::now());
    }
}
