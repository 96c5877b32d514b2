use chrono::{NaiveDate, Utc};
use tracing::{error, info, warn};

use super::stats::{self, BudgetStatus, DashboardStats, WeeklySummary};
use super::{
    CurrencyError, NewTransaction, Settings, SettingsError, Store, StoreError, Transaction,
    TransactionEdit, TransactionInput, TransactionPatch, ValidationReport,
};
use crate::import::{ImportError, json};
use crate::storage::{
    KeyValueStore, SETTINGS_KEY, StorageError, TRANSACTIONS_BACKUP_KEY, TRANSACTIONS_KEY,
};

/// Why an edit was refused. The stored record is unchanged in both cases.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    NotFound(String),
    Invalid(ValidationReport),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::NotFound(id) => write!(f, "transaction not found: {id}"),
            EditError::Invalid(report) => write!(f, "{report}"),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditError::Invalid(report) => Some(report),
            EditError::NotFound(_) => None,
        }
    }
}

/// Result of a mutation. The in-memory change always applies; `persisted`
/// is false when writing it to the backend failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    pub persisted: bool,
}

impl<T> Committed<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// A user session: the transaction list and settings, loaded from a
/// backend at startup and written back after every mutation.
pub struct Tracker<B: KeyValueStore> {
    backend: B,
    store: Store,
    settings: Settings,
}

impl<B: KeyValueStore> Tracker<B> {
    /// Loads state from `backend`, falling back to an empty list and the
    /// default settings when nothing usable is stored.
    pub fn load(mut backend: B) -> Self {
        let store = load_store(&mut backend);
        let settings = match load_settings(&backend) {
            Some(settings) => settings,
            None => {
                let settings = Settings::default();
                if let Err(e) = write_json(&mut backend, SETTINGS_KEY, &settings) {
                    error!(error = %e, "Error saving default settings");
                }
                settings
            }
        };
        info!(
            transactions = store.len(),
            currency = %settings.default_currency,
            "Loaded tracker state"
        );
        Self {
            backend,
            store,
            settings,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.store.get(id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn add(&mut self, candidate: NewTransaction) -> Committed<Transaction> {
        let record = self.store.add(candidate, Utc::now());
        info!(id = %record.id, amount = record.amount, "Added transaction");
        self.commit_transactions(record)
    }

    /// Validates `input` and adds it when valid.
    pub fn submit(
        &mut self,
        input: &TransactionInput,
    ) -> Result<Committed<Transaction>, ValidationReport> {
        let candidate = input.validated()?;
        Ok(self.add(candidate))
    }

    /// Merges `changes` onto the stored record, validates the result with
    /// the same rules as [`Tracker::submit`] and saves it when valid.
    pub fn edit(
        &mut self,
        id: &str,
        changes: &TransactionEdit,
    ) -> Result<Committed<Transaction>, EditError> {
        let current = self
            .store
            .get(id)
            .ok_or_else(|| EditError::NotFound(id.to_string()))?;
        let candidate = changes
            .merged_onto(current)
            .validated()
            .map_err(EditError::Invalid)?;
        let record = self
            .store
            .edit(id, TransactionPatch::from(candidate), Utc::now())
            .map_err(|_| EditError::NotFound(id.to_string()))?;
        info!(id, "Edited transaction");
        Ok(self.commit_transactions(record))
    }

    /// Removes a transaction. The caller must have confirmed with the user.
    pub fn delete(&mut self, id: &str) -> Committed<bool> {
        if !self.store.delete(id) {
            warn!(id, "Delete requested for unknown transaction");
            return Committed {
                value: false,
                persisted: true,
            };
        }
        info!(id, "Deleted transaction");
        self.commit_transactions(true)
    }

    pub fn replace_all(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<Committed<usize>, StoreError> {
        let count = transactions.len();
        self.store.replace_all(transactions)?;
        info!(count, "Replaced all transactions");
        Ok(self.commit_transactions(count))
    }

    /// Replaces the list with the contents of a JSON export.
    pub fn import_json(&mut self, input: &str) -> Result<Committed<usize>, ImportError> {
        let transactions = json::parse_str(input)?;
        Ok(self.replace_all(transactions)?)
    }

    pub fn export_json(&self) -> Result<String, ImportError> {
        json::export(self.store.list(), Utc::now())
    }

    /// Validates and stores new settings. Invalid settings are rejected and
    /// leave the current ones in place.
    pub fn update_settings(&mut self, settings: Settings) -> Result<Committed<()>, SettingsError> {
        settings.validate()?;
        self.settings = settings;
        info!(currency = %self.settings.default_currency, "Updated settings");
        let persisted = match write_json(&mut self.backend, SETTINGS_KEY, &self.settings) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Error saving settings");
                false
            }
        };
        Ok(Committed {
            value: (),
            persisted,
        })
    }

    pub fn stats(&self) -> Result<DashboardStats, CurrencyError> {
        stats::compute(self.store.list(), &self.settings)
    }

    pub fn budget_status(&self) -> Result<BudgetStatus, CurrencyError> {
        let stats = self.stats()?;
        stats::budget_status(&stats, &self.settings)
    }

    pub fn weekly(&self, today: NaiveDate) -> WeeklySummary {
        stats::weekly(self.store.list(), today)
    }

    fn commit_transactions<T>(&mut self, value: T) -> Committed<T> {
        let persisted = match write_json(&mut self.backend, TRANSACTIONS_KEY, self.store.list()) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Error saving transactions");
                false
            }
        };
        Committed { value, persisted }
    }
}

fn write_json<B, T>(backend: &mut B, key: &str, value: &T) -> Result<(), StorageError>
where
    B: KeyValueStore,
    T: serde::Serialize + ?Sized,
{
    let data =
        serde_json::to_string(value).map_err(|e| StorageError::Unavailable(e.to_string()))?;
    backend.set(key, &data)
}

/// An unreadable stored list is copied to [`TRANSACTIONS_BACKUP_KEY`]
/// before the session starts empty, so the next save cannot destroy it.
fn load_store<B: KeyValueStore>(backend: &mut B) -> Store {
    let stored = match backend.get(TRANSACTIONS_KEY) {
        Ok(Some(data)) => data,
        Ok(None) => return Store::default(),
        Err(e) => {
            error!(error = %e, "Error loading transactions");
            return Store::default();
        }
    };
    let parsed = serde_json::from_str::<Vec<Transaction>>(&stored)
        .map_err(|e| e.to_string())
        .and_then(|list| Store::from_transactions(list).map_err(|e| e.to_string()));
    match parsed {
        Ok(store) => store,
        Err(e) => {
            error!(
                error = %e,
                backup = TRANSACTIONS_BACKUP_KEY,
                "Stored transactions are unreadable, starting empty"
            );
            if let Err(e) = backend.set(TRANSACTIONS_BACKUP_KEY, &stored) {
                error!(error = %e, "Error backing up unreadable transactions");
            }
            Store::default()
        }
    }
}

fn load_settings<B: KeyValueStore>(backend: &B) -> Option<Settings> {
    match backend.get(SETTINGS_KEY) {
        Ok(Some(data)) => match serde_json::from_str::<Settings>(&data) {
            Ok(settings) => match settings.validate() {
                Ok(()) => Some(settings),
                Err(e) => {
                    warn!(error = %e, "Stored settings are invalid, using defaults");
                    Some(Settings::default())
                }
            },
            Err(e) => {
                error!(error = %e, "Stored settings are unreadable, using defaults");
                Some(Settings::default())
            }
        },
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "Error loading settings");
            Some(Settings::default())
        }
    }
}
