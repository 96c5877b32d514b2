use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ImportError;
use crate::core::Transaction;

pub const EXPORT_VERSION: &str = "1.0";

/// Wrapper written by [`export`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: String,
    pub transactions: Vec<Transaction>,
}

/// Serializes `transactions` into a pretty-printed export document.
pub fn export(transactions: &[Transaction], exported_at: DateTime<Utc>) -> Result<String, ImportError> {
    let doc = ExportDocument {
        version: EXPORT_VERSION.to_string(),
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        transactions: transactions.to_vec(),
    };
    serde_json::to_string_pretty(&doc).map_err(|e| ImportError::Parse(e.to_string()))
}

/// Parses either a bare array of transactions or an [`ExportDocument`].
pub fn parse_str(input: &str) -> Result<Vec<Transaction>, ImportError> {
    let data: Value = serde_json::from_str(input).map_err(|e| ImportError::Parse(e.to_string()))?;
    let list = match data {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("transactions") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ImportError::Format(
                    "\"transactions\" must be an array".into(),
                ));
            }
            None => {
                return Err(ImportError::Format(
                    "expected an array or an object with a \"transactions\" array".into(),
                ));
            }
        },
        _ => {
            return Err(ImportError::Format(
                "expected an array of transactions".into(),
            ));
        }
    };

    let mut records = Vec::with_capacity(list.len());
    let mut seen = HashSet::new();
    for (idx, item) in list.into_iter().enumerate() {
        let rec: Transaction = serde_json::from_value(item)
            .map_err(|e| ImportError::Parse(format!("transaction {idx}: {e}")))?;
        if !seen.insert(rec.id.clone()) {
            return Err(ImportError::DuplicateId(rec.id));
        }
        records.push(rec);
    }
    Ok(records)
}

pub fn parse(path: &Path) -> Result<Vec<Transaction>, ImportError> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

pub fn write(path: &Path, transactions: &[Transaction]) -> Result<(), ImportError> {
    let data = export(transactions, Utc::now())?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"[
        {"id":"txn_1","description":"Morning coffee run","amount":4.5,"category":"Food",
         "date":"2024-03-15","createdAt":"2024-03-15T08:00:00Z","updatedAt":"2024-03-15T08:00:00Z"}
    ]"#;

    #[test]
    fn accepts_bare_array() {
        let records = parse_str(BARE).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "txn_1");
        assert_eq!(records[0].amount, 4.5);
    }

    #[test]
    fn accepts_export_document() {
        let records = parse_str(BARE).unwrap();
        let doc = export(&records, Utc::now()).unwrap();
        assert!(doc.contains("\"version\": \"1.0\""));
        assert!(doc.contains("\"exportedAt\""));
        assert_eq!(parse_str(&doc).unwrap(), records);
    }

    #[test]
    fn rejects_wrong_shapes() {
        for input in [r#"{"a":1}"#, r#"{"transactions":{}}"#, "42", r#""text""#] {
            assert!(matches!(parse_str(input), Err(ImportError::Format(_))), "{input}");
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_str("[{"), Err(ImportError::Parse(_))));
        assert!(matches!(
            parse_str(r#"[{"id":"txn_1"}]"#),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let input = format!("[{0},{0}]", BARE.trim().trim_start_matches('[').trim_end_matches(']'));
        assert!(matches!(
            parse_str(&input),
            Err(ImportError::DuplicateId(id)) if id == "txn_1"
        ));
    }
}
