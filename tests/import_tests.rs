use chrono::Utc;
use spendbook::core::{NewTransaction, Store, Transaction};
use spendbook::import::{ImportError, csv, json};
use uuid::Uuid;

fn sample() -> Vec<Transaction> {
    let mut store = Store::default();
    for (description, amount, category, date) in [
        ("Morning coffee run", 4.5, "Food", "2024-03-15"),
        ("Bus fare, return trip", 2.0, "Transport", "2024-03-16"),
    ] {
        store.add(
            NewTransaction {
                description: description.into(),
                amount,
                category: category.into(),
                date: date.into(),
            },
            Utc::now(),
        );
    }
    store.list().to_vec()
}

#[test]
fn export_then_import_is_lossless() {
    let list = sample();
    let doc = json::export(&list, Utc::now()).unwrap();
    assert_eq!(json::parse_str(&doc).unwrap(), list);
}

#[test]
fn bare_array_from_older_exports_is_accepted() {
    let list = sample();
    let bare = serde_json::to_string_pretty(&list).unwrap();
    assert_eq!(json::parse_str(&bare).unwrap(), list);
}

#[test]
fn non_array_payload_is_a_format_error() {
    let err = json::parse_str(r#"{"version":"1.0"}"#).unwrap_err();
    assert!(matches!(err, ImportError::Format(_)));
    assert!(err.to_string().starts_with("invalid data format"));
}

#[test]
fn json_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("spendbook_{}.json", Uuid::new_v4()));
    let list = sample();
    json::write(&path, &list).unwrap();
    assert_eq!(json::parse(&path).unwrap(), list);
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join(format!("missing_{}.json", Uuid::new_v4()));
    assert!(matches!(json::parse(&path), Err(ImportError::Io(_))));
}

#[test]
fn csv_export_can_be_read_back_as_candidates() {
    let list = sample();
    let mut buf = Vec::new();
    csv::export(&mut buf, &list).unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.starts_with("id,description,amount,category,date,createdAt,updatedAt\n"));
    assert!(text.contains("\"Bus fare, return trip\""));

    let inputs = csv::parse(buf.as_slice()).unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].amount, "4.5");
    assert_eq!(inputs[1].description, "Bus fare, return trip");
    assert!(inputs.iter().all(|i| i.validated().is_ok()));
}
