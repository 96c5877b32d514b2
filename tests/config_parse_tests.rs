use std::path::PathBuf;
use std::time::Duration;

use spendbook::config::{Config, ConfigError};
use uuid::Uuid;

#[test]
fn parses_all_sections() {
    let toml = r#"
[storage]
data_dir = "/tmp/ledger"
[search]
debounce_ms = 400
[logging]
filter = "spendbook=debug"
"#;
    let cfg = Config::from_toml(toml).unwrap();
    assert_eq!(cfg.storage.data_dir, PathBuf::from("/tmp/ledger"));
    assert_eq!(cfg.search.debounce(), Duration::from_millis(400));
    assert_eq!(cfg.logging.filter, "spendbook=debug");
}

#[test]
fn empty_file_uses_defaults() {
    let cfg = Config::from_toml("").unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.search.debounce_ms, 300);
    assert_eq!(cfg.logging.filter, "warn");
}

#[test]
fn debounce_out_of_range_fails() {
    for ms in [100, 1000] {
        let toml = format!("[search]\ndebounce_ms = {ms}\n");
        assert!(matches!(Config::from_toml(&toml), Err(ConfigError::Invalid(_))));
    }
}

#[test]
fn malformed_toml_fails() {
    assert!(matches!(
        Config::from_toml("[storage\n"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn missing_file_depends_on_required() {
    let path = std::env::temp_dir().join(format!("config_{}.toml", Uuid::new_v4()));
    assert_eq!(Config::load(&path, false).unwrap(), Config::default());
    assert!(matches!(
        Config::load(&path, true),
        Err(ConfigError::Missing(_))
    ));
}
