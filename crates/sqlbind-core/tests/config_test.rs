//! Configuration loading and validation tests.

use std::io::Write;

use sqlbind_core::errors::error_code;
use sqlbind_core::{AnalysisConfig, SqlbindErrorCode};

#[test]
fn test_empty_document_uses_defaults() {
    let config = AnalysisConfig::from_toml_str("").unwrap();
    assert_eq!(config, AnalysisConfig::default());
    assert_eq!(config.effective_threads(), 0);
    assert!(config.effective_report_info());
    assert_eq!(config.effective_command_text_cache_capacity(), 4096);
    assert!(!config.effective_legacy_compat());
}

#[test]
fn test_analysis_table_parsed() {
    let config = AnalysisConfig::from_toml_str(
        r#"
        [analysis]
        threads = 4
        strict_mode = true
        report_info = false
        suppress = ["SQB0301"]
        default_batch_size = 50
        default_backend = "postgres"
        "#,
    )
    .unwrap();
    assert_eq!(config.effective_threads(), 4);
    assert_eq!(config.strict_mode, Some(true));
    assert!(!config.effective_report_info());
    assert!(config.is_suppressed("sqb0301"));
    assert!(!config.is_suppressed("SQB0302"));

    let global = config.global_options();
    assert_eq!(global.strict_sql, Some(true));
    assert_eq!(global.batch_size, Some(50));
    assert_eq!(global.backend.as_deref(), Some("postgres"));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = AnalysisConfig::from_toml_str("[analysis\nthreads = ").unwrap_err();
    assert_eq!(err.error_code(), error_code::CONFIG_PARSE);
}

#[test]
fn test_zero_cache_capacity_rejected() {
    let err = AnalysisConfig::from_toml_str("[analysis]\ncommand_text_cache_capacity = 0").unwrap_err();
    assert_eq!(err.error_code(), error_code::CONFIG_INVALID);
    assert!(err.to_string().contains("command_text_cache_capacity"));
}

#[test]
fn test_zero_batch_size_rejected() {
    let err = AnalysisConfig::from_toml_str("[analysis]\ndefault_batch_size = 0").unwrap_err();
    assert_eq!(err.error_code(), error_code::CONFIG_INVALID);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[analysis]\nstrict_types = true").unwrap();
    let config = AnalysisConfig::load(file.path()).unwrap();
    assert_eq!(config.strict_types, Some(true));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AnalysisConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.error_code(), error_code::CONFIG_IO);
}
