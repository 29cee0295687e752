//! Loading classifier configuration from JSON files.

mod common;

use std::io::Write;

use common::*;
use instruction_oxide::{ClassificationEngine, ClassifierConfig, Error};
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write config");
    file
}

#[test]
fn test_partial_override_keeps_defaults() {
    let file = write_config(r#"{ "min_candidate_score": 0.6, "arrow": { "max_size": 20.0 } }"#);
    let config = ClassifierConfig::from_json_file(file.path()).unwrap();

    let defaults = ClassifierConfig::default();
    assert_eq!(config.min_candidate_score, 0.6);
    assert_eq!(config.arrow.max_size, 20.0);
    assert_eq!(config.arrow.min_size, defaults.arrow.min_size);
    assert_eq!(config.pairing, defaults.pairing);
    assert_eq!(config.step, defaults.step);
}

#[test]
fn test_out_of_range_value_rejected() {
    let file = write_config(r#"{ "min_candidate_score": 1.5 }"#);
    let err = ClassifierConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
    assert!(err.to_string().contains("min_candidate_score"));
}

#[test]
fn test_malformed_json_rejected() {
    let file = write_config("{ not json");
    let err = ClassifierConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClassifierConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_saved_defaults_load_back() {
    let json = serde_json::to_string_pretty(&ClassifierConfig::default()).unwrap();
    let file = write_config(&json);
    assert_eq!(ClassifierConfig::from_json_file(file.path()).unwrap(), ClassifierConfig::default());
}

#[test]
fn test_loaded_config_drives_engine() {
    // A stricter score floor than any page number candidate can reach.
    let file = write_config(r#"{ "min_candidate_score": 1.0, "page_number": { "expected_value_bonus": 0.0 } }"#);
    let config = ClassifierConfig::from_json_file(file.path()).unwrap();
    let engine = ClassificationEngine::new(config).unwrap();

    let outcome = engine.classify_page(&catalog_page(6));
    let tree = outcome.page().unwrap();
    assert!(tree.page_number.is_none());
}
