//! Integration tests for resolving the ignore file against the working directory.

mod common;

use std::env;
use std::path::PathBuf;

use edgecommit::commit::FileFilter;
use edgecommit::config::{Config, IGNORE_FILE_NAME};
use edgecommit::error::FilterError;
use serial_test::serial;

/// Runs `f` with the process working directory set to `dir`.
fn in_dir<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let previous: PathBuf = env::current_dir().expect("Failed to read current dir");
    env::set_current_dir(dir).expect("Failed to change dir");
    let result = f();
    env::set_current_dir(previous).expect("Failed to restore dir");
    result
}

#[test]
#[serial]
fn test_default_config_reads_ignore_file_from_working_dir() {
    let dir = common::temp_test_dir();
    std::fs::copy(common::ignore_fixture(), dir.path().join(IGNORE_FILE_NAME)).unwrap();

    let filter = in_dir(dir.path(), || FileFilter::load(&Config::default())).unwrap();

    assert!(filter.should_skip("Cargo.lock"));
    assert!(filter.should_skip("docs/diagram.png"));
    assert!(!filter.should_skip("src/main.rs"));
}

#[test]
#[serial]
fn test_default_config_without_ignore_file_is_error() {
    let dir = common::temp_test_dir();

    let result = in_dir(dir.path(), || FileFilter::load(&Config::default()));

    match result {
        Err(FilterError::IgnoreFileMissing(path)) => {
            assert_eq!(path, PathBuf::from(IGNORE_FILE_NAME));
        }
        other => panic!("expected IgnoreFileMissing, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[serial]
fn test_extra_patterns_extend_the_ignore_file() {
    let dir = common::temp_test_dir();
    std::fs::write(dir.path().join(IGNORE_FILE_NAME), "*.lock\n").unwrap();
    let config = Config {
        extra_ignore_patterns: vec!["generated/*".to_string()],
        ..Config::default()
    };

    let filter = in_dir(dir.path(), || FileFilter::load(&config)).unwrap();

    assert!(filter.should_skip("yarn.lock"));
    assert!(filter.should_skip("generated/schema.rs"));
    assert!(!filter.should_skip("src/generated.rs"));
}
