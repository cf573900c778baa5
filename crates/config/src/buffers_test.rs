use super::*;
use std::str::FromStr;

use crate::Config;

// =============================================================================
// Default tests
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = BufferConfig::default();
    assert_eq!(config.process_interval, Duration::from_secs(5));
    assert_eq!(config.retry_interval, Duration::from_secs(10));
    assert_eq!(config.max_items_per_interval, 5000);
    assert_eq!(config.queued_item_limit, 25000);
    assert!(!config.file_buffer_enabled);
    assert!(!config.file_buffer_force_enabled);
    assert_eq!(config.file_buffer_page_size, 5_000_000);
    assert_eq!(config.file_buffer_read_interval, Duration::from_millis(100));
    assert_eq!(config.file_buffer_write_interval, Duration::from_millis(100));
    assert_eq!(config.file_buffer_idle_close, Duration::from_secs(5));
    assert_eq!(config.path, PathBuf::from("buffer"));
}

// =============================================================================
// Builder tests
// =============================================================================

#[test]
fn test_config_with_file_buffer() {
    let config = BufferConfig::default().with_file_buffer();
    assert!(config.file_buffer_enabled);
    assert!(!config.file_buffer_force_enabled);
}

#[test]
fn test_config_with_file_buffer_forced() {
    let config = BufferConfig::default().with_file_buffer_forced();
    assert!(config.file_buffer_enabled);
    assert!(config.file_buffer_force_enabled);
}

#[test]
fn test_config_chained_builders() {
    let config = BufferConfig::default()
        .with_queued_item_limit(100)
        .with_max_items_per_interval(10)
        .with_page_size(1000)
        .with_process_interval(Duration::from_millis(50))
        .with_retry_interval(Duration::from_millis(200))
        .with_read_interval(Duration::from_millis(20))
        .with_write_interval(Duration::from_millis(20))
        .with_idle_close(Duration::from_millis(500))
        .with_path("/tmp/pages")
        .with_file_buffer();

    assert_eq!(config.queued_item_limit, 100);
    assert_eq!(config.max_items_per_interval, 10);
    assert_eq!(config.file_buffer_page_size, 1000);
    assert_eq!(config.process_interval, Duration::from_millis(50));
    assert_eq!(config.retry_interval, Duration::from_millis(200));
    assert_eq!(config.file_buffer_read_interval, Duration::from_millis(20));
    assert_eq!(config.file_buffer_write_interval, Duration::from_millis(20));
    assert_eq!(config.file_buffer_idle_close, Duration::from_millis(500));
    assert_eq!(config.path, PathBuf::from("/tmp/pages"));
    assert!(config.file_buffer_enabled);
}

// =============================================================================
// Validation tests
// =============================================================================

#[test]
fn test_validate_defaults() {
    assert!(BufferConfig::default().validate("default").is_ok());
}

#[test]
fn test_validate_zero_queue_limit() {
    let config = BufferConfig::default().with_queued_item_limit(0);
    let err = config.validate("publish").unwrap_err();
    assert!(err.to_string().contains("queued_item_limit"));
}

#[test]
fn test_validate_zero_batch_budget() {
    let config = BufferConfig::default().with_max_items_per_interval(0);
    assert!(config.validate("publish").is_err());
}

#[test]
fn test_validate_zero_page_size() {
    let config = BufferConfig::default().with_file_buffer().with_page_size(0);
    let err = config.validate("publish").unwrap_err();
    assert!(err.to_string().contains("file_buffer_page_size"));
}

#[test]
fn test_validate_force_requires_enabled() {
    let mut config = BufferConfig::default();
    config.file_buffer_force_enabled = true;
    let err = config.validate("publish").unwrap_err();
    assert!(err.to_string().contains("file_buffer_force_enabled"));
}

// =============================================================================
// TOML parsing tests
// =============================================================================

#[test]
fn test_parse_empty_config() {
    let config = Config::from_str("").unwrap();
    assert!(config.buffers.is_empty());
}

#[test]
fn test_parse_named_buffers() {
    let toml = r#"
        [buffers.publish]
        queued_item_limit = 50000
        file_buffer_enabled = true
        file_buffer_page_size = 10000000

        [buffers.delete]
        process_interval = "1s"
    "#;

    let config = Config::from_str(toml).unwrap();
    assert_eq!(config.buffers.len(), 2);

    let publish = config.buffers.get("publish").unwrap();
    assert_eq!(publish.queued_item_limit, 50000);
    assert!(publish.file_buffer_enabled);
    assert_eq!(publish.file_buffer_page_size, 10_000_000);
    // untouched fields keep defaults
    assert_eq!(publish.process_interval, Duration::from_secs(5));

    let delete = config.buffers.get("delete").unwrap();
    assert_eq!(delete.process_interval, Duration::from_secs(1));
    assert!(!delete.file_buffer_enabled);
}

#[test]
fn test_parse_humantime_durations() {
    let toml = r#"
        [buffers.index]
        retry_interval = "30s"
        file_buffer_read_interval = "250ms"
    "#;

    let config = Config::from_str(toml).unwrap();
    let index = config.buffers.get("index").unwrap();
    assert_eq!(index.retry_interval, Duration::from_secs(30));
    assert_eq!(index.file_buffer_read_interval, Duration::from_millis(250));
}

#[test]
fn test_parse_invalid_toml() {
    assert!(Config::from_str("buffers = 3").is_err());
}

#[test]
fn test_buffers_config_accessors() {
    let toml = r#"
        [buffers.a]
        [buffers.b]
    "#;

    let config = Config::from_str(toml).unwrap();
    assert!(config.buffers.contains("a"));
    assert!(!config.buffers.contains("c"));

    let mut names: Vec<_> = config.buffers.names().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(config.buffers.iter().count(), 2);
}

#[test]
fn test_config_validate_rejects_bad_buffer() {
    let toml = r#"
        [buffers.publish]
        queued_item_limit = 0
    "#;

    let config = Config::from_str(toml).unwrap();
    assert!(config.validate().is_err());
}
