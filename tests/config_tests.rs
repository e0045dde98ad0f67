//! Tests for StoreConfig and id generation

use docstore::{DocStoreError, IdGenerator, MemorySink, RandomIds, StoreConfig};

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_new_config_has_no_hooks() {
    let config = StoreConfig::new("users");

    assert_eq!(config.name, "users");
    assert!(config.loader.is_none());
    assert!(config.writer.is_none());
}

#[test]
fn test_builder_requires_name() {
    let err = StoreConfig::builder().build().unwrap_err();

    assert!(matches!(err, DocStoreError::Config(_)));
    assert_eq!(err.code(), "CONFIG");
}

#[test]
fn test_builder_rejects_blank_name() {
    assert!(StoreConfig::builder().name("   ").build().is_err());
}

#[test]
fn test_builder_sink_sets_both_hooks() {
    let config = StoreConfig::builder()
        .name("users")
        .sink(MemorySink::new())
        .build()
        .unwrap();

    assert!(config.loader.is_some());
    assert!(config.writer.is_some());
}

#[test]
fn test_builder_custom_id_generator() {
    let config = StoreConfig::builder()
        .name("users")
        .id_generator(|| "fixed".to_string())
        .build()
        .unwrap();

    assert_eq!(config.id_generator.generate(), "fixed");
}

#[test]
fn test_config_debug_hides_hooks() {
    let config = StoreConfig::builder()
        .name("users")
        .writer(MemorySink::new())
        .build()
        .unwrap();

    let debug = format!("{:?}", config);
    assert!(debug.contains("users"));
    assert!(debug.contains("writer: true"));
    assert!(debug.contains("loader: false"));
}

// =============================================================================
// Id Generator Tests
// =============================================================================

#[test]
fn test_random_ids_default_is_four_bytes() {
    let ids = RandomIds::default();

    assert_eq!(ids.bytes(), 4);
    assert_eq!(ids.generate().len(), 8);
}

#[test]
fn test_random_ids_custom_width() {
    let id = RandomIds::with_bytes(16).generate();

    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_random_ids_zero_width_is_bumped() {
    assert_eq!(RandomIds::with_bytes(0).generate().len(), 2);
}

#[test]
fn test_random_ids_vary() {
    let ids = RandomIds::with_bytes(8);
    let first = ids.generate();

    assert!((0..10).any(|_| ids.generate() != first));
}
