//! Tests for the configuration system

use counselor_notify::config::RoutingEnvironment;
use counselor_notify::Config;

#[test]
fn test_config_loads_from_default_toml() {
    let config = Config::load(None).expect("Failed to load config");

    assert_eq!(config.notify.subject, "REQUEST TO SEE COUNSELOR");
    assert_eq!(config.notify.environment, RoutingEnvironment::Testing);
    assert_eq!(config.notify.admin_email, "counseling.admin@school.example");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn test_default_config_passes_validation() {
    let config = Config::load(None).expect("Failed to load config");
    config.validate().expect("default config should validate");
}

#[test]
fn test_default_routing_tables() {
    let config = Config::load(None).expect("Failed to load config");

    // Both environments carry the full counselor set
    assert_eq!(config.routing.production.len(), 9);
    assert_eq!(config.routing.testing.len(), 9);

    // Testing routes everything to the admin mailbox
    assert!(config
        .routing
        .testing
        .iter()
        .all(|r| r.email == "counseling.admin@school.example"));

    // The active table follows the configured environment
    let table = config.routing_table();
    assert_eq!(
        table.resolve("Gomez (Cas-Fl)"),
        Some("counseling.admin@school.example")
    );
}

#[test]
fn test_default_column_layout() {
    let config = Config::load(None).expect("Failed to load config");

    assert_eq!(config.columns.student_email, 1);
    assert_eq!(config.columns.counselor_name, 2);
    assert_eq!(config.columns.student_id, 3);
    assert_eq!(config.columns.last_name, 4);
    assert_eq!(config.columns.first_name, 5);
    assert_eq!(config.columns.expected_len, 10);
}

#[test]
fn test_default_sheet_settings() {
    let config = Config::load(None).expect("Failed to load config");

    assert_eq!(config.sheets.names.len(), 8);
    assert_eq!(config.sheets.checkbox_column, 12);
    assert_eq!(config.sheets.first_data_row, 2);
}
