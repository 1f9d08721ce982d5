//! Integration tests for configuration loading

use serial_test::serial;
use sheetgate_common::{Error, Settings};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
    file.write_all(contents.as_bytes()).expect("Should write config");
    file
}

#[test]
#[serial]
fn loads_complete_config_from_file() {
    let file = write_config(
        r#"
            auth0_domain = "dev-tenant.us.auth0.com"
            m2m_client_id = "m2m-id"
            m2m_client_secret = "m2m-secret"
            channel_id = "UCabc"
            host = "0.0.0.0"
            port = 8080
            allowed_origin = "https://sheets.example"
        "#,
    );

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.auth0_domain, "dev-tenant.us.auth0.com");
    assert_eq!(settings.host, "0.0.0.0");
    assert_eq!(settings.port, 8080);
    assert_eq!(settings.allowed_origin, "https://sheets.example");
}

#[test]
#[serial]
fn missing_file_is_a_config_error() {
    let result = Settings::load(std::path::Path::new("/nonexistent/sheetgate.toml"));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn incomplete_config_fails_validation() {
    // channel_id is a required field, so parsing fails before validation runs
    let file = write_config(
        r#"
            auth0_domain = "dev-tenant.us.auth0.com"
            m2m_client_id = "m2m-id"
            m2m_client_secret = "m2m-secret"
        "#,
    );

    assert!(matches!(Settings::load(file.path()), Err(Error::Config(_))));
}

#[test]
#[serial]
fn env_overrides_take_priority() {
    std::env::set_var("SHEETGATE_CHANNEL_ID", "UCfromenv");
    std::env::set_var("SHEETGATE_PORT", "9999");

    let file = write_config(
        r#"
            auth0_domain = "dev-tenant.us.auth0.com"
            m2m_client_id = "m2m-id"
            m2m_client_secret = "m2m-secret"
            channel_id = "UCfromfile"
            port = 4000
        "#,
    );

    let settings = Settings::load(file.path()).unwrap();

    std::env::remove_var("SHEETGATE_CHANNEL_ID");
    std::env::remove_var("SHEETGATE_PORT");

    assert_eq!(settings.channel_id, "UCfromenv");
    assert_eq!(settings.port, 9999);
}
