use folio_config::SiteConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
typewriter:
  phrases:
    - "A"
    - "BC"
  hold_ms: 900
contact:
  access_key: "${FOLIO_TEST_RELAY_KEY}"
  messages:
    success: "Thanks!"
logging:
  format: json
"#;
    let p = write_yaml(&tmp, "folio.yaml", file_yaml);

    let config = temp_env::with_var("FOLIO_TEST_RELAY_KEY", Some("k-123"), || {
        SiteConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load site config")
    });

    assert_eq!(config.version.as_deref(), Some("0.1"));
    assert_eq!(config.typewriter.phrases, vec!["A", "BC"]);
    assert_eq!(config.typewriter.hold_ms, 900);
    assert_eq!(config.typewriter.type_delay_ms, 150);
    assert_eq!(config.contact.access_key.as_deref(), Some("k-123"));
    assert_eq!(config.contact.messages.success, "Thanks!");
    assert_eq!(config.contact.messages.sending, "Sending....");
    assert_eq!(config.logging.format, "json");
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "folio.yaml",
        "contact:\n  failure_reset_ms: 3000\n  access_key: from-file\n",
    );

    let config = temp_env::with_vars(
        [
            ("FOLIO__CONTACT__FAILURE_RESET_MS", Some("1234")),
            ("FOLIO__CONTACT__ACCESS_KEY", Some("from-env")),
        ],
        || SiteConfigLoader::new().with_file(&p).load().expect("load"),
    );

    assert_eq!(config.contact.failure_reset_ms, 1234);
    assert_eq!(config.contact.access_key.as_deref(), Some("from-env"));
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = SiteConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults are valid");

    assert!(config.version.is_none());
    assert_eq!(config.typewriter.phrases.len(), 3);
    assert!(config.contact.access_key.is_none());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SiteConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn invalid_phrases_fail_validation() {
    let result = SiteConfigLoader::new()
        .with_yaml_str("typewriter:\n  phrases: [\"ok\", \"\"]\n")
        .load();
    assert!(result.is_err());
}
