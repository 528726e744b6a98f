use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_api() {
    let settings = Settings::default();
    assert_eq!(settings.api_url, "http://127.0.0.1:8000/api");
    assert_eq!(settings.log_filter, "info");
    assert!(settings.default_filters.is_empty());
    validate(&settings).expect("defaults are valid");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_url = "https://catalog.example.com/api"
log_filter = "client_core=debug"

[filters]
name = "lamp"
"#,
    )
    .expect("parse");

    assert_eq!(settings.api_url, "https://catalog.example.com/api");
    assert_eq!(settings.log_filter, "client_core=debug");
    assert_eq!(
        settings.default_filters.active().collect::<Vec<_>>(),
        vec![("name", "lamp")]
    );
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "bind_addr = \"0.0.0.0:1\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("CATALOG_API_URL", "http://plain/api"),
            ("APP__API_URL", "http://prefixed/api"),
            ("CATALOG_LOG", "warn"),
        ]),
    );

    assert_eq!(settings.api_url, "http://prefixed/api");
    assert_eq!(settings.log_filter, "warn");
}

#[test]
fn rejects_non_http_api_url() {
    let settings = Settings {
        api_url: "ftp://catalog.example.com".into(),
        ..Settings::default()
    };
    assert!(validate(&settings).is_err());

    let settings = Settings {
        api_url: "catalog".into(),
        ..Settings::default()
    };
    assert!(validate(&settings).is_err());
}

#[test]
fn loads_settings_file_from_explicit_path() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("catalog_cli_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("catalog.toml");
    fs::write(&path, "log_filter = \"debug\"\n").expect("write settings");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.log_filter, "debug");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let path = env::temp_dir().join("catalog_cli_settings_missing.toml");
    let settings = load_settings(Some(&path)).expect("load");
    assert!(!settings.api_url.is_empty());
}
