use std::collections::HashMap;

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var| map.get(var).cloned()
}

#[test]
fn token_from_env_wins_over_file() {
    let file = FileSettings {
        token: Some("secret_file".to_string()),
        ..Default::default()
    };
    let settings = Settings::resolve(env_of(&[(TOKEN_VAR, "secret_env")]), Some(&file)).unwrap();
    assert_eq!(settings.token, "secret_env");
}

#[test]
fn token_falls_back_to_file() {
    let file = FileSettings {
        token: Some("secret_file".to_string()),
        version: Some("2025-09-03".to_string()),
        ..Default::default()
    };
    let settings = Settings::resolve(env_of(&[(TOKEN_VAR, "  ")]), Some(&file)).unwrap();
    assert_eq!(settings.token, "secret_file");
    assert_eq!(settings.api_version, "2025-09-03");
}

#[test]
fn missing_token_is_a_config_error() {
    let err = Settings::resolve(env_of(&[]), None).unwrap_err();
    assert!(matches!(err, ApiError::Config(ref msg) if msg.contains(TOKEN_VAR)));
}

#[test]
fn defaults_fill_the_rest() {
    let settings = Settings::resolve(env_of(&[(TOKEN_VAR, "t")]), None).unwrap();
    assert_eq!(settings.api_version, DEFAULT_API_VERSION);
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let settings = Settings::resolve(
        env_of(&[(TOKEN_VAR, "t"), (BASE_URL_VAR, "http://localhost:8080/v1/")]),
        None,
    )
    .unwrap();
    assert_eq!(settings.base_url, "http://localhost:8080/v1");
}

#[test]
fn bad_timeout_is_rejected() {
    let err = Settings::resolve(env_of(&[(TOKEN_VAR, "t"), (TIMEOUT_VAR, "soon")]), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn save_then_load_omits_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let settings = Settings {
        token: "secret_abc".to_string(),
        api_version: DEFAULT_API_VERSION.to_string(),
        base_url: "http://localhost:9999".to_string(),
        timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    };

    save_to(&path, &settings).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("[notion]"));
    assert!(!raw.contains("version"));
    assert!(!raw.contains("timeout_secs"));

    let loaded = load_from(&path).unwrap().unwrap();
    assert_eq!(loaded.token.as_deref(), Some("secret_abc"));
    assert_eq!(loaded.base_url.as_deref(), Some("http://localhost:9999"));
    assert_eq!(loaded.version, None);
}

#[test]
fn sources_report_provenance() {
    let file = FileSettings {
        base_url: Some("http://localhost".to_string()),
        ..Default::default()
    };
    let sources = sources_from(env_of(&[(TOKEN_VAR, "t")]), Some(&file));
    assert_eq!(sources.token, SettingSource::EnvVar(TOKEN_VAR));
    assert_eq!(sources.base_url, SettingSource::ConfigFile);
    assert_eq!(sources.api_version, SettingSource::Default);

    let sources = sources_from(env_of(&[]), None);
    assert_eq!(sources.token, SettingSource::Missing);
    assert_eq!(sources.token.to_string(), "not set");
}

#[test]
fn debug_output_masks_the_token() {
    let settings = Settings::resolve(env_of(&[(TOKEN_VAR, "secret_0123456789")]), None).unwrap();
    let debug = format!("{:?}", settings);
    assert!(debug.contains("secret****"));
    assert!(!debug.contains("0123456789"));
}
