//! Integration tests for config load/save and base URL resolution.

use copilot_client::config::{self, resolve_base_url, DEFAULT_BASE_URL};
use copilot_client::{ApiClient, Config, PageScheme, RequestDefaults};
use predicates::prelude::*;

#[test]
fn load_existing_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        r#"
api:
  base_url: "https://copilot-api.example.com/"
  model: "gpt-4o-mini"
  language: "rust"
  system_prompt: "Answer tersely."
page:
  origin: "https://copilot.example.com"
"#,
    )
    .unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(
        cfg.api.base_url.as_deref(),
        Some("https://copilot-api.example.com/")
    );
    assert_eq!(cfg.api.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(cfg.api.language.as_deref(), Some("rust"));
    assert_eq!(cfg.api.system_prompt.as_deref(), Some("Answer tersely."));
    assert_eq!(cfg.page.origin.as_deref(), Some("https://copilot.example.com"));
}

#[test]
fn empty_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "{}\n").unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg, Config::default());
}

#[test]
fn missing_file_is_an_error_for_load_but_not_load_or_default() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("absent.yaml");

    let err = config::load(&config_path).unwrap_err();
    assert!(err.to_string().contains("absent.yaml"));
    let cfg = config::load_or_default(&config_path).expect("defaults when missing");
    assert_eq!(cfg, Config::default());
}

#[test]
fn invalid_yaml_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "api: [unterminated\n").unwrap();

    let err = config::load(&config_path).unwrap_err();
    assert!(matches!(err, config::ConfigError::Parse { .. }));
}

#[test]
fn save_creates_directory_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("copilot");
    let config_path = config_dir.join("config.yaml");
    assert!(!config_dir.exists(), "config dir should not exist yet");

    let mut cfg = Config::default();
    cfg.api.base_url = Some("http://localhost:3001".into());
    cfg.api.model = Some("gpt-4o-mini".into());

    config::save(&config_path, &cfg).expect("save should succeed");
    assert!(predicates::path::exists().eval(&config_path));

    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(predicates::str::contains("base_url").eval(&contents));
    assert!(
        predicates::str::contains("system_prompt").not().eval(&contents),
        "unset fields are omitted"
    );
    let reloaded = config::load(&config_path).expect("reload should succeed");
    assert_eq!(reloaded, cfg);
}

#[test]
fn resolve_base_url_precedence_and_trimming() {
    assert_eq!(resolve_base_url(None, None), DEFAULT_BASE_URL);
    assert_eq!(resolve_base_url(Some(""), Some("  ")), DEFAULT_BASE_URL);
    assert_eq!(
        resolve_base_url(None, Some("https://file.example.com/")),
        "https://file.example.com"
    );
    assert_eq!(
        resolve_base_url(Some("https://env.example.com///"), Some("https://file.example.com")),
        "https://env.example.com"
    );
    assert_eq!(resolve_base_url(Some("///"), None), DEFAULT_BASE_URL);
}

#[test]
fn page_origin_parsing() {
    assert_eq!(PageScheme::from_origin("https://a.example"), PageScheme::Https);
    assert_eq!(PageScheme::from_origin("HTTPS:"), PageScheme::Https);
    assert_eq!(PageScheme::from_origin("http://localhost:3000"), PageScheme::Http);
    assert_eq!(PageScheme::from_origin("file:"), PageScheme::Other);
}

#[test]
fn client_from_file_values() {
    let mut cfg = Config::default();
    cfg.api.base_url = Some("https://copilot-api.example.com/".into());
    cfg.api.model = Some("m".into());
    cfg.page.origin = Some("https://copilot.example.com".into());

    let base_url = resolve_base_url(None, cfg.api.base_url.as_deref());
    let client = ApiClient::from_parts(
        &base_url,
        cfg.page.origin.as_deref(),
        RequestDefaults::from_config(&cfg),
    );
    assert_eq!(client.base_url(), "https://copilot-api.example.com");
    assert_eq!(client.page_scheme(), Some(PageScheme::Https));
    assert_eq!(client.defaults().model.as_deref(), Some("m"));
    assert!(client.defaults().language.is_none());
    assert!(client.check_mixed_content().is_ok());
}

#[test]
fn client_from_parts_without_origin_never_blocks() {
    let client = ApiClient::from_parts("http://localhost:3001/", None, RequestDefaults::default());
    assert_eq!(client.base_url(), "http://localhost:3001");
    assert_eq!(client.page_scheme(), None);
    assert!(client.check_mixed_content().is_ok());

    let guarded = ApiClient::from_parts(
        "http://localhost:3001",
        Some("https://copilot.example.com"),
        RequestDefaults::default(),
    );
    assert!(guarded.check_mixed_content().is_err());
}

/// Config path resolves to `~/.copilot/config.yaml` using the current platform's home dir.
#[test]
fn default_config_path_uses_home_directory() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap().to_string();

    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let original = std::env::var(key).ok();

    std::env::set_var(key, &home);
    let path = config::default_config_path();
    match original {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }

    let path = path.expect("should resolve a config path");
    let expected = dir.path().join(".copilot").join("config.yaml");
    assert_eq!(path, expected);
}
