use std::collections::HashMap;
use std::io::Write;

use adiwiyata_server::config::{
    self, SiteConfig, StoreSettings, apply_env_overrides, config_info, redact_key,
};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn empty_document_gets_defaults() {
    let config = config::parse("{}").unwrap();

    assert_eq!(config.config_version, 1);
    assert_eq!(config.bind, "0.0.0.0:8080");
    assert_eq!(config.display_utc_offset_hours, 7);
    assert_eq!(config.video_id, "yOb9Xaug35M");
    assert_eq!(config.gemini.model, "gemini-1.5-flash");
    assert_eq!(config.gemini.timeout_secs, 60);
    assert_eq!(config.gemini.api_key, None);
    assert_eq!(config.store, StoreSettings::Memory);
    assert_eq!(config.max_attachment_bytes, 4 * 1024 * 1024);
    assert_eq!(config.chat.max_sessions, 1_000);
    assert_eq!(config.chat.idle_ttl_secs, 1_800);
}

#[test]
fn chat_limits_parse_with_partial_overrides() {
    let config = config::parse(r#"{ "chat": { "max_sessions": 50 } }"#).unwrap();

    assert_eq!(config.chat.max_sessions, 50);
    assert_eq!(config.chat.idle_ttl_secs, 1_800);
    assert_eq!(config.chat.sweep_interval_secs, 60);
    assert_eq!(config_info(&config).max_chat_sessions, 50);
}

#[test]
fn zero_or_malformed_version_is_rejected() {
    let err = config::parse(r#"{ "config_version": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("at least 1"));

    let err = config::parse(r#"{ "config_version": "one" }"#).unwrap_err();
    assert!(err.to_string().contains("positive integer"));
}

#[test]
fn newer_config_version_is_rejected() {
    let err = config::parse(r#"{ "config_version": 99 }"#).unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn firestore_store_parses_with_defaults() {
    let config = config::parse(
        r#"{
            "config_version": 1,
            "store": { "type": "firestore", "project_id": "sekolah-hijau" }
        }"#,
    )
    .unwrap();

    let StoreSettings::Firestore {
        project_id,
        api_key,
        base_url,
        poll_interval_ms,
    } = config.store
    else {
        panic!("expected firestore settings");
    };
    assert_eq!(project_id, "sekolah-hijau");
    assert_eq!(api_key, None);
    assert_eq!(base_url, "https://firestore.googleapis.com");
    assert_eq!(poll_interval_ms, 2_000);
}

#[test]
fn load_file_reads_json_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "config_version": 1, "bind": "127.0.0.1:3000", "video_id": "abc123" }}"#
    )
    .unwrap();

    let config = config::load_file(file.path()).unwrap();
    assert_eq!(config.bind, "127.0.0.1:3000");
    assert_eq!(config.video_id, "abc123");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn env_overrides_apply_on_top() {
    let config = apply_env_overrides(
        SiteConfig::default(),
        env(&[
            ("ADIWIYATA_BIND", "127.0.0.1:9000"),
            ("GEMINI_API_KEY", "AIzaSyOverride00xyz1"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("ADIWIYATA_ASSETS_DIR", "/srv/adiwiyata"),
            ("GEMINI_BASE_URL", ""),
        ]),
    );

    assert_eq!(config.bind, "127.0.0.1:9000");
    assert_eq!(config.gemini.api_key.as_deref(), Some("AIzaSyOverride00xyz1"));
    assert_eq!(config.gemini.model, "gemini-2.0-flash");
    assert_eq!(config.assets_dir.to_str(), Some("/srv/adiwiyata"));
    assert_eq!(config.gemini.base_url, "https://generativelanguage.googleapis.com");
}

#[test]
fn firestore_env_switches_store() {
    let config = apply_env_overrides(
        SiteConfig::default(),
        env(&[
            ("FIRESTORE_PROJECT_ID", "sekolah-hijau"),
            ("FIRESTORE_API_KEY", "AIzaSyFirestore0key9"),
        ]),
    );

    assert!(matches!(
        &config.store,
        StoreSettings::Firestore { project_id, api_key: Some(key), .. }
            if project_id == "sekolah-hijau" && key == "AIzaSyFirestore0key9"
    ));
}

#[test]
fn firestore_key_alone_leaves_memory_store() {
    let config = apply_env_overrides(
        SiteConfig::default(),
        env(&[("FIRESTORE_API_KEY", "AIzaSyFirestore0key9")]),
    );
    assert_eq!(config.store, StoreSettings::Memory);
}

#[test]
fn info_redacts_keys() {
    let mut config = SiteConfig::default();
    config.gemini.api_key = Some("AIzaSyAbcdefghxyz1".to_string());

    let info = config_info(&config);
    assert_eq!(info.gemini_key_hint.as_deref(), Some("AIza...xyz1"));
    assert_eq!(info.store_type, "memory");
    assert_eq!(info.firestore_key_hint, None);

    let logged = format!("{info:?}");
    assert!(!logged.contains("AIzaSyAbcdefghxyz1"));
}

#[test]
fn short_keys_are_fully_masked() {
    assert_eq!(redact_key("abc"), "****");
    assert_eq!(redact_key("12345678"), "****");
    assert_eq!(redact_key("123456789"), "1234...6789");
}
