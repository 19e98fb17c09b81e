use std::path::{Path, PathBuf};

use adiwiyata_gemini::client::{DEFAULT_BASE_URL as GEMINI_BASE_URL, DEFAULT_MODEL};
use adiwiyata_site::content::DEFAULT_VIDEO_ID;
use adiwiyata_store::firestore::DEFAULT_BASE_URL as FIRESTORE_BASE_URL;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this on an incompatible change of shape.
pub const CURRENT_VERSION: u32 = 1;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "ADIWIYATA_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Schema version. A document without one is read as the current version.
    #[serde(default = "current_version")]
    pub config_version: u32,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Chat bubble times are shown in this fixed offset (7 = WIB).
    #[serde(default = "default_utc_offset")]
    pub display_utc_offset_hours: i8,
    #[serde(default = "default_video_id")]
    pub video_id: String,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
    #[serde(default)]
    pub chat: ChatSettings,
}

/// Limits on open AdiBot sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Idle sessions (no request, no open stream) are closed after this long.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreSettings {
    /// In-process store. Comments are lost on restart.
    #[default]
    Memory,
    Firestore {
        project_id: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        api_key: Option<String>,
        #[serde(default = "default_firestore_base_url")]
        base_url: String,
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
}

/// Redacted config info, safe to log.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInfo {
    pub bind: String,
    pub assets_dir: String,
    pub display_utc_offset_hours: i8,
    pub video_id: String,
    pub gemini_model: String,
    pub gemini_key_hint: Option<String>,
    pub store_type: String,
    pub firestore_project_id: Option<String>,
    pub firestore_key_hint: Option<String>,
    pub max_attachment_bytes: usize,
    pub max_chat_sessions: usize,
    pub chat_idle_ttl_secs: u64,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_utc_offset() -> i8 {
    7
}

fn default_video_id() -> String {
    DEFAULT_VIDEO_ID.to_string()
}

fn default_max_attachment_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_max_sessions() -> usize {
    1_000
}

fn default_idle_ttl_secs() -> u64 {
    30 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    GEMINI_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_firestore_base_url() -> String {
    FIRESTORE_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            bind: default_bind(),
            assets_dir: default_assets_dir(),
            display_utc_offset_hours: default_utc_offset(),
            video_id: default_video_id(),
            gemini: GeminiSettings::default(),
            store: StoreSettings::default(),
            max_attachment_bytes: default_max_attachment_bytes(),
            chat: ChatSettings::default(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load the config from `ADIWIYATA_CONFIG` (or defaults when unset) and
/// apply environment overrides on top.
pub fn load() -> eyre::Result<SiteConfig> {
    let config = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => load_file(Path::new(&path))?,
        None => {
            tracing::info!("{CONFIG_PATH_ENV} not set, using defaults");
            SiteConfig::default()
        }
    };
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

pub fn load_file(path: &Path) -> eyre::Result<SiteConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;
    let config = parse(&contents)?;
    tracing::info!(path = %path.display(), version = config.config_version, "config loaded");
    Ok(config)
}

/// Parse a config document. The version is checked before the shape so a
/// file written by a newer build fails with a clear message.
pub fn parse(contents: &str) -> eyre::Result<SiteConfig> {
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let version = match json.get("config_version") {
        None => CURRENT_VERSION,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| eyre::eyre!("config_version must be a positive integer, got {v}"))?,
    };
    check_version(version)?;

    let config: SiteConfig = serde_json::from_value(json)?;
    Ok(config)
}

fn check_version(version: u32) -> eyre::Result<()> {
    if version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {version} is newer than this build supports ({CURRENT_VERSION})"
        ));
    }
    if version == 0 {
        return Err(eyre::eyre!("config_version must be at least 1"));
    }
    Ok(())
}

/// Apply environment overrides. `lookup` returns the value of a variable,
/// if set; empty values count as unset.
pub fn apply_env_overrides(
    mut config: SiteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SiteConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(bind) = get("ADIWIYATA_BIND") {
        config.bind = bind;
    }
    if let Some(dir) = get("ADIWIYATA_ASSETS_DIR") {
        config.assets_dir = PathBuf::from(dir);
    }
    if let Some(key) = get("GEMINI_API_KEY") {
        config.gemini.api_key = Some(key);
    }
    if let Some(model) = get("GEMINI_MODEL") {
        config.gemini.model = model;
    }
    if let Some(url) = get("GEMINI_BASE_URL") {
        config.gemini.base_url = url;
    }

    if let Some(project) = get("FIRESTORE_PROJECT_ID") {
        match &mut config.store {
            StoreSettings::Firestore { project_id, .. } => *project_id = project,
            StoreSettings::Memory => {
                config.store = StoreSettings::Firestore {
                    project_id: project,
                    api_key: None,
                    base_url: default_firestore_base_url(),
                    poll_interval_ms: default_poll_interval_ms(),
                };
            }
        }
    }
    if let Some(key) = get("FIRESTORE_API_KEY")
        && let StoreSettings::Firestore { api_key, .. } = &mut config.store
    {
        *api_key = Some(key);
    }

    config
}

pub fn config_info(config: &SiteConfig) -> ConfigInfo {
    let (store_type, firestore_project_id, firestore_key_hint) = match &config.store {
        StoreSettings::Memory => ("memory".to_string(), None, None),
        StoreSettings::Firestore {
            project_id,
            api_key,
            ..
        } => (
            "firestore".to_string(),
            Some(project_id.clone()),
            api_key.as_deref().map(redact_key),
        ),
    };

    ConfigInfo {
        bind: config.bind.clone(),
        assets_dir: config.assets_dir.display().to_string(),
        display_utc_offset_hours: config.display_utc_offset_hours,
        video_id: config.video_id.clone(),
        gemini_model: config.gemini.model.clone(),
        gemini_key_hint: config.gemini.api_key.as_deref().map(redact_key),
        store_type,
        firestore_project_id,
        firestore_key_hint,
        max_attachment_bytes: config.max_attachment_bytes,
        max_chat_sessions: config.chat.max_sessions,
        chat_idle_ttl_secs: config.chat.idle_ttl_secs,
    }
}

pub fn redact_key(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    let prefix = &key[..4];
    let suffix = &key[key.len() - 4..];
    format!("{prefix}...{suffix}")
}
