use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::Strategy;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
        }
    }
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// Ready-made bearer token. Takes precedence over client credentials.
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default = "default_spotify_api_base")]
    pub api_base: String,
    #[serde(default = "default_spotify_accounts_base")]
    pub accounts_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            client_id: None,
            client_secret: None,
            api_base: default_spotify_api_base(),
            accounts_base: default_spotify_accounts_base(),
        }
    }
}

impl SpotifyConfig {
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_client_credentials(&self) -> bool {
        self.client_id.as_ref().is_some_and(|s| !s.is_empty())
            && self.client_secret.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.has_access_token() || self.has_client_credentials()
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_gemini_api_base() -> String {
    DEFAULT_GEMINI_API_BASE.to_string()
}

fn default_spotify_api_base() -> String {
    DEFAULT_SPOTIFY_API_BASE.to_string()
}

fn default_spotify_accounts_base() -> String {
    DEFAULT_SPOTIFY_ACCOUNTS_BASE.to_string()
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("moodify")
        .join("config.toml")
}

fn load_file(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
            Config::default()
        }
    }
}

/// Loads the config file and applies environment overrides.
///
/// Called once at startup; the result is handed to the clients.
pub fn load_config() -> Config {
    let mut cfg = load_file(&config_path());
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    cfg
}

/// Environment values win over the file. Empty values are ignored.
pub fn apply_env_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(strategy) = get("MOODIFY_STRATEGY") {
        match strategy.parse() {
            Ok(s) => cfg.strategy = s,
            Err(e) => tracing::warn!(value = %strategy, error = %e, "ignoring MOODIFY_STRATEGY"),
        }
    }
    if let Some(key) = get("GEMINI_API_KEY") {
        cfg.gemini.api_key = Some(key);
    }
    if let Some(token) = get("SPOTIFY_ACCESS_TOKEN") {
        cfg.spotify.access_token = Some(token);
    }
    if let Some(id) = get("SPOTIFY_CLIENT_ID") {
        cfg.spotify.client_id = Some(id);
    }
    if let Some(secret) = get("SPOTIFY_CLIENT_SECRET") {
        cfg.spotify.client_secret = Some(secret);
    }
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_sections_missing() {
        let cfg: Config = toml::from_str("strategy = \"spotify\"").unwrap();
        assert_eq!(cfg.strategy, Strategy::Spotify);
        assert_eq!(cfg.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(cfg.spotify.api_base, DEFAULT_SPOTIFY_API_BASE);
        assert!(!cfg.spotify.is_configured());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [gemini]
            api_key = "g-key"

            [spotify]
            client_id = "id"
            client_secret = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.strategy, Strategy::Gemini);
        assert!(cfg.gemini.is_configured());
        assert_eq!(cfg.gemini.api_base, DEFAULT_GEMINI_API_BASE);
        assert!(cfg.spotify.has_client_credentials());
        assert!(!cfg.spotify.has_access_token());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.gemini.api_key = Some("from-file".to_string());

        let env: HashMap<&str, &str> = HashMap::from([
            ("MOODIFY_STRATEGY", "spotify"),
            ("GEMINI_API_KEY", "from-env"),
            ("SPOTIFY_ACCESS_TOKEN", "tok"),
            ("SPOTIFY_CLIENT_ID", "   "),
        ]);
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.strategy, Strategy::Spotify);
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("from-env"));
        assert_eq!(cfg.spotify.access_token.as_deref(), Some("tok"));
        assert!(cfg.spotify.client_id.is_none());
    }

    #[test]
    fn test_bad_strategy_env_is_ignored() {
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg, |k| {
            (k == "MOODIFY_STRATEGY").then(|| "lastfm".to_string())
        });
        assert_eq!(cfg.strategy, Strategy::Gemini);
    }

    #[test]
    fn test_load_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_file(&dir.path().join("missing.toml"));
        assert_eq!(missing.strategy, Strategy::Gemini);

        // A directory exists but cannot be read as a file.
        let unreadable = load_file(dir.path());
        assert!(unreadable.gemini.api_key.is_none());
        assert_eq!(unreadable.spotify.api_base, DEFAULT_SPOTIFY_API_BASE);

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "strategy = \"spotify\"\n[gemini]\napi_key = \"k\"\n").unwrap();
        let cfg = load_file(&path);
        assert_eq!(cfg.strategy, Strategy::Spotify);
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut cfg = Config::default();
        cfg.spotify.access_token = Some("tok".to_string());
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.spotify.access_token.as_deref(), Some("tok"));
        assert_eq!(back.strategy, cfg.strategy);
    }
}
