//! Client configuration.
//!
//! Read from `<config dir>/cloudput/config.json`, then overridden by the
//! `CLOUDPUT_ACCESS_TOKEN` and `CLOUDPUT_CONTENT_URL` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

const ENV_ACCESS_TOKEN: &str = "CLOUDPUT_ACCESS_TOKEN";
const ENV_CONTENT_URL: &str = "CLOUDPUT_CONTENT_URL";

/// On-disk layout of `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    access_token: String,
    content_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth2 bearer token.
    pub access_token: Option<String>,

    /// Base URL of the content endpoints.
    pub content_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            content_url: cloudput_protocol::DEFAULT_CONTENT_URL.into(),
        }
    }
}

impl Config {
    /// Loads `path`, or the default config file, then applies the environment.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)
                        .with_context(|| format!("failed to read config {}", path.display()))?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Config::default();

        if let Ok(file) = serde_json::from_str::<ConfigFile>(&content) {
            if !file.access_token.is_empty() {
                config.access_token = Some(file.access_token);
            }
            if !file.content_url.is_empty() {
                config.content_url = file.content_url;
            }
        } else {
            tracing::warn!(
                path = %path.display(),
                "failed to parse config, using defaults"
            );
        }
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            self.access_token = Some(token);
        }
        if let Some(url) = lookup(ENV_CONTENT_URL).filter(|v| !v.is_empty()) {
            self.content_url = url;
        }
    }

    /// Returns the access token or a setup error naming where to put one.
    pub fn access_token(&self) -> anyhow::Result<&str> {
        self.access_token.as_deref().with_context(|| {
            format!(
                "no access token configured: set access_token in {} or {ENV_ACCESS_TOKEN}",
                default_config_path().display()
            )
        })
    }
}

fn default_config_path() -> PathBuf {
    config_base_dir().join("cloudput").join("config.json")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(xdg);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}
