mod fields;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::NotifierError;
use crate::event::StageState;

pub use fields::{validate_settings_map, SettingsField, ValidationError, SETTINGS_FIELDS};

const CONFIG_FILE_STEM: &str = "rocketchat-notifier";

/// Plugin settings as configured on the CI server.
///
/// Keys match the settings form: `go_server_url`, `api_url`, `api_user`,
/// `api_key`, `room` and the three optional pipeline-group whitelists.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the CI server, used to build links back to stages and jobs
    #[serde(default)]
    pub go_server_url: String,

    /// Rocket.Chat server URL (with or without a trailing `/api/`)
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub api_user: String,

    /// Rocket.Chat password, also hashed for the two-factor header
    #[serde(default)]
    pub api_key: String,

    /// Room or channel the notifications are posted to
    #[serde(default)]
    pub room: String,

    pub passed_pipelines_whitelist: Option<String>,
    pub failed_pipelines_whitelist: Option<String>,
    pub cancelled_pipelines_whitelist: Option<String>,

    /// Upper bound for every outbound HTTP call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            go_server_url: String::new(),
            api_url: String::new(),
            api_user: String::new(),
            api_key: String::new(),
            room: String::new(),
            passed_pipelines_whitelist: None,
            failed_pipelines_whitelist: None,
            cancelled_pipelines_whitelist: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Where the whitelist for a stage outcome comes from.
///
/// Reading may fail for sources backed by raw host settings; the resolver
/// treats a failure as an empty whitelist.
pub trait WhitelistSource {
    fn pipelines_whitelist(&self, state: StageState) -> crate::error::Result<Option<String>>;
}

impl WhitelistSource for Settings {
    fn pipelines_whitelist(&self, state: StageState) -> crate::error::Result<Option<String>> {
        Ok(match state {
            StageState::Passed => self.passed_pipelines_whitelist.clone(),
            StageState::Failed => self.failed_pipelines_whitelist.clone(),
            StageState::Cancelled => self.cancelled_pipelines_whitelist.clone(),
            StageState::Building | StageState::Unknown => None,
        })
    }
}

impl Settings {
    /// Load settings from a file.
    ///
    /// Searches for settings files in this order:
    /// 1. Specified path
    /// 2. ./rocketchat-notifier.toml
    /// 3. ./rocketchat-notifier.json
    /// 4. ./rocketchat-notifier.yaml
    /// 5. ./rocketchat-notifier.yml
    /// 6. `<config dir>/rocketchat-notifier/config.toml`
    ///
    /// There are no usable defaults for credentials, so a missing file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["toml", "json", "yaml", "yml"]
            .iter()
            .map(|ext| PathBuf::from(format!("{CONFIG_FILE_STEM}.{ext}")))
            .chain(
                dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_STEM).join("config.toml")),
            );

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }

        anyhow::bail!(
            "No settings file found; pass --config or create ./{CONFIG_FILE_STEM}.toml"
        )
    }

    /// Load settings from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML settings: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON settings: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML settings: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse settings file: {}", path.display())),
        }
    }

    /// Checks required fields are non-blank and both URLs are absolute.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        let mut errors = validate_settings_map(&self.as_map());

        for (key, value) in [("go_server_url", &self.go_server_url), ("api_url", &self.api_url)] {
            if value.trim().is_empty() {
                continue;
            }
            if let Err(e) = Url::parse(value.trim()) {
                errors.push(ValidationError {
                    key: key.to_string(),
                    message: format!("'{value}' is not a valid URL: {e}"),
                });
            }
        }

        if self.request_timeout_secs == 0 {
            errors.push(ValidationError {
                key: "request_timeout_secs".to_string(),
                message: "Request timeout must be at least one second.".to_string(),
            });
        }

        errors
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            return Ok(());
        }

        Err(NotifierError::Config(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The settings as the flat key/value map a host form submits.
    pub fn as_map(&self) -> indexmap::IndexMap<String, String> {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();

        [
            ("go_server_url", self.go_server_url.clone()),
            ("api_url", self.api_url.clone()),
            ("api_user", self.api_user.clone()),
            ("api_key", self.api_key.clone()),
            ("room", self.room.clone()),
            (
                "passed_pipelines_whitelist",
                optional(&self.passed_pipelines_whitelist),
            ),
            (
                "failed_pipelines_whitelist",
                optional(&self.failed_pipelines_whitelist),
            ),
            (
                "cancelled_pipelines_whitelist",
                optional(&self.cancelled_pipelines_whitelist),
            ),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("go_server_url", &self.go_server_url)
            .field("api_url", &self.api_url)
            .field("api_user", &self.api_user)
            .field("api_key", &"<redacted>")
            .field("room", &self.room)
            .field("passed_pipelines_whitelist", &self.passed_pipelines_whitelist)
            .field("failed_pipelines_whitelist", &self.failed_pipelines_whitelist)
            .field(
                "cancelled_pipelines_whitelist",
                &self.cancelled_pipelines_whitelist,
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
