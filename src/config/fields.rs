use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A single settings field definition, as rendered by the host's settings form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SettingsField {
    /// Field key (used in the settings map)
    pub key: &'static str,
    /// Human-readable label
    #[serde(rename = "display-name")]
    pub label: &'static str,
    /// Whether the field must be non-blank
    pub required: bool,
    /// Whether the value is a secret and must be masked
    pub secure: bool,
    #[serde(rename = "display-order")]
    pub display_order: u8,
}

/// All settings fields in display order.
pub const SETTINGS_FIELDS: &[SettingsField] = &[
    SettingsField::required("go_server_url", "Go Server URL", 0),
    SettingsField::required("api_url", "Rocketchat API URL", 1),
    SettingsField::required("api_user", "Rocketchat API User", 2),
    SettingsField {
        secure: true,
        ..SettingsField::required("api_key", "Rocketchat API password", 3)
    },
    SettingsField::required("room", "Rocketchat room", 4),
    SettingsField::optional("passed_pipelines_whitelist", "Notify about passed pipelines", 5),
    SettingsField::optional("failed_pipelines_whitelist", "Notify about failed pipelines", 6),
    SettingsField::optional(
        "cancelled_pipelines_whitelist",
        "Notify about cancelled pipelines",
        7,
    ),
];

impl SettingsField {
    const fn required(key: &'static str, label: &'static str, display_order: u8) -> Self {
        Self {
            key,
            label,
            required: true,
            secure: false,
            display_order,
        }
    }

    const fn optional(key: &'static str, label: &'static str, display_order: u8) -> Self {
        Self {
            required: false,
            ..Self::required(key, label, display_order)
        }
    }

    pub fn validate(&self, value: Option<&str>) -> Option<ValidationError> {
        let blank = value.map_or(true, |v| v.trim().is_empty());
        (self.required && blank).then(|| ValidationError {
            key: self.key.to_string(),
            message: format!("{} must not be blank.", self.label),
        })
    }
}

/// A per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Validates a raw key/value settings map against [`SETTINGS_FIELDS`].
pub fn validate_settings_map(settings: &IndexMap<String, String>) -> Vec<ValidationError> {
    SETTINGS_FIELDS
        .iter()
        .filter_map(|field| field.validate(settings.get(field.key).map(String::as_str)))
        .collect()
}
