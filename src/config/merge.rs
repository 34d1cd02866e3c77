//! Forgiving merge of a persisted configuration document against defaults.
//!
//! Every field is read on its own: missing fields fall back to their default
//! silently, invalid ones fall back with a warning naming the discarded value.

use super::types::{AppConfig, ConfigFile, LOG_LEVELS, UserConfig};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Field reader over one section (`user`, `app`) of the document
struct Section<'a> {
    name: &'static str,
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Section<'a> {
    fn new(name: &'static str, root: &'a Value) -> Self {
        let fields = match root.get(name) {
            Some(Value::Object(map)) => Some(map),
            Some(Value::Null) | None => None,
            Some(other) => {
                warn!(
                    section = name,
                    value = %other,
                    "Configuration section is not an object, using defaults"
                );
                None
            }
        };
        Self { name, fields }
    }

    fn field<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.fields.and_then(|m| m.get(key)) {
            None | Some(Value::Null) => default,
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    self.discard(key, value, &e.to_string());
                    default
                }
            },
        }
    }

    fn discard(&self, key: &str, value: &Value, reason: &str) {
        warn!(
            section = self.name,
            field = key,
            value = %value,
            "Discarding invalid configuration value, using default: {reason}"
        );
    }
}

/// Merge a parsed configuration document against `defaults`
pub(super) fn merge_config(document: &Value, defaults: ConfigFile) -> ConfigFile {
    let ConfigFile {
        user: user_defaults,
        app: app_defaults,
        last_updated,
    } = defaults;

    let last_updated = match document.get("lastUpdated") {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|e| {
                warn!(field = "lastUpdated", value = %s, "Invalid timestamp: {e}");
                last_updated
            }),
        _ => last_updated,
    };

    ConfigFile {
        user: merge_user(&Section::new("user", document), user_defaults),
        app: merge_app(&Section::new("app", document), app_defaults),
        last_updated,
    }
}

fn merge_user(section: &Section<'_>, defaults: UserConfig) -> UserConfig {
    UserConfig {
        api_key: section
            .field::<Option<String>>("apiKey", defaults.api_key)
            .filter(|k| !k.trim().is_empty()),
        default_output_dir: non_empty_path(section, "defaultOutputDir", defaults.default_output_dir),
        image_quality: section.field("imageQuality", defaults.image_quality),
        language: non_empty_string(section, "language", defaults.language),
        include_adult: section.field("includeAdult", defaults.include_adult),
        download_images: section.field("downloadImages", defaults.download_images),
        max_image_size: section.field("maxImageSize", defaults.max_image_size),
    }
}

fn merge_app(section: &Section<'_>, defaults: AppConfig) -> AppConfig {
    let log_level: String = section.field("logLevel", defaults.log_level.clone());
    let log_level = if LOG_LEVELS.contains(&log_level.to_lowercase().as_str()) {
        log_level.to_lowercase()
    } else {
        section.discard("logLevel", &Value::String(log_level), "unknown log level");
        defaults.log_level
    };

    AppConfig {
        version: non_empty_string(section, "version", defaults.version),
        config_dir: non_empty_path(section, "configDir", defaults.config_dir),
        output_dir: non_empty_path(section, "outputDir", defaults.output_dir),
        temp_dir: non_empty_path(section, "tempDir", defaults.temp_dir),
        log_level,
    }
}

fn non_empty_string(section: &Section<'_>, key: &str, default: String) -> String {
    let value: String = section.field(key, default.clone());
    if value.trim().is_empty() {
        section.discard(key, &Value::String(value), "empty value");
        default
    } else {
        value
    }
}

fn non_empty_path(
    section: &Section<'_>,
    key: &str,
    default: std::path::PathBuf,
) -> std::path::PathBuf {
    let value: std::path::PathBuf = section.field(key, default.clone());
    if value.as_os_str().is_empty() {
        section.discard(key, &Value::String(String::new()), "empty path");
        default
    } else {
        value
    }
}
