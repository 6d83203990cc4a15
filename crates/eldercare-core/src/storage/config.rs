//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Reminder polling period, event lead time and de-duplication
//! - Platform notification settings
//! - Backend API location
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Longest accepted event lead time: one day.
pub const MAX_EVENT_LEAD_MINUTES: i64 = 24 * 60;

/// Reminder scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Minutes before an event's start at which its reminder fires.
    #[serde(default = "default_event_lead_minutes")]
    pub event_lead_minutes: i64,
    /// Fire each trigger once per day instead of on every matching tick.
    #[serde(default = "default_true")]
    pub dedupe: bool,
}

/// Platform notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_icon")]
    pub icon: String,
    /// Program used to show desktop notifications.
    #[serde(default = "default_command")]
    pub command: String,
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_interval_secs() -> u64 {
    60
}
fn default_event_lead_minutes() -> i64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_icon() -> String {
    "/logo.png".into()
}
fn default_command() -> String {
    "notify-send".into()
}
fn default_base_url() -> String {
    "http://localhost:8000/api".into()
}
fn default_timeout_secs() -> u64 {
    15
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            event_lead_minutes: default_event_lead_minutes(),
            dedupe: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            icon: default_icon(),
            command: default_command(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from `<data_dir>/config.toml`, writing defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                if let Err(e) = cfg.validate() {
                    tracing::warn!(path = %path.display(), error = %e, "using default event lead time");
                    cfg.reminders.event_lead_minutes = default_event_lead_minutes();
                }
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to `<data_dir>/config.toml`.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The caller decides when to save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check the values whose type does not bound them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lead = self.reminders.event_lead_minutes;
        if !(0..=MAX_EVENT_LEAD_MINUTES).contains(&lead) {
            return Err(ConfigError::InvalidValue {
                key: "reminders.event_lead_minutes".into(),
                message: format!("{lead} is outside 0..={MAX_EVENT_LEAD_MINUTES} minutes"),
            });
        }
        Ok(())
    }

    /// Polling period of the reminder scheduler, never shorter than one second.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.reminders.interval_secs.max(1))
    }

    /// Base URL of the backend; `ELDERCARE_API_URL` overrides the file.
    pub fn api_base_url(&self) -> String {
        std::env::var("ELDERCARE_API_URL").unwrap_or_else(|_| self.api.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.reminders.interval_secs, 60);
        assert!(parsed.reminders.dedupe);
        assert_eq!(parsed.notifications.icon, "/logo.png");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[reminders]\ninterval_secs = 10\n").unwrap();
        assert_eq!(parsed.reminders.interval_secs, 10);
        assert_eq!(parsed.reminders.event_lead_minutes, 30);
        assert_eq!(parsed.api.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reminders.dedupe").as_deref(), Some("true"));
        assert_eq!(cfg.get("reminders.interval_secs").as_deref(), Some("60"));
        assert_eq!(cfg.get("notifications.command").as_deref(), Some("notify-send"));
        assert!(cfg.get("reminders.missing_key").is_none());
        assert!(cfg.get("reminders").is_none());
    }

    #[test]
    fn set_updates_bool_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("reminders.dedupe", "false").unwrap();
        cfg.set("reminders.interval_secs", "30").unwrap();
        cfg.set("api.base_url", "https://api.example.org").unwrap();
        assert!(!cfg.reminders.dedupe);
        assert_eq!(cfg.reminders.interval_secs, 30);
        assert_eq!(cfg.api.base_url, "https://api.example.org");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("reminders.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("reminders.dedupe", "not_a_bool").is_err());
        assert!(cfg.set("reminders.interval_secs", "soon").is_err());
        assert!(cfg.reminders.dedupe);
    }

    #[test]
    fn set_rejects_event_lead_outside_one_day() {
        let mut cfg = Config::default();
        let err = cfg
            .set("reminders.event_lead_minutes", "9223372036854775807")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "reminders.event_lead_minutes"));
        assert!(cfg.set("reminders.event_lead_minutes", "-5").is_err());
        assert_eq!(cfg.reminders.event_lead_minutes, 30);

        cfg.set("reminders.event_lead_minutes", "1440").unwrap();
        assert_eq!(cfg.reminders.event_lead_minutes, 1440);
    }

    #[test]
    fn load_from_replaces_out_of_range_event_lead() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reminders]\nevent_lead_minutes = 100000\ninterval_secs = 5\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.reminders.event_lead_minutes, 30);
        assert_eq!(cfg.reminders.interval_secs, 5);
    }

    #[test]
    fn tick_interval_has_a_floor() {
        let mut cfg = Config::default();
        cfg.reminders.interval_secs = 0;
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.reminders.interval_secs, 60);
    }

    #[test]
    fn load_from_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reminders = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
