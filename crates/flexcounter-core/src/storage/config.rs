//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default countdown length
//! - Default label for saved sessions
//! - How overtime readings are displayed
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::timer::parse_duration;

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Countdown used when `start` is given no duration, e.g. "25:00".
    #[serde(default = "default_duration")]
    pub default_duration: String,
}

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_label")]
    pub default_label: String,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Prefix overtime readings with '-'.
    #[serde(default = "default_true")]
    pub show_overtime_sign: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_duration() -> String {
    "25:00".into()
}
fn default_label() -> String {
    "session".into()
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_label: default_label(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_overtime_sign: true,
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
        key.split('.').try_fold(root, |current, part| current.get(part))
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || ConfigError::UnknownKey(key.to_string());

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?
                    .into(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot overwrite a whole section".into()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory or write and return the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if the key is
    /// unknown or the new value does not validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), CoreError> {
        parse_duration(&self.timer.default_duration).map_err(|e| ConfigError::InvalidValue {
            key: "timer.default_duration".into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Default countdown in seconds.
    pub fn default_target_secs(&self) -> Result<u64, CoreError> {
        parse_duration(&self.timer.default_duration)
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
        assert_eq!(parsed.timer.default_duration, "25:00");
        assert!(parsed.display.show_overtime_sign);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[ledger]\ndefault_label = \"run\"\n").unwrap();
        assert_eq!(parsed.ledger.default_label, "run");
        assert_eq!(parsed.timer.default_duration, "25:00");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.default_duration").as_deref(), Some("25:00"));
        assert_eq!(cfg.get("ledger.default_label").as_deref(), Some("session"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("display.show_overtime_sign", "false").unwrap();
        cfg.set("timer.default_duration", "1:30:00").unwrap();
        assert!(!cfg.display.show_overtime_sign);
        assert_eq!(cfg.default_target_secs().unwrap(), 5400);
    }

    #[test]
    fn tick_period_is_not_configurable() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.tick_interval_ms", "250"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));

        // Files written by older builds still load.
        let parsed: Config =
            toml::from_str("[timer]\ndefault_duration = \"10:00\"\ntick_interval_ms = 250\n").unwrap();
        assert_eq!(parsed.default_target_secs().unwrap(), 600);
        assert!(parsed.get("timer.tick_interval_ms").is_none());
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.set("timer", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_values_without_changing_config() {
        let mut cfg = Config::default();
        assert!(cfg.set("display.show_overtime_sign", "maybe").is_err());
        assert!(cfg.set("timer.default_duration", "-5").is_err());
        assert_eq!(cfg.timer.default_duration, "25:00");
        assert!(cfg.display.show_overtime_sign);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.ledger.default_label, "session");

        let mut changed = cfg.clone();
        changed.set("ledger.default_label", "sprint").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().ledger.default_label, "sprint");
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = 5 = 6").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
