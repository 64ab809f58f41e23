//! Preference store
//!
//! A typed key/value wrapper persisted as a single JSON object in the app
//! data directory. Keys are ad hoc; reads coerce to typed defaults and
//! never error. `clear_defaults` drops the persisted file and re-registers
//! the shipped default set.

use crate::error::{MailframeError, MailframeResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Well-known preference keys
pub mod keys {
    /// Serialized main-window frame ("x y width height")
    pub const WINDOW_FRAME: &str = "windowFrame";
    /// User-agent override applied to the content WebView
    pub const USER_AGENT: &str = "userAgentString";
    /// Chat-panel display mode passed to the hosted page
    pub const HANGOUTS_MODE: &str = "hangoutsMode";
    /// Set after the first launch has re-registered shipped defaults
    pub const AFTER_FIRST_LAUNCH: &str = "afterFirstLaunch";
}

/// A Safari user agent the mail provider accepts without degrading the page
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Safari/605.1.15";

/// JSON-file-backed preference store
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    values: Map<String, Value>,
}

/// The shipped default set (re-registered by `clear_defaults`)
fn shipped_defaults() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert(
        keys::USER_AGENT.to_string(),
        Value::String(DEFAULT_USER_AGENT.to_string()),
    );
    defaults.insert(keys::AFTER_FIRST_LAUNCH.to_string(), Value::Bool(false));
    defaults
}

impl PrefStore {
    /// Load the store from the given path, registering shipped defaults
    /// underneath whatever is persisted. Missing or corrupt files yield
    /// the shipped defaults.
    pub fn load(path: &Path) -> Self {
        let mut values = shipped_defaults();

        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(Value::Object(stored)) = serde_json::from_str(&contents) {
                for (key, value) in stored {
                    values.insert(key, value);
                }
            } else {
                log::warn!("Preference file {} is malformed, using defaults", path.display());
            }
        }

        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    /// Get a string preference. Missing or non-string values yield `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get an integer preference, coercing numbers and numeric strings; 0 otherwise.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| {
                n.as_f64().map(|f| f as i64).unwrap_or(0)
            }),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Get a float preference, coercing numbers and numeric strings; 0.0 otherwise.
    pub fn get_float(&self, key: &str) -> f64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Get a boolean preference; anything but a JSON true is false.
    pub fn get_bool(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Set a string preference and persist immediately
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) -> MailframeResult<()> {
        self.values
            .insert(key.to_string(), Value::String(value.into()));
        self.save()
    }

    /// Set an integer preference and persist immediately
    pub fn set_int(&mut self, key: &str, value: i64) -> MailframeResult<()> {
        self.values.insert(key.to_string(), Value::from(value));
        self.save()
    }

    /// Set a float preference and persist immediately
    pub fn set_float(&mut self, key: &str, value: f64) -> MailframeResult<()> {
        self.values.insert(key.to_string(), Value::from(value));
        self.save()
    }

    /// Set a boolean preference and persist immediately
    pub fn set_bool(&mut self, key: &str, value: bool) -> MailframeResult<()> {
        self.values.insert(key.to_string(), Value::Bool(value));
        self.save()
    }

    /// Remove a preference and persist immediately
    pub fn remove(&mut self, key: &str) -> MailframeResult<()> {
        self.values.remove(key);
        self.save()
    }

    /// Reset to the shipped default set: the persisted file is removed and
    /// the defaults re-registered.
    pub fn clear_defaults(&mut self) -> MailframeResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        self.values = shipped_defaults();
        self.save()
    }

    /// Write the store to disk
    pub fn save(&self) -> MailframeResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&Value::Object(self.values.clone()))
            .map_err(|e| MailframeError::prefs(format!("Failed to serialize prefs: {}", e)))?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
