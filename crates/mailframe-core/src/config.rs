//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User data directory (preference file lives here)
    pub data_dir: PathBuf,

    /// Directory holding the injection payload files (tweaks.css/tweaks.js)
    pub asset_dir: PathBuf,

    /// URL loaded on startup and by the Home button
    pub home_url: String,

    /// URL opened in the system browser by the project-page button
    pub project_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mailframe"),
            asset_dir: default_asset_dir(),
            home_url: "https://mail.google.com/".to_string(),
            project_url: "https://github.com/mailframe/mailframe".to_string(),
        }
    }
}

impl AppConfig {
    /// Path to the preference file
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join("prefs.json")
    }
}

/// Resolve the asset directory: MAILFRAME_ASSETS wins, then `assets/` next
/// to the executable, then the working directory.
fn default_asset_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("MAILFRAME_ASSETS") {
        return PathBuf::from(dir);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            return parent.join("assets");
        }
    }

    PathBuf::from("assets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefs_path_under_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/mf-test"),
            ..AppConfig::default()
        };
        assert_eq!(config.prefs_path(), PathBuf::from("/tmp/mf-test/prefs.json"));
    }

    #[test]
    fn test_default_home_url_is_https() {
        let config = AppConfig::default();
        assert!(config.home_url.starts_with("https://"));
    }
}
