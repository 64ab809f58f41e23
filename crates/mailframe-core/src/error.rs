//! Error types for Mailframe

use thiserror::Error;

/// Result type alias for Mailframe operations
pub type MailframeResult<T> = Result<T, MailframeError>;

/// Main error type for Mailframe
#[derive(Error, Debug)]
pub enum MailframeError {
    #[error("Preference error: {0}")]
    Prefs(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebView error: {0}")]
    WebView(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MailframeError {
    /// Create a new preference error
    pub fn prefs(msg: impl Into<String>) -> Self {
        Self::Prefs(msg.into())
    }

    /// Create a new geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new WebView error
    pub fn webview(msg: impl Into<String>) -> Self {
        Self::WebView(msg.into())
    }
}
