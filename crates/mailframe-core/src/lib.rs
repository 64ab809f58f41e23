//! Mailframe Core Library
//!
//! This crate provides shared types, errors, configuration, the preference
//! store, and the window-geometry model for Mailframe.

pub mod config;
pub mod error;
pub mod geometry;
pub mod prefs;

pub use config::AppConfig;
pub use error::{MailframeError, MailframeResult};
pub use geometry::{DisplayBounds, WindowFrame};
pub use prefs::PrefStore;
