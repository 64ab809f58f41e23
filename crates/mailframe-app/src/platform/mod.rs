//! Platform abstraction layer
//!
//! Unified interface for the operations that differ across macOS, Windows,
//! and Linux: native menu setup (required for clipboard shortcuts on macOS)
//! and handing URLs to the system browser.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

use muda::{Menu, MenuId};
use tao::window::Window;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific error types
#[derive(Debug, Clone)]
pub enum PlatformError {
    /// Menu initialization failed
    MenuInitFailed(String),
    /// Failed to open external URL
    OpenExternalFailed(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::MenuInitFailed(msg) => write!(f, "Menu initialization failed: {}", msg),
            PlatformError::OpenExternalFailed(msg) => write!(f, "Failed to open external: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait for platform-specific operations
pub trait PlatformManager: Send + Sync {
    /// Initialize the native menu for the window
    ///
    /// On macOS, this is required for clipboard shortcuts (Cmd+C/V) to work.
    /// Returns the id of the quit item when the menu carries one, so the
    /// shell can route termination through the event loop and flush state
    /// before exiting.
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<Option<MenuId>>;

    /// Open a URL in the system's default browser
    fn open_external(&self, url: &str) -> PlatformResult<()>;

    /// Get the platform name for logging
    fn platform_name(&self) -> &'static str;
}

/// Get the platform manager for the current operating system
pub fn get_platform_manager() -> Box<dyn PlatformManager> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::MacOSPlatform::new())
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsPlatform::new())
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(linux::LinuxPlatform::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_manager_reports_a_name() {
        let platform = get_platform_manager();
        assert!(!platform.platform_name().is_empty());
    }
}
