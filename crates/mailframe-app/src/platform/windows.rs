//! Windows platform implementation
//!
//! WebView2 handles clipboard shortcuts itself, so the menu is optional
//! here; it is still attached for a consistent surface. Alt+F4 delivers a
//! normal close event, so no quit item needs event-loop routing.

use super::{PlatformError, PlatformManager, PlatformResult};
use muda::{Menu, MenuId};
use std::process::Command;
use tao::window::Window;
use tracing::debug;

/// Windows platform manager
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for WindowsPlatform {
    #[allow(unused_variables)]
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<Option<MenuId>> {
        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            unsafe {
                menu.init_for_hwnd(window.hwnd() as _)
                    .map_err(|e| PlatformError::MenuInitFailed(format!("HWND init failed: {}", e)))?;
            }
        }

        debug!("Windows menu initialized");
        Ok(None)
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        // The empty "" after start is the window title, required for URLs
        // with special characters
        Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))?;

        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "Windows"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_platform_name() {
        assert_eq!(WindowsPlatform::new().platform_name(), "Windows");
    }
}
