//! Linux platform implementation
//!
//! WebKitGTK handles clipboard shortcuts without a native menu, so menu
//! setup is a no-op here.

use super::{PlatformError, PlatformManager, PlatformResult};
use muda::{Menu, MenuId};
use std::process::Command;
use tao::window::Window;
use tracing::debug;

/// Linux platform manager
pub struct LinuxPlatform;

impl LinuxPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for LinuxPlatform {
    fn initialize_menu(&self, _window: &Window, _menu: &Menu) -> PlatformResult<Option<MenuId>> {
        debug!("Linux menu setup skipped (not required for clipboard)");
        Ok(None)
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        Command::new("xdg-open")
            .arg(url)
            .spawn()
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))?;

        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "Linux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_platform_name() {
        assert_eq!(LinuxPlatform::new().platform_name(), "Linux");
    }
}
