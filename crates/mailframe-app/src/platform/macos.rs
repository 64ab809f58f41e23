//! macOS platform implementation
//!
//! The native menu is required for clipboard shortcuts (Cmd+C/V) to work
//! inside the WebViews. Quit is a custom item rather than the predefined
//! terminate action: NSApp termination skips the window's close event, so
//! the shell routes Cmd+Q through the event loop to flush state first.

use super::{PlatformError, PlatformManager, PlatformResult};
use muda::accelerator::{Accelerator, Code, Modifiers};
use muda::{Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::process::Command;
use tao::window::Window;
use tracing::debug;

/// macOS platform manager
pub struct MacOSPlatform;

impl MacOSPlatform {
    pub fn new() -> Self {
        Self
    }

    /// Create the standard macOS application menu. Returns the id of the
    /// quit item for event-loop routing.
    fn create_app_menu(&self, menu: &Menu) -> PlatformResult<MenuId> {
        let app_menu = Submenu::new("Mailframe", true);

        app_menu
            .append(&PredefinedMenuItem::about(Some("About Mailframe"), None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add About: {}", e)))?;

        app_menu
            .append(&PredefinedMenuItem::separator())
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add separator: {}", e)))?;

        app_menu
            .append(&PredefinedMenuItem::hide(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Hide: {}", e)))?;

        app_menu
            .append(&PredefinedMenuItem::hide_others(None))
            .map_err(|e| {
                PlatformError::MenuInitFailed(format!("Failed to add Hide Others: {}", e))
            })?;

        app_menu
            .append(&PredefinedMenuItem::show_all(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Show All: {}", e)))?;

        app_menu
            .append(&PredefinedMenuItem::separator())
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add separator: {}", e)))?;

        let quit = MenuItem::new(
            "Quit Mailframe",
            true,
            Some(Accelerator::new(Some(Modifiers::META), Code::KeyQ)),
        );
        app_menu
            .append(&quit)
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Quit: {}", e)))?;

        menu.append(&app_menu)
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to append app menu: {}", e)))?;

        Ok(quit.id().clone())
    }

    /// Create the Edit menu with clipboard operations
    fn create_edit_menu(&self, menu: &Menu) -> PlatformResult<()> {
        let edit_menu = Submenu::new("Edit", true);

        edit_menu
            .append(&PredefinedMenuItem::undo(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Undo: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::redo(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Redo: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::separator())
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add separator: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::cut(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Cut: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::copy(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Copy: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::paste(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Paste: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::select_all(None))
            .map_err(|e| {
                PlatformError::MenuInitFailed(format!("Failed to add Select All: {}", e))
            })?;

        menu.append(&edit_menu)
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to append edit menu: {}", e)))?;

        Ok(())
    }
}

impl Default for MacOSPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for MacOSPlatform {
    fn initialize_menu(&self, _window: &Window, menu: &Menu) -> PlatformResult<Option<MenuId>> {
        let quit_id = self.create_app_menu(menu)?;
        self.create_edit_menu(menu)?;

        // Initialize the menu for the NSApp
        menu.init_for_nsapp();

        debug!("macOS menu initialized");
        Ok(Some(quit_id))
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        Command::new("open")
            .arg(url)
            .spawn()
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))?;

        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "macOS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_platform_name() {
        assert_eq!(MacOSPlatform::new().platform_name(), "macOS");
    }
}
