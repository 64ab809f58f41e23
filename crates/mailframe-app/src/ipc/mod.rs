//! IPC between the shell WebViews and the Rust backend
//!
//! The top bar, the settings page, and the console bridge inside the
//! content surface all post JSON messages over `window.ipc.postMessage`.
//! Messages are tagged with a `cmd` field and deserialized into
//! [`IpcMessage`].

use serde::Deserialize;

/// IPC message from JavaScript to Rust
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IpcMessage {
    // Top bar
    GoHome,
    Reload,
    OpenProject,
    OpenSettings,

    // Settings page
    CloseSettings,
    GetPrefs,
    SetUserAgent {
        value: String,
    },
    SetHangoutsMode {
        mode: String,
    },
    ResetPrefs,

    // Misc
    OpenExternal {
        url: String,
    },
    /// Forwarded console output from the hosted page
    Log {
        level: String,
        message: String,
    },
}

/// JavaScript bridge injected into shell WebViews. Exposes a `mailframe`
/// namespace over the raw `window.ipc.postMessage` channel.
pub const JS_BRIDGE: &str = r#"
(function() {
    window.mailframe = {
        // Top bar
        goHome: () => window.ipc.postMessage(JSON.stringify({ cmd: 'go_home' })),
        reload: () => window.ipc.postMessage(JSON.stringify({ cmd: 'reload' })),
        openProject: () => window.ipc.postMessage(JSON.stringify({ cmd: 'open_project' })),
        openSettings: () => window.ipc.postMessage(JSON.stringify({ cmd: 'open_settings' })),

        // Settings page
        closeSettings: () => window.ipc.postMessage(JSON.stringify({ cmd: 'close_settings' })),
        getPrefs: () => window.ipc.postMessage(JSON.stringify({ cmd: 'get_prefs' })),
        setUserAgent: (value) => window.ipc.postMessage(JSON.stringify({ cmd: 'set_user_agent', value })),
        setHangoutsMode: (mode) => window.ipc.postMessage(JSON.stringify({ cmd: 'set_hangouts_mode', mode })),
        resetPrefs: () => window.ipc.postMessage(JSON.stringify({ cmd: 'reset_prefs' })),

        // Misc
        openExternal: (url) => window.ipc.postMessage(JSON.stringify({ cmd: 'open_external', url })),
        log: (level, message) => window.ipc.postMessage(JSON.stringify({ cmd: 'log', level, message })),

        // Pushed from Rust via evaluate_script
        _receivePrefs: (prefs) => {
            if (window.onMailframePrefs) { window.onMailframePrefs(prefs); }
        }
    };
})();
"#;
