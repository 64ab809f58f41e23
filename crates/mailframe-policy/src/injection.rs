//! Injection payloads applied to the hosted page
//!
//! Two kinds of payload exist. Built-in scripts (title pinning, inspector
//! suppression, the console-log bridge) are intrinsic shell behavior and
//! compiled in. The provider-markup tweaks (`tweaks.css`, `tweaks.js`) are
//! coupled to the third party's current class names, so they live in a
//! swappable data artifact loaded by path: markup drift needs a data
//! update, not a rebuild. A missing or unreadable file silently disables
//! that payload.

use std::fs;
use std::path::Path;

/// Title asserted over whatever the hosted page sets
pub const FORCED_TITLE: &str = "Mailframe";

/// Pins the document title and re-asserts it against programmatic changes.
/// Applied after every completed load.
pub const TITLE_PIN: &str = r#"
(function() {
    var FORCED = 'Mailframe';
    if (window.__mailframeTitlePin) { document.title = FORCED; return; }
    window.__mailframeTitlePin = true;
    document.title = FORCED;
    var titleEl = document.querySelector('title');
    if (!titleEl || !window.MutationObserver) { return; }
    new MutationObserver(function() {
        if (document.title !== FORCED) { document.title = FORCED; }
    }).observe(titleEl, { childList: true, characterData: true, subtree: true });
})();
"#;

/// Disables the context menu and the common inspector key combinations.
/// Best effort only; the engine's devtools remain reachable elsewhere.
pub const INSPECTOR_GUARD: &str = r#"
(function() {
    if (window.__mailframeGuard) { return; }
    window.__mailframeGuard = true;
    document.addEventListener('contextmenu', function(e) { e.preventDefault(); }, true);
    document.addEventListener('keydown', function(e) {
        var key = (e.key || '').toUpperCase();
        var combo = (e.ctrlKey || e.metaKey) && e.shiftKey && (key === 'I' || key === 'J' || key === 'C');
        var viewSource = (e.ctrlKey || e.metaKey) && key === 'U';
        var macInspector = e.metaKey && e.altKey && key === 'I';
        if (key === 'F12' || combo || viewSource || macInspector) {
            e.preventDefault();
            e.stopPropagation();
        }
    }, true);
})();
"#;

/// Forwards the hosted page's console.log calls to the host log sink,
/// one-way. Registered as an initialization script so it is in place
/// before the page's own scripts run.
pub const CONSOLE_BRIDGE: &str = r#"
(function() {
    var native = console.log.bind(console);
    console.log = function() {
        var parts = [];
        for (var i = 0; i < arguments.length; i++) {
            var a = arguments[i];
            try { parts.push(typeof a === 'string' ? a : JSON.stringify(a)); }
            catch (e) { parts.push(String(a)); }
        }
        try {
            window.ipc.postMessage(JSON.stringify({ cmd: 'log', level: 'info', message: parts.join(' ') }));
        } catch (e) {}
        native.apply(null, arguments);
    };
})();
"#;

/// Invoke the hosted page's `updateHangoutsMode` global with the stored
/// display-mode value. The function is an unversioned internal of the
/// provider's page; its absence is a silent no-op.
pub fn hangouts_mode_script(mode: &str) -> String {
    // Numeric modes are interpolated raw (the page expects a number);
    // anything else rides as a JSON string literal.
    let argument = if mode.trim().parse::<i64>().is_ok() {
        mode.trim().to_string()
    } else {
        serde_json::Value::String(mode.to_string()).to_string()
    };
    format!(
        "if (typeof updateHangoutsMode === 'function') {{ updateHangoutsMode({}); }}",
        argument
    )
}

/// The swappable provider-markup artifact
#[derive(Debug, Clone, Default)]
pub struct InjectionAssets {
    /// Contents of tweaks.css, if present
    pub css: Option<String>,
    /// Contents of tweaks.js, if present
    pub js: Option<String>,
}

impl InjectionAssets {
    /// Load tweaks.css / tweaks.js from the asset directory. Missing or
    /// unreadable files disable the payload, nothing more.
    pub fn load(dir: &Path) -> Self {
        let css = read_payload(&dir.join("tweaks.css"));
        let js = read_payload(&dir.join("tweaks.js"));

        log::info!(
            "Injection assets from {}: css={}, js={}",
            dir.display(),
            css.is_some(),
            js.is_some()
        );

        Self { css, js }
    }

    /// Scripts to evaluate after every completed page load, in order:
    /// style payload, provider tweaks, inspector guard, title pin.
    pub fn post_load_scripts(&self, hangouts_mode: Option<&str>) -> Vec<String> {
        let mut scripts = Vec::new();

        if let Some(css) = &self.css {
            scripts.push(style_apply_script(css));
        }
        if let Some(js) = &self.js {
            scripts.push(js.clone());
        }
        scripts.push(INSPECTOR_GUARD.to_string());
        scripts.push(TITLE_PIN.to_string());
        if let Some(mode) = hangouts_mode {
            scripts.push(hangouts_mode_script(mode));
        }

        scripts
    }
}

/// Wrap a style sheet in a script that installs (or refreshes) a single
/// <style> element. The sheet is embedded as a JSON string literal so any
/// CSS content is safe to carry.
fn style_apply_script(css: &str) -> String {
    let literal = serde_json::Value::String(css.to_string()).to_string();
    format!(
        r#"(function() {{
    var id = 'mailframe-tweaks';
    var el = document.getElementById(id);
    if (!el) {{
        el = document.createElement('style');
        el.id = id;
        (document.head || document.documentElement).appendChild(el);
    }}
    el.textContent = {};
}})();"#,
        literal
    )
}

fn read_payload(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => Some(contents),
        Ok(_) => None,
        Err(e) => {
            if path.exists() {
                log::warn!("Unreadable injection payload {}: {}", path.display(), e);
            }
            None
        }
    }
}
