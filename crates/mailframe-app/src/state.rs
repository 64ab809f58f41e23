//! Application state management
//!
//! Central state for the Mailframe shell: the preference store, the
//! navigation policy, loaded injection assets, the geometry save debounce,
//! and the page-load watchdog.

use mailframe_core::config::AppConfig;
use mailframe_core::geometry::WindowFrame;
use mailframe_core::prefs::{keys, PrefStore, DEFAULT_USER_AGENT};
use mailframe_core::MailframeResult;
use mailframe_policy::injection::InjectionAssets;
use mailframe_policy::NavigationPolicy;
use std::time::{Duration, Instant};

/// How long a frame change must sit unchanged before it is persisted
pub const FRAME_SAVE_DEBOUNCE: Duration = Duration::from_millis(200);

/// A page load that has not finished within this window is retried
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of watchdog-initiated reloads per load attempt
pub const MAX_LOAD_RETRIES: u32 = 2;

/// Watchdog over the content surface's page loads. A load that never
/// reaches Finished (hung network, a blank first paint) gets a bounded
/// number of reloads instead of hanging forever.
#[derive(Debug, Default)]
pub struct LoadWatchdog {
    pending_since: Option<Instant>,
    attempts: u32,
}

impl LoadWatchdog {
    /// A page load started
    pub fn began(&mut self) {
        self.pending_since = Some(Instant::now());
    }

    /// The pending load finished; retries reset
    pub fn finished(&mut self) {
        self.pending_since = None;
        self.attempts = 0;
    }

    /// Called on each watchdog tick. Returns true when the pending load
    /// has timed out and a retry is still available; the retry clock
    /// restarts from now.
    pub fn should_retry(&mut self) -> bool {
        let Some(since) = self.pending_since else {
            return false;
        };
        self.retry_due(since.elapsed())
    }

    fn retry_due(&mut self, pending_for: Duration) -> bool {
        if pending_for < LOAD_TIMEOUT {
            return false;
        }
        if self.attempts >= MAX_LOAD_RETRIES {
            tracing::warn!("Page load still pending after {} retries, giving up", self.attempts);
            self.pending_since = None;
            return false;
        }
        self.attempts += 1;
        self.pending_since = Some(Instant::now());
        true
    }
}

/// Central application state
pub struct AppState {
    /// Configuration
    pub config: AppConfig,

    /// Preference store (window frame, user agent, chat mode)
    pub prefs: PrefStore,

    /// Navigation gatekeeper for the content surface
    pub policy: NavigationPolicy,

    /// Injection payloads applied after each page load
    pub assets: InjectionAssets,

    /// Page-load watchdog
    pub watchdog: LoadWatchdog,

    /// Most recent unsaved window frame and when it was recorded
    pending_frame: Option<(WindowFrame, Instant)>,
}

impl AppState {
    /// Create the application state: load preferences (running the
    /// first-launch reset if needed), the navigation policy, and the
    /// injection assets.
    pub fn new(config: AppConfig) -> MailframeResult<Self> {
        std::fs::create_dir_all(&config.data_dir).ok();

        let mut prefs = PrefStore::load(&config.prefs_path());

        // First launch drops any stale persisted state and re-registers
        // the shipped defaults.
        if !prefs.get_bool(keys::AFTER_FIRST_LAUNCH) {
            tracing::info!("First launch, registering shipped defaults");
            prefs.clear_defaults()?;
            prefs.set_bool(keys::AFTER_FIRST_LAUNCH, true)?;
        }

        let policy = NavigationPolicy::new();
        let assets = InjectionAssets::load(&config.asset_dir);

        Ok(Self {
            config,
            prefs,
            policy,
            assets,
            watchdog: LoadWatchdog::default(),
            pending_frame: None,
        })
    }

    /// The user agent applied to the content surface
    pub fn user_agent(&self) -> String {
        self.prefs
            .get_string(keys::USER_AGENT)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// The stored chat-panel mode, if any
    pub fn hangouts_mode(&self) -> Option<String> {
        self.prefs.get_string(keys::HANGOUTS_MODE)
    }

    /// Record a window move/resize; persisted once the debounce elapses
    pub fn record_frame(&mut self, frame: WindowFrame) {
        self.pending_frame = Some((frame, Instant::now()));
    }

    /// Return the pending frame if it has sat unchanged long enough
    pub fn take_due_frame_save(&mut self) -> Option<WindowFrame> {
        match self.pending_frame {
            Some((frame, recorded)) if recorded.elapsed() >= FRAME_SAVE_DEBOUNCE => {
                self.pending_frame = None;
                Some(frame)
            }
            _ => None,
        }
    }

    /// Return the pending frame regardless of the debounce (shutdown path)
    pub fn take_pending_frame(&mut self) -> Option<WindowFrame> {
        self.pending_frame.take().map(|(frame, _)| frame)
    }

    /// Persist a window frame under the geometry preference key
    pub fn save_frame(&mut self, frame: &WindowFrame) -> MailframeResult<()> {
        self.prefs.set_string(keys::WINDOW_FRAME, frame.serialize())
    }

    /// Persist the window frame immediately, bypassing the debounce.
    /// Shutdown paths (window close, menu quit, loop teardown) call this so
    /// a move within the debounce window is not lost.
    pub fn flush_frame(&mut self, fallback: Option<WindowFrame>) -> MailframeResult<()> {
        match self.take_pending_frame().or(fallback) {
            Some(frame) => self.save_frame(&frame),
            None => Ok(()),
        }
    }

    /// Current preferences as a JSON object for the settings page
    pub fn prefs_snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "userAgentString": self.user_agent(),
            "hangoutsMode": self.hangouts_mode().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn test_config(dir: &Path) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            asset_dir: dir.join("assets"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_first_launch_marks_itself_done() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let state = AppState::new(config.clone()).unwrap();
        assert!(state.prefs.get_bool(keys::AFTER_FIRST_LAUNCH));
        assert_eq!(state.user_agent(), DEFAULT_USER_AGENT);

        // Second launch keeps user values instead of resetting
        drop(state);
        let mut state = AppState::new(config.clone()).unwrap();
        state
            .prefs
            .set_string(keys::USER_AGENT, "CustomAgent/2.0")
            .unwrap();
        drop(state);

        let state = AppState::new(config).unwrap();
        assert_eq!(state.user_agent(), "CustomAgent/2.0");
    }

    #[test]
    fn test_first_launch_drops_stale_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        // Simulate leftovers from an earlier install that never completed
        // the first-launch handshake
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(
            config.prefs_path(),
            r#"{"hangoutsMode":"2","windowFrame":"0 0 100 100"}"#,
        )
        .unwrap();

        let state = AppState::new(config).unwrap();
        assert_eq!(state.hangouts_mode(), None);
        assert_eq!(state.prefs.get_string(keys::WINDOW_FRAME), None);
    }

    #[test]
    fn test_frame_save_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(test_config(dir.path())).unwrap();

        let frame = WindowFrame {
            x: 10.0,
            y: 20.0,
            width: 1200.0,
            height: 800.0,
        };

        state.record_frame(frame);
        // Too fresh to persist
        assert_eq!(state.take_due_frame_save(), None);

        std::thread::sleep(FRAME_SAVE_DEBOUNCE + Duration::from_millis(20));
        assert_eq!(state.take_due_frame_save(), Some(frame));
        // Taken exactly once
        assert_eq!(state.take_due_frame_save(), None);
    }

    #[test]
    fn test_pending_frame_flushes_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(test_config(dir.path())).unwrap();

        let frame = WindowFrame {
            x: 5.0,
            y: 5.0,
            width: 900.0,
            height: 700.0,
        };
        state.record_frame(frame);

        // No debounce wait on the shutdown path
        assert_eq!(state.take_pending_frame(), Some(frame));

        state.save_frame(&frame).unwrap();
        assert_eq!(
            state.prefs.get_string(keys::WINDOW_FRAME).as_deref(),
            Some("5 5 900 700")
        );
    }

    #[test]
    fn test_flush_frame_bypasses_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(test_config(dir.path())).unwrap();

        let frame = WindowFrame {
            x: 30.0,
            y: 40.0,
            width: 1100.0,
            height: 750.0,
        };
        state.record_frame(frame);

        // Quitting right after a move must not lose the pending frame
        state.flush_frame(None).unwrap();
        assert_eq!(
            state.prefs.get_string(keys::WINDOW_FRAME).as_deref(),
            Some("30 40 1100 750")
        );

        // Nothing pending falls back to the frame read off the window
        let fallback = WindowFrame {
            x: 1.0,
            y: 2.0,
            width: 900.0,
            height: 650.0,
        };
        state.flush_frame(Some(fallback)).unwrap();
        assert_eq!(
            state.prefs.get_string(keys::WINDOW_FRAME).as_deref(),
            Some("1 2 900 650")
        );
    }

    #[test]
    fn test_cleared_chat_mode_reads_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(test_config(dir.path())).unwrap();

        state.prefs.set_string(keys::HANGOUTS_MODE, "1").unwrap();
        assert_eq!(state.hangouts_mode().as_deref(), Some("1"));

        state.prefs.remove(keys::HANGOUTS_MODE).unwrap();
        assert_eq!(state.hangouts_mode(), None);
        assert_eq!(state.prefs_snapshot()["hangoutsMode"], "");
    }

    #[test]
    fn test_watchdog_retries_are_bounded() {
        let mut watchdog = LoadWatchdog::default();
        let past_timeout = LOAD_TIMEOUT + Duration::from_secs(1);

        // Nothing pending, nothing to retry
        assert!(!watchdog.should_retry());

        // A fresh load is not retried before the timeout
        watchdog.began();
        assert!(!watchdog.should_retry());
        assert!(!watchdog.retry_due(Duration::from_secs(1)));

        for attempt in 1..=MAX_LOAD_RETRIES {
            assert!(watchdog.retry_due(past_timeout), "attempt {attempt}");
        }

        // Retries exhausted
        assert!(!watchdog.retry_due(past_timeout));

        // A finished load resets the budget
        watchdog.began();
        watchdog.finished();
        watchdog.began();
        assert!(watchdog.retry_due(past_timeout));
    }

    #[test]
    fn test_prefs_snapshot_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(test_config(dir.path())).unwrap();
        state.prefs.set_string(keys::HANGOUTS_MODE, "1").unwrap();

        let snapshot = state.prefs_snapshot();
        assert_eq!(snapshot["userAgentString"], DEFAULT_USER_AGENT);
        assert_eq!(snapshot["hangoutsMode"], "1");
    }
}
