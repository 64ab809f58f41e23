//! Mailframe - Main Application Entry Point
//!
//! A two-WebView shell around the hosted mail page:
//! - Top bar WebView: fixed-height strip with home / reload / project /
//!   settings controls
//! - Content WebView: the mail page itself, below the top bar
//!
//! A separate settings window is created on demand and hidden (not
//! destroyed) when closed.

mod ipc;
mod platform;
mod state;

use ipc::{IpcMessage, JS_BRIDGE};
use mailframe_core::config::AppConfig;
use mailframe_core::geometry::{DisplayBounds, WindowFrame, MIN_HEIGHT, MIN_WIDTH};
use mailframe_core::prefs::keys;
use mailframe_policy::injection::{self, CONSOLE_BRIDGE, FORCED_TITLE, INSPECTOR_GUARD};
use mailframe_policy::{NavigationDecision, NavigationKind, NavigationRequest, PopupDecision};
use platform::{get_platform_manager, PlatformManager};
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tao::{
    dpi::{LogicalPosition, LogicalSize},
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
    window::{Window, WindowBuilder},
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use url::Url;
use wry::{Rect, WebView, WebViewBuilder};

/// Height of the top bar strip in logical pixels
const TOPBAR_HEIGHT: f64 = 48.0;

/// The HTML content for the top bar
const TOPBAR_HTML: &str = include_str!("ui/topbar.html");
/// The HTML content for the settings window
const SETTINGS_HTML: &str = include_str!("ui/settings.html");

/// User events for cross-WebView communication
#[derive(Debug, Clone)]
enum UserEvent {
    GoHome,
    Reload,
    Navigate(String),
    OpenProject,
    OpenExternal(String),
    OpenSettings,
    CloseSettings,
    SetUserAgent(String),
    SetHangoutsMode(String),
    ResetPrefs,
    SyncPrefs,
    LoadStarted,
    LoadFinished(String),
    // Menu quit routed through the loop so shutdown flushes state
    Quit,
    // Ticker events
    GeometryTick,
    WatchdogTick,
    // Forwarded console output from the hosted page
    PageLog { level: String, message: String },
}

/// Translate a parsed IPC message into a user event
fn forward_ipc(proxy: &EventLoopProxy<UserEvent>, msg: IpcMessage) {
    let event = match msg {
        IpcMessage::GoHome => UserEvent::GoHome,
        IpcMessage::Reload => UserEvent::Reload,
        IpcMessage::OpenProject => UserEvent::OpenProject,
        IpcMessage::OpenSettings => UserEvent::OpenSettings,
        IpcMessage::CloseSettings => UserEvent::CloseSettings,
        IpcMessage::GetPrefs => UserEvent::SyncPrefs,
        IpcMessage::SetUserAgent { value } => UserEvent::SetUserAgent(value),
        IpcMessage::SetHangoutsMode { mode } => UserEvent::SetHangoutsMode(mode),
        IpcMessage::ResetPrefs => UserEvent::ResetPrefs,
        IpcMessage::OpenExternal { url } => UserEvent::OpenExternal(url),
        IpcMessage::Log { level, message } => UserEvent::PageLog { level, message },
    };
    let _ = proxy.send_event(event);
}

/// A navigation that arrives while a load is in flight is a redirect hop,
/// not a user click. A click landing mid-load is misclassified as a hop,
/// which fails open to the default-permissive rule.
fn navigation_kind(load_in_flight: bool) -> NavigationKind {
    if load_in_flight {
        NavigationKind::Other
    } else {
        NavigationKind::LinkActivated
    }
}

/// Size both WebViews to the window: top bar strip on top, content below
fn apply_layout(window: &Window, topbar: &WebView, content: &WebView) {
    let size = window.inner_size();
    let scale = window.scale_factor();
    let width = size.width as f64 / scale;
    let height = size.height as f64 / scale;

    let _ = topbar.set_bounds(Rect {
        position: LogicalPosition::new(0.0, 0.0).into(),
        size: LogicalSize::new(width, TOPBAR_HEIGHT).into(),
    });
    let _ = content.set_bounds(Rect {
        position: LogicalPosition::new(0.0, TOPBAR_HEIGHT).into(),
        size: LogicalSize::new(width, (height - TOPBAR_HEIGHT).max(0.0)).into(),
    });
}

/// The main window's current frame in logical pixels
fn current_frame(window: &Window) -> Option<WindowFrame> {
    let scale = window.scale_factor();
    let position = window.outer_position().ok()?.to_logical::<f64>(scale);
    let size = window.inner_size().to_logical::<f64>(scale);
    Some(WindowFrame {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
    })
}

fn main() {
    // Initialize logging with log compatibility (library crates use log)
    tracing_log::LogTracer::init().expect("Failed to set log tracer");
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    info!("Starting Mailframe...");

    let config = AppConfig::default();
    let home_url = config.home_url.clone();

    let state = match AppState::new(config) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize app state: {}", e);
            panic!("Failed to initialize app state: {}", e);
        }
    };

    info!("Application state initialized");

    // Create the event loop with custom user events
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // Restore the window frame against the attached displays
    let displays: Vec<DisplayBounds> = event_loop
        .available_monitors()
        .map(|monitor| {
            let scale = monitor.scale_factor();
            let position = monitor.position().to_logical::<f64>(scale);
            let size = monitor.size().to_logical::<f64>(scale);
            DisplayBounds {
                x: position.x,
                y: position.y,
                width: size.width,
                height: size.height,
            }
        })
        .collect();

    let stored_frame = state
        .lock()
        .unwrap()
        .prefs
        .get_string(keys::WINDOW_FRAME);
    let frame = WindowFrame::restore(stored_frame.as_deref(), &displays);
    info!("Restoring window frame: {}", frame.serialize());

    let window = WindowBuilder::new()
        .with_title(FORCED_TITLE)
        .with_position(LogicalPosition::new(frame.x, frame.y))
        .with_inner_size(LogicalSize::new(frame.width, frame.height))
        .with_min_inner_size(LogicalSize::new(MIN_WIDTH, MIN_HEIGHT))
        .build(&event_loop)
        .expect("Failed to create window");

    let main_window_id = window.id();

    // Initialize platform manager and menu
    let platform: Arc<dyn PlatformManager> = Arc::from(get_platform_manager());
    info!("Platform: {}", platform.platform_name());

    // Native menu is required for clipboard shortcuts on macOS. The quit
    // item is routed through the event loop (NSApp termination would skip
    // CloseRequested and drop a pending geometry save).
    let menu_bar = muda::Menu::new();
    let quit_menu_id = match platform.initialize_menu(&window, &menu_bar) {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to initialize menu: {}", e);
            None
        }
    };

    // The handler is stored in a static, so the proxy rides in a Mutex
    let menu_proxy = Mutex::new(proxy.clone());
    muda::MenuEvent::set_event_handler(Some(move |event: muda::MenuEvent| {
        if Some(event.id()) == quit_menu_id.as_ref() {
            if let Ok(menu_proxy) = menu_proxy.lock() {
                let _ = menu_proxy.send_event(UserEvent::Quit);
            }
        }
    }));

    info!("Window created successfully");

    // Initial WebView bounds
    let window_size = window.inner_size();
    let scale_factor = window.scale_factor();
    let width = window_size.width as f64 / scale_factor;
    let height = window_size.height as f64 / scale_factor;

    let topbar_bounds = Rect {
        position: LogicalPosition::new(0.0, 0.0).into(),
        size: LogicalSize::new(width, TOPBAR_HEIGHT).into(),
    };
    let content_bounds = Rect {
        position: LogicalPosition::new(0.0, TOPBAR_HEIGHT).into(),
        size: LogicalSize::new(width, (height - TOPBAR_HEIGHT).max(0.0)).into(),
    };

    // === TOP BAR WEBVIEW ===
    let topbar_proxy = proxy.clone();
    let topbar_webview = WebViewBuilder::new()
        .with_html(TOPBAR_HTML)
        .with_devtools(cfg!(debug_assertions))
        .with_clipboard(true)
        .with_initialization_script(JS_BRIDGE)
        .with_bounds(topbar_bounds)
        .with_ipc_handler(move |message| {
            match serde_json::from_str::<IpcMessage>(message.body()) {
                Ok(msg) => forward_ipc(&topbar_proxy, msg),
                Err(e) => error!("Failed to parse top bar IPC: {}", e),
            }
        })
        .build_as_child(&window)
        .expect("Failed to create top bar WebView");

    info!("Top bar WebView created ({}px strip)", TOPBAR_HEIGHT);

    // === CONTENT WEBVIEW ===
    let user_agent = state.lock().unwrap().user_agent();
    let nav_policy = state.lock().unwrap().policy.clone();
    let popup_policy = nav_policy.clone();
    let nav_proxy = proxy.clone();
    let popup_proxy = proxy.clone();
    let load_proxy = proxy.clone();
    let content_ipc_proxy = proxy.clone();

    // Set between Started and Finished; read by the navigation handler to
    // tell redirect hops apart from link clicks.
    let load_in_flight = Arc::new(AtomicBool::new(false));
    let nav_load_in_flight = Arc::clone(&load_in_flight);
    let page_load_in_flight = Arc::clone(&load_in_flight);

    let content_webview = WebViewBuilder::new()
        .with_url(&home_url)
        .with_user_agent(&user_agent)
        .with_devtools(cfg!(debug_assertions))
        .with_clipboard(true)
        .with_initialization_script(CONSOLE_BRIDGE)
        .with_initialization_script(INSPECTOR_GUARD)
        .with_bounds(content_bounds)
        .with_ipc_handler(move |message| {
            // The content surface only speaks through the console bridge
            match serde_json::from_str::<IpcMessage>(message.body()) {
                Ok(IpcMessage::Log { level, message }) => {
                    let _ = content_ipc_proxy.send_event(UserEvent::PageLog { level, message });
                }
                Ok(msg) => warn!("Content surface sent unexpected IPC: {:?}", msg),
                Err(e) => error!("Failed to parse content IPC: {}", e),
            }
        })
        .with_navigation_handler(move |url: String| {
            // Engine-internal document swaps carry no host to judge
            if url.starts_with("data:") {
                return true;
            }
            let parsed = match Url::parse(&url) {
                Ok(u) => u,
                Err(e) => {
                    warn!("Blocking unparseable navigation target {}: {}", url, e);
                    return false;
                }
            };
            // The engine does not report how a navigation was initiated.
            // Navigations arriving mid-load are redirect hops and stay
            // in-app (auth chains bounce through outside IdP hosts);
            // everything else is treated as a link click, which keeps
            // outside hosts out of the surface.
            let request = NavigationRequest {
                url: parsed,
                kind: navigation_kind(nav_load_in_flight.load(Ordering::Relaxed)),
            };
            match nav_policy.decide(&request) {
                NavigationDecision::AllowInApp => true,
                NavigationDecision::OpenExternal => {
                    info!("Navigation handed to system browser: {}", url);
                    let _ = nav_proxy.send_event(UserEvent::OpenExternal(url));
                    false
                }
            }
        })
        .with_new_window_req_handler(move |url: String| {
            match Url::parse(&url) {
                Ok(parsed) => match popup_policy.decide_popup(&parsed) {
                    PopupDecision::LoadInExistingSurface => {
                        info!("Popup rides the existing surface: {}", url);
                        let _ = popup_proxy.send_event(UserEvent::Navigate(url));
                    }
                    PopupDecision::OpenExternal => {
                        info!("Popup handed to system browser: {}", url);
                        let _ = popup_proxy.send_event(UserEvent::OpenExternal(url));
                    }
                },
                Err(e) => warn!("Dropping unparseable popup target {}: {}", url, e),
            }
            // Never materialize a second content surface
            false
        })
        .with_on_page_load_handler(move |event, url| match event {
            wry::PageLoadEvent::Started => {
                page_load_in_flight.store(true, Ordering::Relaxed);
                let _ = load_proxy.send_event(UserEvent::LoadStarted);
            }
            wry::PageLoadEvent::Finished => {
                page_load_in_flight.store(false, Ordering::Relaxed);
                let _ = load_proxy.send_event(UserEvent::LoadFinished(url));
            }
        })
        .build_as_child(&window)
        .expect("Failed to create content WebView");

    info!("Content WebView created, loading {}", home_url);

    // Track settings window (created on demand)
    let settings_window: Arc<Mutex<Option<(Window, WebView)>>> = Arc::new(Mutex::new(None));
    let settings_window_for_events = Arc::clone(&settings_window);
    let settings_proxy_for_handler = proxy.clone();

    // Geometry save ticker: flushes debounced frame changes
    let geometry_proxy = proxy.clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_millis(100));
        if geometry_proxy.send_event(UserEvent::GeometryTick).is_err() {
            break;
        }
    });

    // Page-load watchdog ticker
    let watchdog_proxy = proxy.clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_secs(1));
        if watchdog_proxy.send_event(UserEvent::WatchdogTick).is_err() {
            break;
        }
    });
    info!("Started background tickers");

    let state_for_events = Arc::clone(&state);
    let platform_for_events = Arc::clone(&platform);

    // Run the event loop
    event_loop.run(move |event, event_loop_target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                window_id,
                ..
            } => {
                if window_id == main_window_id {
                    info!("Main window close requested, shutting down...");
                    if let Ok(mut s) = state_for_events.lock() {
                        if let Err(e) = s.flush_frame(current_frame(&window)) {
                            error!("Failed to persist window frame: {}", e);
                        }
                    }
                    *control_flow = ControlFlow::Exit;
                } else {
                    // Settings window close: hide it and refresh the
                    // content surface so preference changes take hold
                    if let Ok(guard) = settings_window_for_events.lock() {
                        if let Some((ref settings_win, _)) = *guard {
                            if settings_win.id() == window_id {
                                settings_win.set_visible(false);
                                let _ = content_webview.evaluate_script("location.reload();");
                            }
                        }
                    }
                }
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                window_id,
                ..
            } => {
                if window_id == main_window_id {
                    apply_layout(&window, &topbar_webview, &content_webview);
                    if let (Ok(mut s), Some(frame)) =
                        (state_for_events.lock(), current_frame(&window))
                    {
                        s.record_frame(frame);
                    }
                }
            }
            Event::WindowEvent {
                event: WindowEvent::Moved(_),
                window_id,
                ..
            } => {
                if window_id == main_window_id {
                    if let (Ok(mut s), Some(frame)) =
                        (state_for_events.lock(), current_frame(&window))
                    {
                        s.record_frame(frame);
                    }
                }
            }
            Event::LoopDestroyed => {
                // Last chance to persist geometry regardless of how the
                // shutdown began
                if let Ok(mut s) = state_for_events.lock() {
                    if let Err(e) = s.flush_frame(current_frame(&window)) {
                        error!("Failed to persist window frame: {}", e);
                    }
                }
            }
            Event::UserEvent(user_event) => match user_event {
                UserEvent::Quit => {
                    info!("Quit selected from the menu, shutting down...");
                    if let Ok(mut s) = state_for_events.lock() {
                        if let Err(e) = s.flush_frame(current_frame(&window)) {
                            error!("Failed to persist window frame: {}", e);
                        }
                    }
                    *control_flow = ControlFlow::Exit;
                }
                UserEvent::GoHome => {
                    let _ = content_webview.load_url(&home_url);
                }
                UserEvent::Reload => {
                    let _ = content_webview.evaluate_script("location.reload();");
                }
                UserEvent::Navigate(url) => {
                    let _ = content_webview.load_url(&url);
                }
                UserEvent::OpenProject => {
                    let url = state_for_events
                        .lock()
                        .map(|s| s.config.project_url.clone())
                        .unwrap_or_default();
                    if let Err(e) = platform_for_events.open_external(&url) {
                        error!("Failed to open project page: {}", e);
                    }
                }
                UserEvent::OpenExternal(url) => {
                    if let Err(e) = platform_for_events.open_external(&url) {
                        error!("Failed to open external URL: {}", e);
                    }
                }
                UserEvent::OpenSettings => {
                    info!("Opening settings window");
                    let mut guard = settings_window_for_events.lock().unwrap();

                    if let Some((ref settings_win, _)) = *guard {
                        settings_win.set_visible(true);
                        settings_win.set_focus();
                    } else {
                        let settings_win = WindowBuilder::new()
                            .with_title("Mailframe Settings")
                            .with_inner_size(LogicalSize::new(520.0, 440.0))
                            .with_resizable(false)
                            .build(event_loop_target)
                            .expect("Failed to create settings window");

                        let settings_proxy = settings_proxy_for_handler.clone();
                        let settings_webview = WebViewBuilder::new()
                            .with_html(SETTINGS_HTML)
                            .with_devtools(cfg!(debug_assertions))
                            .with_clipboard(true)
                            .with_initialization_script(JS_BRIDGE)
                            .with_ipc_handler(move |message| {
                                match serde_json::from_str::<IpcMessage>(message.body()) {
                                    Ok(msg) => forward_ipc(&settings_proxy, msg),
                                    Err(e) => error!("Failed to parse settings IPC: {}", e),
                                }
                            })
                            .build(&settings_win)
                            .expect("Failed to create settings WebView");

                        *guard = Some((settings_win, settings_webview));
                    }
                }
                UserEvent::CloseSettings => {
                    info!("Closing settings window");
                    if let Ok(guard) = settings_window_for_events.lock() {
                        if let Some((ref settings_win, _)) = *guard {
                            settings_win.set_visible(false);
                        }
                    }
                    // Preference changes (chat mode, reset) land on reload;
                    // a user-agent change waits for the next launch.
                    let _ = content_webview.evaluate_script("location.reload();");
                }
                UserEvent::SetUserAgent(value) => {
                    info!("User agent preference updated");
                    if let Ok(mut s) = state_for_events.lock() {
                        if let Err(e) = s.prefs.set_string(keys::USER_AGENT, value) {
                            error!("Failed to persist user agent: {}", e);
                        }
                    }
                }
                UserEvent::SetHangoutsMode(mode) => {
                    if mode.is_empty() {
                        // Back to the provider's own default: drop the
                        // stored mode, nothing to tell the page
                        info!("Chat panel mode cleared");
                        if let Ok(mut s) = state_for_events.lock() {
                            if let Err(e) = s.prefs.remove(keys::HANGOUTS_MODE) {
                                error!("Failed to clear chat mode: {}", e);
                            }
                        }
                    } else {
                        info!("Chat panel mode set to {}", mode);
                        if let Ok(mut s) = state_for_events.lock() {
                            if let Err(e) = s.prefs.set_string(keys::HANGOUTS_MODE, &mode) {
                                error!("Failed to persist chat mode: {}", e);
                            }
                        }
                        let script = injection::hangouts_mode_script(&mode);
                        let _ = content_webview.evaluate_script(&script);
                    }
                }
                UserEvent::ResetPrefs => {
                    info!("Resetting preferences to shipped defaults");
                    if let Ok(mut s) = state_for_events.lock() {
                        if let Err(e) = s.prefs.clear_defaults() {
                            error!("Failed to reset preferences: {}", e);
                        }
                        let _ = s.prefs.set_bool(keys::AFTER_FIRST_LAUNCH, true);
                    }
                    push_prefs(&state_for_events, &settings_window_for_events);
                    let _ = content_webview.evaluate_script("location.reload();");
                }
                UserEvent::SyncPrefs => {
                    push_prefs(&state_for_events, &settings_window_for_events);
                }
                UserEvent::LoadStarted => {
                    if let Ok(mut s) = state_for_events.lock() {
                        s.watchdog.began();
                    }
                }
                UserEvent::LoadFinished(url) => {
                    info!("Page load finished: {}", url);
                    if let Ok(mut s) = state_for_events.lock() {
                        s.watchdog.finished();
                        let mode = s.hangouts_mode();
                        for script in s.assets.post_load_scripts(mode.as_deref()) {
                            let _ = content_webview.evaluate_script(&script);
                        }
                    }
                }
                UserEvent::GeometryTick => {
                    if let Ok(mut s) = state_for_events.lock() {
                        if let Some(frame) = s.take_due_frame_save() {
                            if let Err(e) = s.save_frame(&frame) {
                                error!("Failed to persist window frame: {}", e);
                            }
                        }
                    }
                }
                UserEvent::WatchdogTick => {
                    let retry = state_for_events
                        .lock()
                        .map(|mut s| s.watchdog.should_retry())
                        .unwrap_or(false);
                    if retry {
                        warn!("Page load timed out, reloading");
                        let _ = content_webview.evaluate_script("location.reload();");
                    }
                }
                UserEvent::PageLog { level, message } => match level.as_str() {
                    "error" => error!(target: "page", "{}", message),
                    "warn" => warn!(target: "page", "{}", message),
                    _ => info!(target: "page", "{}", message),
                },
            },
            _ => {}
        }
    });
}

/// Push the current preference snapshot into the settings WebView
fn push_prefs(
    state: &Arc<Mutex<AppState>>,
    settings_window: &Arc<Mutex<Option<(Window, WebView)>>>,
) {
    let snapshot = match state.lock() {
        Ok(s) => s.prefs_snapshot(),
        Err(_) => return,
    };
    if let Ok(guard) = settings_window.lock() {
        if let Some((_, ref settings_wv)) = *guard {
            let script = format!("window.mailframe._receivePrefs({});", snapshot);
            let _ = settings_wv.evaluate_script(&script);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailframe_policy::NavigationPolicy;

    #[test]
    fn test_redirect_hops_stay_in_app() {
        let policy = NavigationPolicy::new();
        let url = Url::parse("https://idp.example.com/saml/callback").unwrap();

        // An outside host reached mid-load is a redirect hop and rides
        // the default-permissive rule
        let hop = NavigationRequest {
            url: url.clone(),
            kind: navigation_kind(true),
        };
        assert_eq!(policy.decide(&hop), NavigationDecision::AllowInApp);

        // The same host reached by a click opens externally
        let click = NavigationRequest {
            url,
            kind: navigation_kind(false),
        };
        assert_eq!(policy.decide(&click), NavigationDecision::OpenExternal);
    }
}
