//! Navigation gatekeeping for the embedded mail surface
//!
//! Every navigation and new-window request inside the content WebView is
//! evaluated against a fixed host-suffix table: the mail provider's domains
//! load in-app, everything a user clicks their way to is handed to the
//! system browser. Popup requests never create a second surface.

pub mod injection;

use url::Url;

/// Host suffixes treated as "the mail provider". A host matches iff it
/// equals a suffix or ends with `".{suffix}"`; substring matches are not
/// good enough (a host merely containing "google.com" stays outside).
pub const KNOWN_DOMAIN_SUFFIXES: &[&str] = &[
    "google.com",
    "googleusercontent.com",
    "gstatic.com",
    "googleapis.com",
    "youtube.com",
];

/// Path markers identifying authentication popups that must stay in-app
/// to keep session cookies and single-sign-on redirects working.
const AUTH_PATH_MARKERS: &[&str] = &["oauth", "signin", "servicelogin", "accounts", "auth"];

/// Scheme used by the engine for placeholder documents (about:blank etc.)
pub const IN_APP_PLACEHOLDER_SCHEME: &str = "about";

/// How a navigation was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The user activated a link in the hosted page
    LinkActivated,
    /// Redirects, form submissions, and shell-issued loads
    Other,
}

/// A single navigation event, evaluated once
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub url: Url,
    pub kind: NavigationKind,
}

/// Outcome for a top-level navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the content WebView load the URL
    AllowInApp,
    /// Cancel the in-app load and hand the URL to the system browser
    OpenExternal,
}

/// Outcome for a popup / new-window request. Neither variant creates a
/// second surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupDecision {
    /// Navigate the existing content WebView to the URL
    LoadInExistingSurface,
    /// Hand the URL to the system browser
    OpenExternal,
}

/// The navigation policy: a fixed domain table plus the decision procedure
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    suffixes: Vec<String>,
}

impl NavigationPolicy {
    pub fn new() -> Self {
        Self::with_suffixes(KNOWN_DOMAIN_SUFFIXES.iter().map(|s| s.to_string()))
    }

    pub fn with_suffixes(suffixes: impl IntoIterator<Item = String>) -> Self {
        let suffixes: Vec<String> = suffixes
            .into_iter()
            .map(|s| s.trim_start_matches('.').to_lowercase())
            .collect();
        log::info!("Navigation policy with {} known suffixes", suffixes.len());
        Self { suffixes }
    }

    /// Strict host-suffix check against the known domain set
    pub fn is_known_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.suffixes.iter().any(|suffix| {
            host == *suffix || host.ends_with(&format!(".{}", suffix))
        })
    }

    /// Decision procedure for a top-level navigation, first match wins:
    /// 1. known host -> in-app, 2. clicked link to an outside host ->
    /// external, 3. non-http(s) scheme other than the placeholder ->
    /// external, 4. default-permissive in-app.
    pub fn decide(&self, request: &NavigationRequest) -> NavigationDecision {
        let url = &request.url;
        let scheme = url.scheme();
        let is_http = scheme == "http" || scheme == "https";

        if let Some(host) = url.host_str() {
            if self.is_known_host(host) {
                return NavigationDecision::AllowInApp;
            }
        }

        if is_http {
            if request.kind == NavigationKind::LinkActivated {
                return NavigationDecision::OpenExternal;
            }
            return NavigationDecision::AllowInApp;
        }

        // mailto:, tel:, and friends belong to the system handler
        if scheme != IN_APP_PLACEHOLDER_SCHEME {
            return NavigationDecision::OpenExternal;
        }

        NavigationDecision::AllowInApp
    }

    /// Popup / new-window requests: provider and auth flows ride the
    /// existing surface (OAuth popups must share the session), everything
    /// else goes to the system browser.
    pub fn decide_popup(&self, url: &Url) -> PopupDecision {
        if let Some(host) = url.host_str() {
            if self.is_known_host(host) {
                return PopupDecision::LoadInExistingSurface;
            }
        }

        let path = url.path().to_lowercase();
        if AUTH_PATH_MARKERS.iter().any(|marker| path.contains(marker)) {
            return PopupDecision::LoadInExistingSurface;
        }

        PopupDecision::OpenExternal
    }
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, kind: NavigationKind) -> NavigationRequest {
        NavigationRequest {
            url: Url::parse(url).unwrap(),
            kind,
        }
    }

    #[test]
    fn test_known_hosts_allowed_regardless_of_activation() {
        let policy = NavigationPolicy::new();

        for url in [
            "https://mail.google.com/mail/u/0/",
            "https://accounts.google.com/ServiceLogin",
            "https://inbox.google.com/",
            "https://www.gstatic.com/og/_/js/gapi.js",
            "https://apis.googleapis.com/batch",
        ] {
            assert_eq!(
                policy.decide(&request(url, NavigationKind::LinkActivated)),
                NavigationDecision::AllowInApp,
                "{url}"
            );
            assert_eq!(
                policy.decide(&request(url, NavigationKind::Other)),
                NavigationDecision::AllowInApp,
                "{url}"
            );
        }
    }

    #[test]
    fn test_clicked_outside_links_open_externally() {
        let policy = NavigationPolicy::new();

        assert_eq!(
            policy.decide(&request(
                "https://example.com/article",
                NavigationKind::LinkActivated
            )),
            NavigationDecision::OpenExternal
        );
        assert_eq!(
            policy.decide(&request(
                "http://news.example.org/",
                NavigationKind::LinkActivated
            )),
            NavigationDecision::OpenExternal
        );
    }

    #[test]
    fn test_non_clicked_outside_navigations_stay_in_app() {
        let policy = NavigationPolicy::new();

        // Redirect chains during auth may bounce through outside hosts
        assert_eq!(
            policy.decide(&request(
                "https://idp.example.com/saml/callback",
                NavigationKind::Other
            )),
            NavigationDecision::AllowInApp
        );
    }

    #[test]
    fn test_suffix_matching_is_strict() {
        let policy = NavigationPolicy::new();

        // Hosts that merely contain a known suffix are outside the set
        for host in [
            "https://notgoogle.com/",
            "https://google.com.evil.net/login",
            "https://fakegstatic.com/x.js",
        ] {
            assert_eq!(
                policy.decide(&request(host, NavigationKind::LinkActivated)),
                NavigationDecision::OpenExternal,
                "{host}"
            );
        }

        assert!(policy.is_known_host("GOOGLE.COM"));
        assert!(policy.is_known_host("sub.sub.google.com"));
        assert!(!policy.is_known_host("google.com.attacker.io"));
    }

    #[test]
    fn test_non_http_schemes_delegate_to_system() {
        let policy = NavigationPolicy::new();

        assert_eq!(
            policy.decide(&request(
                "mailto:someone@example.com",
                NavigationKind::Other
            )),
            NavigationDecision::OpenExternal
        );
        assert_eq!(
            policy.decide(&request("tel:+15551234567", NavigationKind::Other)),
            NavigationDecision::OpenExternal
        );
    }

    #[test]
    fn test_placeholder_scheme_stays_in_app() {
        let policy = NavigationPolicy::new();

        assert_eq!(
            policy.decide(&request("about:blank", NavigationKind::Other)),
            NavigationDecision::AllowInApp
        );
    }

    #[test]
    fn test_popup_auth_paths_ride_existing_surface() {
        let policy = NavigationPolicy::new();

        for url in [
            "https://sso.example.com/oauth/authorize?client_id=x",
            "https://login.example.com/signin",
            "https://example.com/accounts/consent",
        ] {
            assert_eq!(
                policy.decide_popup(&Url::parse(url).unwrap()),
                PopupDecision::LoadInExistingSurface,
                "{url}"
            );
        }
    }

    #[test]
    fn test_popup_known_hosts_ride_existing_surface() {
        let policy = NavigationPolicy::new();

        assert_eq!(
            policy.decide_popup(&Url::parse("https://accounts.google.com/o/oauth2/auth").unwrap()),
            PopupDecision::LoadInExistingSurface
        );
    }

    #[test]
    fn test_unrelated_popups_open_externally() {
        let policy = NavigationPolicy::new();

        assert_eq!(
            policy.decide_popup(&Url::parse("https://example.com/promo").unwrap()),
            PopupDecision::OpenExternal
        );
    }
}
