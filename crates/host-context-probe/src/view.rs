//! Host view state: theme and full-screen mode.
//!
//! These are plain subscriptions to host events; nothing here branches on
//! authentication.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Query string parameter the host uses to pass the initial theme.
pub const THEME_QUERY_VARIABLE: &str = "theme";

/// Host color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Contrast,
}

impl Theme {
    /// Map a host theme name. Unknown or absent names fall back to the default theme.
    pub fn from_host_name(name: Option<&str>) -> Self {
        match name {
            Some("dark") => Theme::Dark,
            Some("contrast") => Theme::Contrast,
            _ => Theme::Default,
        }
    }
}

/// Read a query string parameter, URL-decoded.
///
/// Accepts the raw query with or without the leading `?`.
pub fn query_variable(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Published view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostViewState {
    pub theme: Theme,
    /// `None` until the host reports it.
    pub full_screen: Option<bool>,
}

/// Store for [`HostViewState`] with watch-based subscriptions.
pub struct HostViewStore {
    tx: watch::Sender<HostViewState>,
}

impl HostViewStore {
    /// Create the store. An explicit initial theme wins over the query string.
    pub fn new(initial_theme: Option<&str>, query: &str) -> Self {
        let from_query = query_variable(query, THEME_QUERY_VARIABLE);
        let theme = Theme::from_host_name(initial_theme.or(from_query.as_deref()));
        let (tx, _rx) = watch::channel(HostViewState {
            theme,
            full_screen: None,
        });
        Self { tx }
    }

    /// Apply the context the host reports after initialization.
    pub fn apply_host_context(&self, theme: Option<&str>, is_full_screen: Option<bool>) {
        let theme = Theme::from_host_name(theme);
        self.update(|state| {
            state.theme = theme;
            state.full_screen = is_full_screen;
        });
    }

    /// Theme change event.
    pub fn set_theme(&self, theme: Option<&str>) {
        let theme = Theme::from_host_name(theme);
        self.update(|state| state.theme = theme);
    }

    /// Full-screen change event.
    pub fn set_full_screen(&self, full_screen: bool) {
        self.update(|state| state.full_screen = Some(full_screen));
    }

    pub fn current(&self) -> HostViewState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HostViewState> {
        self.tx.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut HostViewState)) {
        self.tx.send_if_modified(|state| {
            let before = *state;
            apply(state);
            if before != *state {
                debug!(state = ?state, "Host view state changed");
                true
            } else {
                false
            }
        });
    }
}
