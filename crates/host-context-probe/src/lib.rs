//! # Host Context Probe
//!
//! Determines whether the application is running embedded inside the
//! collaboration host (tab iframe, native desktop shell, extension frame)
//! or standalone in a browser tab.
//!
//! ## Overview
//!
//! Detection is a pure function over a snapshot of environment signals
//! ([`HostSignals`]). The host environment may still be loading when the
//! probe is first asked, so the result is tri-state ([`HostContext`]):
//! `Unknown` must never be read as "not embedded".
//!
//! ## Key Operations
//!
//! | Item | Description |
//! |------|-------------|
//! | [`probe_host_embedding`] | Run the detection heuristic on a signal snapshot |
//! | [`HostContextProbe`] | Combine a [`SignalSource`] with the heuristic |
//! | [`HostContextPublisher`] | Publish the resolved context to subscribers |
//! | [`HostViewStore`] | Track host theme and full-screen state |
//! | [`query_variable`] | Read a URL-decoded query string parameter |
//!
//! ## Example Usage
//!
//! ```ignore
//! use host_context_probe::{probe_host_embedding, HostSignals};
//!
//! let signals = HostSignals {
//!     user_agent: "Mozilla/5.0 Teams/1.6".into(),
//!     ..HostSignals::sdk_loaded()
//! };
//! assert!(probe_host_embedding(&signals));
//! ```

mod probe;
mod publisher;
mod types;
mod view;

pub use probe::{
    probe_host_embedding, HostContextProbe, SignalSource, EMBEDDED_PAGE_CONTAINER,
    EXTENSION_TAB_FRAME, HOST_PRODUCT_TOKEN,
};
pub use publisher::HostContextPublisher;
pub use types::{HostContext, HostSignals};
pub use view::{query_variable, HostViewState, HostViewStore, Theme, THEME_QUERY_VARIABLE};
