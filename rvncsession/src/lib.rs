//! rvncsession: session controller for a remote-display view.
//!
//! [`SessionController`] ties one session instance together. It observes the
//! connection state, brings passthrough hardware up and down with view
//! visibility, routes input, and adapts layout to on-screen obstructions.
//! The host side is reached only through the traits in [`host`].

#![forbid(unsafe_code)]

pub mod adapters;
pub mod args;
pub mod controller;
pub mod errors;
pub mod host;
#[cfg(feature = "test-support")]
pub mod mock;
pub mod prefs;
pub mod script;

pub use controller::{
    load_profile, Hardware, HostServices, LaunchParams, SessionController, ToolbarAction,
    DRAWER_HINT_DURATION,
};
pub use errors::{ConfigError, HostRefusal};
pub use host::{Relauncher, RenderSurface, RunInfo, SystemUiFlags, UiHost, VirtualKeys};
pub use prefs::ViewerPrefs;
