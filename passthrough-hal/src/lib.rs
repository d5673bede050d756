//! Bridges to the out-of-process hardware services used alongside a session.
//!
//! - [`HidPassthroughBridge`] re-emits touch samples as hardware HID input on
//!   an externally connected device
//! - [`VideoPassthroughSwitch`] routes an external video input to the screen
//!
//! Both talk to services that may be missing on a given host, so every
//! operation returns a typed error ([`BridgeError`], [`PassthroughError`])
//! that callers are expected to log and move past.

#![forbid(unsafe_code)]

pub mod errors;
pub mod hid;
pub mod mock;
pub mod video;

pub use errors::{BridgeError, PassthroughError};
pub use hid::{
    BridgeState, HidEventSample, HidPassthroughBridge, HidService, HidServiceConnector,
    TouchPhase, WriteOutcome, MODE_MUTE, MODE_UNMUTE,
};
pub use video::{PassthroughChannel, TvInputService, VideoInput, VideoPassthroughSwitch};
