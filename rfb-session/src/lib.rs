//! Session layer shared by the controller and the transport.
//!
//! This crate holds the pieces both sides must agree on:
//!
//! - [`SessionStateMachine`]: the authoritative connection state, with an
//!   explicit subscription list and in-order fan-out
//! - [`ServerProfile`]: the immutable connection descriptor
//! - [`SessionAction`] / [`ServerEvent`]: the messages crossing the boundary
//! - [`Transport`]: the interface the wire-protocol implementation provides
//!
//! The wire protocol itself lives outside this workspace. A transport only
//! has to report its progress through the [`StateSender`] it is handed.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod errors;
pub mod messages;
pub mod profile;
pub mod state;

pub use errors::SessionError;
pub use messages::{ServerEvent, SessionAction};
pub use profile::ServerProfile;
pub use state::{SessionState, SessionStateMachine, StateSender, SubscriptionId};

/// The transport-facing collaborator that talks to the remote display server.
///
/// `start` is called once per session instance, after every observer has been
/// registered. Transport errors are reported as
/// `SessionState::Disconnected(reason)` through `events`.
pub trait Transport {
    /// Begin connecting with the given profile.
    fn start(&mut self, profile: &ServerProfile, events: StateSender);

    /// Forward a session action to the server.
    fn dispatch(&mut self, action: SessionAction);
}
