//! Error types for session state and profile handling.

use std::io;
use thiserror::Error;

use crate::state::SessionState;

/// Errors raised by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A transition that the state graph does not allow.
    #[error("Illegal session transition: {from} -> {to}")]
    IllegalTransition {
        /// State the machine was in.
        from: SessionState,
        /// Requested state.
        to: SessionState,
    },

    /// The session already reached `Disconnected`; a new instance is required.
    #[error("Session is terminated: {0}")]
    Terminated(String),

    /// A connection URI could not be converted into a profile.
    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    /// Profile file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Profile file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The controller side of the event channel is gone.
    #[error("Session event channel closed")]
    ChannelClosed,
}

impl SessionError {
    /// Returns true if this error is a bug in the transport's reporting
    /// rather than a problem with user input.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. } | Self::Terminated(_))
    }
}
