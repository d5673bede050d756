//! Message types exchanged between the controller and the transport collaborator.

use crate::state::SessionState;

/// Events sent from the transport to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The session moved to a new state.
    StateChanged(SessionState),

    /// Remote framebuffer size is known or changed.
    FramebufferResized {
        /// Width in pixels.
        width: u16,
        /// Height in pixels.
        height: u16,
    },

    /// The server asked for credentials; the UI host shows its dialog.
    CredentialRequested,

    /// An unknown SSH host key needs confirmation; the UI host shows its dialog.
    HostKeyVerificationRequested,
}

/// Session-level actions produced from local input and lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Send keyboard event.
    Key {
        /// X11 keysym value.
        keysym: u32,
        /// True if key was pressed, false if released.
        down: bool,
    },

    /// Mouse "back" side button, delivered as a pointer button rather than
    /// a navigation back-press.
    MouseBack,

    /// Push the local clipboard to the server.
    SendClipboardText,
}
