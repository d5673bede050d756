//! Error types for the out-of-process hardware services.
//!
//! Every variant is recoverable from the controller's point of view: call
//! sites match on the error, log it and carry on.

use thiserror::Error;

/// Failures of the HID passthrough bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The hardware service is not present on this device.
    #[error("HID service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A remote call failed or timed out.
    #[error("HID remote call '{call}' failed: {reason}")]
    Remote {
        /// Name of the IPC call.
        call: &'static str,
        /// Failure reported by the IPC layer.
        reason: String,
    },

    /// `open` called while a handle is already held.
    #[error("HID bridge already open")]
    AlreadyOpen,
}

impl BridgeError {
    pub(crate) fn remote(call: &'static str, reason: impl Into<String>) -> Self {
        Self::Remote {
            call,
            reason: reason.into(),
        }
    }

    /// Returns true if the bridge can never succeed for this controller.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

/// Failures of the video passthrough switch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassthroughError {
    /// The TV input service is not present on this device.
    #[error("TV input service unavailable")]
    ServiceUnavailable,

    /// No passthrough-capable video input was found.
    #[error("No passthrough video input present")]
    NoPassthroughInput,

    /// A remote call failed or timed out.
    #[error("TV input call '{call}' failed: {reason}")]
    Remote {
        /// Name of the IPC call.
        call: &'static str,
        /// Failure reported by the IPC layer.
        reason: String,
    },
}

impl PassthroughError {
    pub(crate) fn remote(call: &'static str, reason: impl Into<String>) -> Self {
        Self::Remote {
            call,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_classification() {
        assert!(BridgeError::ServiceUnavailable("absent".into()).is_permanent());
        assert!(!BridgeError::remote("hubOpen", "timeout").is_permanent());
        assert!(!BridgeError::AlreadyOpen.is_permanent());
    }

    #[test]
    fn test_error_display() {
        let err = BridgeError::remote("hubWriteMode", "dead object");
        assert_eq!(
            err.to_string(),
            "HID remote call 'hubWriteMode' failed: dead object"
        );
        assert_eq!(
            PassthroughError::NoPassthroughInput.to_string(),
            "No passthrough video input present"
        );
    }
}
