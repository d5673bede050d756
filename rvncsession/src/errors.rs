use thiserror::Error;

/// Errors loading [`crate::prefs::ViewerPrefs`] or a host-event script.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid script step {index}: {reason}")]
    Script { index: usize, reason: String },
}

/// The host declined a capability request. Logged and otherwise ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostRefusal {
    #[error("Picture-in-picture is not supported on this host")]
    Unsupported,

    #[error("Host refused request: {0}")]
    Refused(String),
}
