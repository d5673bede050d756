//! Server connection profiles.
//!
//! A [`ServerProfile`] is created once from launch parameters and then cloned
//! for the running session, so that a retry can start again from the
//! untouched original.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::errors::SessionError;

/// Default VNC port (display :0).
pub const DEFAULT_PORT: u16 = 5900;

/// Immutable connection descriptor for one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    /// User-visible connection name.
    #[serde(default)]
    pub name: String,
    /// Server hostname or IP address.
    #[serde(default)]
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// View-only mode (no input sent to server).
    #[serde(default)]
    pub view_only: bool,
    /// Only forward printable keys as keysyms; leave the rest to the host.
    #[serde(default)]
    pub key_compat_mode: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            view_only: false,
            key_compat_mode: false,
        }
    }
}

impl ServerProfile {
    /// Load a profile from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = std::fs::read_to_string(path)?;
        let profile =
            toml::from_str(&content).map_err(|e| SessionError::Config(e.to_string()))?;
        info!("Loaded server profile from {}", path.display());
        Ok(profile)
    }

    /// Convert a `vnc://host[:port][/?ConnectionName=..&ViewOnly=..]` URI.
    ///
    /// The scheme is optional. IPv6 hosts must be bracketed.
    pub fn from_uri(uri: &str) -> Result<Self, SessionError> {
        let rest = uri.trim();
        let rest = match rest.split_once("://") {
            Some((scheme, tail)) if scheme.eq_ignore_ascii_case("vnc") => tail,
            Some((scheme, _)) => {
                return Err(SessionError::InvalidUri(format!(
                    "unsupported scheme '{scheme}'"
                )))
            }
            None => rest,
        };

        let (authority, query) = match rest.split_once('?') {
            Some((a, q)) => (a.trim_end_matches('/'), Some(q)),
            None => (rest.trim_end_matches('/'), None),
        };

        let (host, port) = split_host_port(authority)?;
        if host.is_empty() {
            return Err(SessionError::InvalidUri(format!("missing host in '{uri}'")));
        }

        let mut profile = Self {
            host: host.to_string(),
            port,
            ..Self::default()
        };

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "ConnectionName" => profile.name = value.replace("%20", " "),
                "ViewOnly" => profile.view_only = value.eq_ignore_ascii_case("true"),
                "KeyCompatMode" => {
                    profile.key_compat_mode = value.eq_ignore_ascii_case("true")
                }
                _ => warn!("Ignoring unknown URI parameter '{}'", key),
            }
        }

        Ok(profile)
    }

    /// `host:port` label used in logs and titles.
    #[must_use]
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn split_host_port(authority: &str) -> Result<(&str, u16), SessionError> {
    if let Some(stripped) = authority.strip_prefix('[') {
        let (host, tail) = stripped
            .split_once(']')
            .ok_or_else(|| SessionError::InvalidUri(format!("unclosed '[' in '{authority}'")))?;
        let port = match tail.strip_prefix(':') {
            Some(p) => parse_port(p)?,
            None => DEFAULT_PORT,
        };
        return Ok((host, port));
    }

    match authority.rsplit_once(':') {
        Some((host, p)) => Ok((host, parse_port(p)?)),
        None => Ok((authority, DEFAULT_PORT)),
    }
}

fn parse_port(p: &str) -> Result<u16, SessionError> {
    p.parse()
        .map_err(|_| SessionError::InvalidUri(format!("invalid port '{p}'")))
}
