//! Viewer preferences.
//!
//! Read once at startup from a TOML file; every field has a default so a
//! partial (or missing) file is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerPrefs {
    pub viewer: ViewerSection,
    pub input: InputSection,
    pub experimental: ExperimentalSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    pub fullscreen: bool,
    /// Enter picture-in-picture when the user leaves a connected session.
    pub pip_enabled: bool,
    pub orientation: Orientation,
    pub toolbar_alignment: ToolbarAlignment,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            fullscreen: true,
            pip_enabled: false,
            orientation: Orientation::Auto,
            toolbar_alignment: ToolbarAlignment::Start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub intercept_mouse_back: bool,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            intercept_mouse_back: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentalSection {
    /// Hide system bars while connected in fullscreen.
    pub immersive_mode: bool,
    pub swipe_close_toolbar: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Auto,
    Portrait,
    Landscape,
}

/// Which screen edge the toolbar drawer slides in from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarAlignment {
    #[default]
    Start,
    End,
}

impl ViewerPrefs {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let prefs = Self::from_toml(&content)?;
        info!("Loaded preferences from {}", path.display());
        Ok(prefs)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Immersive flags are wanted at all (still subject to connection state).
    pub fn wants_immersive(&self) -> bool {
        self.viewer.fullscreen && self.experimental.immersive_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let prefs = ViewerPrefs::from_toml("").unwrap();
        assert_eq!(prefs, ViewerPrefs::default());
        assert!(prefs.viewer.fullscreen);
        assert!(prefs.input.intercept_mouse_back);
        assert!(!prefs.wants_immersive());
    }

    #[test]
    fn test_partial_sections() {
        let prefs = ViewerPrefs::from_toml(
            r#"
            [viewer]
            pip_enabled = true
            orientation = "landscape"
            toolbar_alignment = "end"

            [experimental]
            immersive_mode = true
            "#,
        )
        .unwrap();
        assert!(prefs.viewer.pip_enabled);
        assert!(prefs.viewer.fullscreen);
        assert_eq!(prefs.viewer.orientation, Orientation::Landscape);
        assert_eq!(prefs.viewer.toolbar_alignment, ToolbarAlignment::End);
        assert!(prefs.wants_immersive());
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let err = ViewerPrefs::from_toml("[viewer]\norientation = \"sideways\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
