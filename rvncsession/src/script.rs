//! Host-event scripts.
//!
//! The binary has no real windowing host, so it replays a TOML list of host
//! callbacks against the controller:
//!
//! ```toml
//! [[step]]
//! event = "visible"
//!
//! [[step]]
//! event = "state"
//! state = "connected"
//!
//! [[step]]
//! event = "touch"
//! action = "down"
//! x = 120
//! y = 340
//!
//! [[step]]
//! event = "wait"
//! ms = 1600
//! ```

use std::path::Path;
use std::time::Duration;

use platform_input::{DeviceId, KeyAction, KeyCode, KeyEvent, TouchAction, TouchEvent};
use rfb_common::{Point, Rect, Size};
use rfb_display::LayoutSnapshot;
use rfb_session::{ServerEvent, SessionState, StateSender};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::adapters::CONSOLE_MOUSE;
use crate::controller::{SessionController, ToolbarAction};
use crate::errors::ConfigError;

const CONSOLE_KEYBOARD: DeviceId = DeviceId(1);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let script = Self::from_toml(&content)?;
        info!("Loaded {} script steps from {}", script.steps.len(), path.display());
        Ok(script)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let script: Self = toml::from_str(content)?;
        for (index, step) in script.steps.iter().enumerate() {
            step.validate().map_err(|reason| ConfigError::Script { index, reason })?;
        }
        Ok(script)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Step {
    Visible,
    Hidden,
    Resume,
    Terminate,
    Retry,
    Focus {
        has_focus: bool,
    },
    SystemUi,
    LeaveHint,
    Pip {
        active: bool,
    },
    /// Edges are `[left, top, right, bottom]`.
    DisplayFrame {
        visible: [i32; 4],
        root: [i32; 4],
        #[serde(default)]
        origin: [i32; 2],
    },
    InputPanel {
        visible: bool,
    },
    FrameLayout {
        width: u32,
        height: u32,
    },
    Key {
        key: KeyName,
        #[serde(default)]
        action: KeyStepAction,
        #[serde(default)]
        mouse: bool,
        #[serde(default)]
        repeat: u32,
    },
    Touch {
        action: TouchStepAction,
        x: i32,
        y: i32,
    },
    Toolbar {
        button: ToolbarButton,
    },
    State {
        state: StateName,
        #[serde(default)]
        reason: String,
    },
    Framebuffer {
        width: u16,
        height: u16,
    },
    Credentials,
    HostKey,
    Wait {
        ms: u64,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStepAction {
    #[default]
    Down,
    Up,
    /// Down then up.
    Press,
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchStepAction {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarButton {
    Keyboard,
    ZoomReset,
    VirtualKeys,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateName {
    Connecting,
    Connected,
    Disconnected,
}

/// A key name from a script, already resolved to a [`KeyCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct KeyName(pub KeyCode);

impl TryFrom<String> for KeyName {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        parse_key_code(&name)
            .map(KeyName)
            .ok_or_else(|| format!("unknown key '{name}'"))
    }
}

/// Parse a key name: a single character, or a named key such as `enter`,
/// `page_up` or `f5`.
pub fn parse_key_code(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "back" => KeyCode::Back,
        "enter" | "return" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Escape,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Space,
        "insert" => KeyCode::Insert,
        "delete" => KeyCode::ForwardDelete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "page_up" => KeyCode::PageUp,
        "page_down" => KeyCode::PageDown,
        "left" => KeyCode::Left,
        "up" => KeyCode::Up,
        "right" => KeyCode::Right,
        "down" => KeyCode::Down,
        "shift" => KeyCode::ShiftLeft,
        "ctrl" | "control" => KeyCode::CtrlLeft,
        "alt" => KeyCode::AltLeft,
        "meta" | "super" => KeyCode::MetaLeft,
        "caps_lock" => KeyCode::CapsLock,
        "num_lock" => KeyCode::NumLock,
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(code)
}

impl Step {
    fn validate(&self) -> Result<(), String> {
        match self {
            Step::DisplayFrame { visible, root, .. } => {
                for (name, [l, t, r, b]) in [("visible", visible), ("root", root)] {
                    if r < l || b < t {
                        return Err(format!("{name} frame has negative size"));
                    }
                }
                Ok(())
            }
            Step::State {
                state: StateName::Disconnected,
                reason,
            } if reason.is_empty() => Err("disconnected state needs a reason".into()),
            _ => Ok(()),
        }
    }

    /// Feed this step to the controller. Returns how long to pause after it.
    pub fn apply(&self, controller: &mut SessionController, events: &StateSender) -> Option<Duration> {
        debug!("Script step {:?}", self);
        match self {
            Step::Visible => controller.on_visible(),
            Step::Hidden => controller.on_hidden(),
            Step::Resume => controller.on_resume(),
            Step::Terminate => controller.on_terminate(),
            Step::Retry => controller.retry(),
            Step::Focus { has_focus } => controller.on_window_focus_changed(*has_focus),
            Step::SystemUi => controller.on_system_ui_visibility_changed(),
            Step::LeaveHint => controller.on_user_leave_hint(),
            Step::Pip { active } => controller.on_pip_mode_changed(*active),
            Step::DisplayFrame {
                visible,
                root,
                origin,
            } => controller.on_display_frame_changed(LayoutSnapshot {
                visible_frame: rect(*visible),
                root_origin: Point::new(origin[0], origin[1]),
                root_bounds: rect(*root),
            }),
            Step::InputPanel { visible } => controller.on_input_panel_visibility(*visible),
            Step::FrameLayout { width, height } => {
                controller.on_frame_view_layout(Size::new(*width, *height))
            }
            Step::Key {
                key,
                action,
                mouse,
                repeat,
            } => {
                let device = if *mouse { CONSOLE_MOUSE } else { CONSOLE_KEYBOARD };
                let actions = match action {
                    KeyStepAction::Down => vec![KeyAction::Down],
                    KeyStepAction::Up => vec![KeyAction::Up],
                    KeyStepAction::Press => vec![KeyAction::Down, KeyAction::Up],
                    KeyStepAction::Multiple => vec![KeyAction::Multiple { repeat: *repeat }],
                };
                for action in actions {
                    let consumed = controller.on_key_event(&KeyEvent::new(key.0, action, device));
                    debug!("Key {:?} {:?} consumed: {}", key.0, action, consumed);
                }
            }
            Step::Touch { action, x, y } => {
                let action = match action {
                    TouchStepAction::Down => TouchAction::Down,
                    TouchStepAction::Move => TouchAction::Move,
                    TouchStepAction::Up => TouchAction::Up,
                    TouchStepAction::Cancel => TouchAction::Cancel,
                };
                controller.on_touch(TouchEvent::new(action, *x, *y));
            }
            Step::Toolbar { button } => controller.on_toolbar_action(match button {
                ToolbarButton::Keyboard => ToolbarAction::Keyboard,
                ToolbarButton::ZoomReset => ToolbarAction::ZoomReset,
                ToolbarButton::VirtualKeys => ToolbarAction::VirtualKeys,
                ToolbarButton::Back => ToolbarAction::Back,
            }),
            Step::State { state, reason } => {
                let state = match state {
                    StateName::Connecting => SessionState::Connecting,
                    StateName::Connected => SessionState::Connected,
                    StateName::Disconnected => SessionState::Disconnected(reason.clone()),
                };
                post(events, ServerEvent::StateChanged(state));
            }
            Step::Framebuffer { width, height } => post(
                events,
                ServerEvent::FramebufferResized {
                    width: *width,
                    height: *height,
                },
            ),
            Step::Credentials => post(events, ServerEvent::CredentialRequested),
            Step::HostKey => post(events, ServerEvent::HostKeyVerificationRequested),
            Step::Wait { ms } => return Some(Duration::from_millis(*ms)),
        }
        None
    }
}

fn rect([left, top, right, bottom]: [i32; 4]) -> Rect {
    Rect::from_edges(left, top, right, bottom)
}

fn post(events: &StateSender, event: ServerEvent) {
    if let Err(e) = events.send(event) {
        warn!("Script event not delivered: {}", e);
    }
}
