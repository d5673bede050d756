//! platform-input: route host key and touch events for a session view.
//!
//! This crate provides [`InputRouter`]. Keys go to the session's forwarding
//! path first and then to a short table of device workarounds. Touches are
//! converted to HID samples and handed to the passthrough bridge.

#![forbid(unsafe_code)]

mod keyboard;
mod touch;
mod workarounds;

use bitflags::bitflags;
use passthrough_hal::{BridgeError, HidPassthroughBridge};
use rfb_session::SessionAction;
use tracing::{debug, warn};

pub use keyboard::{keysyms, map_key_code_to_keysym, KeyCode, KeyForwarder, KeysymForwarder, Modifier};
pub use touch::{
    TouchAction, TouchBridgeListener, TouchEvent, TouchOutcome, EDGE_MARGIN, FALLBACK_TOUCH_AREA,
};

bitflags! {
    /// Input source classes a device reports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputSource: u32 {
        const KEYBOARD    = 1 << 0;
        const DPAD        = 1 << 1;
        const GAMEPAD     = 1 << 2;
        const TOUCHSCREEN = 1 << 3;
        const MOUSE       = 1 << 4;
        const STYLUS      = 1 << 5;
        const TOUCHPAD    = 1 << 6;
    }
}

/// Host identifier of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
    /// One event standing for `repeat` presses (or committed text).
    Multiple { repeat: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub action: KeyAction,
    pub device: DeviceId,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, action: KeyAction, device: DeviceId) -> Self {
        Self {
            code,
            action,
            device,
        }
    }
}

/// Source lookup for input devices.
pub trait InputDevices {
    /// Sources reported by `device`, empty if it is unknown.
    fn sources(&self, device: DeviceId) -> InputSource;

    fn supports_source(&self, device: DeviceId, source: InputSource) -> bool {
        self.sources(device).contains(source)
    }
}

impl<F> InputDevices for F
where
    F: Fn(DeviceId) -> InputSource,
{
    fn sources(&self, device: DeviceId) -> InputSource {
        self(device)
    }
}

/// User-tunable routing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputConfig {
    /// Turn a mouse's back button into a remote mouse-back press.
    pub intercept_mouse_back: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            intercept_mouse_back: true,
        }
    }
}

/// Which stage handled a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandler {
    Forwarder,
    Workaround,
    /// Not consumed; the host applies its default handling.
    Host,
}

/// Result of routing one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDispatch {
    pub handler: KeyHandler,
    pub actions: Vec<SessionAction>,
}

impl KeyDispatch {
    pub fn is_consumed(&self) -> bool {
        self.handler != KeyHandler::Host
    }
}

/// Result of routing one touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchDispatch {
    pub consumed: bool,
    /// The sample reached the bridge.
    pub forwarded: bool,
}

/// Key and touch router for a session view.
pub struct InputRouter {
    forwarder: Box<dyn KeyForwarder>,
    devices: Box<dyn InputDevices>,
    config: InputConfig,
    touch: TouchBridgeListener,
}

impl std::fmt::Debug for InputRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRouter")
            .field("config", &self.config)
            .field("touch", &self.touch)
            .finish()
    }
}

impl InputRouter {
    pub fn new(
        forwarder: impl KeyForwarder + 'static,
        devices: Box<dyn InputDevices>,
        config: InputConfig,
    ) -> Self {
        Self {
            forwarder: Box::new(forwarder),
            devices,
            config,
            touch: TouchBridgeListener::new(),
        }
    }

    pub fn config(&self) -> InputConfig {
        self.config
    }

    pub fn touch_listener_mut(&mut self) -> &mut TouchBridgeListener {
        &mut self.touch
    }

    /// Route a key event.
    ///
    /// Repeated/multiple events only go through the forwarding path.
    pub fn on_key_event(&mut self, event: &KeyEvent) -> KeyDispatch {
        let mut actions = Vec::new();

        if self.forwarder.forward(event, &mut actions) {
            return KeyDispatch {
                handler: KeyHandler::Forwarder,
                actions,
            };
        }
        if matches!(event.action, KeyAction::Multiple { .. }) {
            return KeyDispatch {
                handler: KeyHandler::Host,
                actions,
            };
        }

        let sources = self.devices.sources(event.device);
        for workaround in workarounds::WORKAROUNDS {
            if workaround(event, sources, &self.config, &mut actions) {
                return KeyDispatch {
                    handler: KeyHandler::Workaround,
                    actions,
                };
            }
        }

        debug!("Key {:?} left to host", event.code);
        KeyDispatch {
            handler: KeyHandler::Host,
            actions,
        }
    }

    /// Convert a touch event and forward the sample to `bridge`.
    ///
    /// Bridge failures are logged and never surface to the caller.
    pub fn on_touch(&mut self, event: TouchEvent, bridge: &mut HidPassthroughBridge) -> TouchDispatch {
        let outcome = self.touch.on_touch(event);
        let forwarded = match outcome.sample {
            Some(sample) => match bridge.write_event(sample) {
                Ok(written) => written == passthrough_hal::WriteOutcome::Forwarded,
                Err(e) => {
                    log_bridge_error(&e);
                    false
                }
            },
            None => false,
        };
        TouchDispatch {
            consumed: outcome.consumed,
            forwarded,
        }
    }
}

fn log_bridge_error(e: &BridgeError) {
    warn!("Failed to forward touch sample: {}", e);
}
