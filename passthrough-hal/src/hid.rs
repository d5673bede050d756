//! HID passthrough bridge.
//!
//! Forwards touch samples to an external hardware input-emulation service,
//! which replays them as HID events on an attached device. The service lives
//! in another process and may not exist at all on a given device.
//!
//! Handle lifecycle: `open` acquires the service (once per bridge), opens the
//! hub and unmutes forwarding with mode byte 0. `close` mutes with mode byte
//! 1 and closes the hub. Each successful `open` is matched by exactly one
//! release, either an explicit `close` or the bridge's `Drop`.

use std::fmt;

use tracing::{debug, info, trace, warn};

use crate::errors::BridgeError;

/// Mode byte that enables passthrough forwarding.
pub const MODE_UNMUTE: u8 = 0;
/// Mode byte that disables passthrough forwarding.
pub const MODE_MUTE: u8 = 1;

/// Gesture phase of a forwarded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
}

/// Normalized pointer sample sent to the hardware service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidEventSample {
    pub phase: TouchPhase,
    pub x: i32,
    pub y: i32,
}

impl HidEventSample {
    pub const fn new(phase: TouchPhase, x: i32, y: i32) -> Self {
        Self { phase, x, y }
    }

    /// The "active" field of the wire triple: 1 while the finger is down.
    pub const fn active(&self) -> i32 {
        match self.phase {
            TouchPhase::Down | TouchPhase::Move => 1,
            TouchPhase::Up => 0,
        }
    }

    /// `(active, x, y)` as passed to `write_touch_event`.
    pub const fn to_wire(&self) -> (i32, i32, i32) {
        (self.active(), self.x, self.y)
    }
}

impl fmt::Display for HidEventSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, x, y) = self.to_wire();
        write!(f, "{{{a},{x},{y}}}")
    }
}

/// IPC surface of the hardware input-emulation service.
pub trait HidService {
    fn hub_open(&mut self) -> Result<(), BridgeError>;
    fn hub_close(&mut self) -> Result<(), BridgeError>;
    /// 0 = enable passthrough forwarding, 1 = disable.
    fn hub_write_mode(&mut self, mode: u8) -> Result<(), BridgeError>;
    fn write_touch_event(&mut self, active: i32, x: i32, y: i32) -> Result<(), BridgeError>;
}

/// Looks up the hardware service. Called at most once per bridge.
pub trait HidServiceConnector {
    fn connect(&mut self) -> Result<Box<dyn HidService>, BridgeError>;
}

impl<F> HidServiceConnector for F
where
    F: FnMut() -> Result<Box<dyn HidService>, BridgeError>,
{
    fn connect(&mut self) -> Result<Box<dyn HidService>, BridgeError> {
        self()
    }
}

/// Connection state of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// No handle held. `open` may be called.
    Closed,
    /// Hub opened; `close` (or drop) must follow.
    Open,
    /// Service lookup failed; every call is a no-op from now on.
    Unavailable,
}

/// Outcome of [`HidPassthroughBridge::write_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Forwarded,
    /// Bridge not open (or service absent); the sample was dropped.
    Skipped,
}

pub struct HidPassthroughBridge {
    connector: Box<dyn HidServiceConnector>,
    service: Option<Box<dyn HidService>>,
    state: BridgeState,
    warned_unavailable: bool,
}

impl fmt::Debug for HidPassthroughBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HidPassthroughBridge")
            .field("state", &self.state)
            .field("connected", &self.service.is_some())
            .finish()
    }
}

impl HidPassthroughBridge {
    pub fn new(connector: impl HidServiceConnector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            service: None,
            state: BridgeState::Closed,
            warned_unavailable: false,
        }
    }

    /// A bridge for devices without the hardware service.
    pub fn unavailable() -> Self {
        Self::new(|| -> Result<Box<dyn HidService>, BridgeError> {
            Err(BridgeError::ServiceUnavailable(
                "no HID passthrough service on this host".into(),
            ))
        })
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == BridgeState::Open
    }

    /// Acquire the service, open the hub and unmute forwarding.
    ///
    /// If the hub opened but the unmute failed, the bridge still counts as
    /// open and the error is returned; `close` must follow as usual.
    pub fn open(&mut self) -> Result<(), BridgeError> {
        match self.state {
            BridgeState::Unavailable => {
                return Err(BridgeError::ServiceUnavailable(
                    "lookup failed earlier".into(),
                ))
            }
            BridgeState::Open => return Err(BridgeError::AlreadyOpen),
            BridgeState::Closed => {}
        }

        if self.service.is_none() {
            match self.connector.connect() {
                Ok(service) => {
                    info!("Acquired HID passthrough service");
                    self.service = Some(service);
                }
                Err(e) => {
                    warn!("HID passthrough service lookup failed, bridge disabled: {}", e);
                    self.state = BridgeState::Unavailable;
                    return Err(e);
                }
            }
        }
        let Some(service) = self.service.as_mut() else {
            return Err(BridgeError::ServiceUnavailable("no service handle".into()));
        };

        service.hub_open()?;
        self.state = BridgeState::Open;
        debug!("HID hub opened");

        service.hub_write_mode(MODE_UNMUTE)?;
        debug!("HID passthrough unmuted");
        Ok(())
    }

    /// Mute forwarding and close the hub.
    ///
    /// The handle is released even if the mute call fails. Returns
    /// `Ok(false)` when there was nothing to close.
    pub fn close(&mut self) -> Result<bool, BridgeError> {
        if self.state != BridgeState::Open {
            debug!("HID bridge close ignored in state {:?}", self.state);
            return Ok(false);
        }
        self.state = BridgeState::Closed;

        let Some(service) = self.service.as_mut() else {
            return Ok(false);
        };
        let muted = service.hub_write_mode(MODE_MUTE);
        let closed = service.hub_close();
        debug!("HID hub closed");

        muted.and(closed).map(|()| true)
    }

    /// Forward one sample if the bridge is open.
    pub fn write_event(&mut self, sample: HidEventSample) -> Result<WriteOutcome, BridgeError> {
        match (self.state, self.service.as_mut()) {
            (BridgeState::Open, Some(service)) => {
                let (active, x, y) = sample.to_wire();
                service.write_touch_event(active, x, y)?;
                trace!("HID sample forwarded: {}", sample);
                Ok(WriteOutcome::Forwarded)
            }
            (BridgeState::Unavailable, _) => {
                if !self.warned_unavailable {
                    warn!("HID passthrough service unavailable, dropping touch samples");
                    self.warned_unavailable = true;
                }
                Ok(WriteOutcome::Skipped)
            }
            _ => {
                trace!("HID bridge not open, dropping sample {}", sample);
                Ok(WriteOutcome::Skipped)
            }
        }
    }
}

impl Drop for HidPassthroughBridge {
    fn drop(&mut self) {
        if self.state == BridgeState::Open {
            warn!("HID bridge dropped while open, releasing handle");
            if let Err(e) = self.close() {
                warn!("HID bridge release on drop failed: {}", e);
            }
        }
    }
}
