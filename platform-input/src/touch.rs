//! Touch to HID sample conversion.
//!
//! A gesture is `Down`, any number of `Move`s, then `Up` or `Cancel`. Each
//! produces one [`HidEventSample`]; a cancelled gesture still ends with an
//! inactive sample so the remote side never sees a stuck finger.

use passthrough_hal::{HidEventSample, TouchPhase};
use rfb_common::Size;
use tracing::trace;

/// Reference size used until the host reports the touch view's size.
pub const FALLBACK_TOUCH_AREA: Size = Size::new(1920, 1080);

/// Distance from the right and bottom edges inside which a release counts
/// as a tap rather than the end of a drag.
pub const EDGE_MARGIN: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single-pointer touch event in touch view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub x: i32,
    pub y: i32,
}

impl TouchEvent {
    pub const fn new(action: TouchAction, x: i32, y: i32) -> Self {
        Self { action, x, y }
    }
}

/// What the listener produced for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchOutcome {
    /// Sample to forward to the bridge, if any.
    pub sample: Option<HidEventSample>,
    /// The event was fully handled and must not reach the host's default
    /// touch handling.
    pub consumed: bool,
}

impl TouchOutcome {
    const IGNORED: Self = Self {
        sample: None,
        consumed: false,
    };

    fn emit(sample: HidEventSample, consumed: bool) -> Self {
        Self {
            sample: Some(sample),
            consumed,
        }
    }
}

#[derive(Debug)]
pub struct TouchBridgeListener {
    area: Size,
    in_gesture: bool,
    last: (i32, i32),
}

impl Default for TouchBridgeListener {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchBridgeListener {
    pub fn new() -> Self {
        Self {
            area: FALLBACK_TOUCH_AREA,
            in_gesture: false,
            last: (0, 0),
        }
    }

    /// Size of the touch view. An empty size restores the fallback.
    pub fn set_touch_area(&mut self, area: Size) {
        self.area = if area.is_empty() {
            FALLBACK_TOUCH_AREA
        } else {
            area
        };
    }

    pub fn touch_area(&self) -> Size {
        self.area
    }

    pub fn in_gesture(&self) -> bool {
        self.in_gesture
    }

    pub fn on_touch(&mut self, event: TouchEvent) -> TouchOutcome {
        let outcome = match event.action {
            TouchAction::Down => {
                self.in_gesture = true;
                self.last = (event.x, event.y);
                TouchOutcome::emit(HidEventSample::new(TouchPhase::Down, event.x, event.y), false)
            }
            TouchAction::Move => {
                // A move with no preceding down opens the gesture.
                let phase = if self.in_gesture {
                    TouchPhase::Move
                } else {
                    TouchPhase::Down
                };
                self.in_gesture = true;
                self.last = (event.x, event.y);
                TouchOutcome::emit(HidEventSample::new(phase, event.x, event.y), false)
            }
            TouchAction::Up => {
                if !self.in_gesture {
                    return TouchOutcome::IGNORED;
                }
                self.in_gesture = false;
                self.last = (event.x, event.y);
                let consumed = self.is_move(event.x, event.y);
                TouchOutcome::emit(HidEventSample::new(TouchPhase::Up, event.x, event.y), consumed)
            }
            TouchAction::Cancel => {
                if !self.in_gesture {
                    return TouchOutcome::IGNORED;
                }
                self.in_gesture = false;
                let (x, y) = self.last;
                TouchOutcome::emit(HidEventSample::new(TouchPhase::Up, x, y), false)
            }
        };
        trace!("Touch {:?} -> {:?}", event, outcome);
        outcome
    }

    /// Releases away from the bottom-right corner are treated as movement.
    fn is_move(&self, x: i32, y: i32) -> bool {
        let limit_x = i64::from(self.area.width) - i64::from(EDGE_MARGIN);
        let limit_y = i64::from(self.area.height) - i64::from(EDGE_MARGIN);
        i64::from(x).abs() <= limit_x || i64::from(y).abs() <= limit_y
    }
}
