//! Viewport geometry derived from host display-frame notifications.
//!
//! When a system surface such as a soft keyboard covers the bottom of the
//! window, the host reports a smaller visible display frame. The tracker turns
//! that into a bottom padding for the root view, so the render viewport shrinks
//! to the unobstructed area.
//!
//! The visible frame arrives in display coordinates. The root view may be
//! letterboxed by a display cutout, so the frame is first translated into the
//! root view's own coordinate space.

use rfb_common::{Point, Rect};
use tracing::{debug, trace};

/// One display-frame notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSnapshot {
    /// Visible (unobstructed) display frame, in display coordinates.
    pub visible_frame: Rect,
    /// Root view's top-left corner on screen.
    pub root_origin: Point,
    /// Root view bounds in its parent's coordinates.
    pub root_bounds: Rect,
}

/// Unobstructed viewport size plus the amount covered at the bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportGeometry {
    pub width: u32,
    pub height: u32,
    pub bottom_inset: u32,
}

/// Result of processing one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChange {
    pub geometry: ViewportGeometry,
    /// The bottom padding differs from the previously applied one.
    pub padding_changed: bool,
    /// Heuristic: the inset just went from nonzero to zero, so an on-screen
    /// input panel probably closed.
    pub keyboard_closed: bool,
}

/// Tracks bottom obstruction and input-panel visibility.
#[derive(Debug, Default)]
pub struct GeometryTracker {
    geometry: ViewportGeometry,
    /// Set once the host has delivered a direct input-panel signal; from then
    /// on the padding heuristic no longer reports keyboard closes.
    direct_panel_signal: bool,
    panel_visible: bool,
}

impl GeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self) -> ViewportGeometry {
        self.geometry
    }

    pub fn bottom_padding(&self) -> u32 {
        self.geometry.bottom_inset
    }

    /// Process a display-frame change.
    pub fn on_display_frame_changed(&mut self, snapshot: LayoutSnapshot) -> LayoutChange {
        let visible = snapshot.visible_frame.relative_to(snapshot.root_origin);
        let inset = (snapshot.root_bounds.bottom() - visible.bottom()).max(0) as u32;
        let previous = self.geometry.bottom_inset;

        let geometry = ViewportGeometry {
            width: snapshot.root_bounds.width,
            height: snapshot.root_bounds.height.saturating_sub(inset),
            bottom_inset: inset,
        };
        trace!(
            "Visible frame {:?} (root-relative {:?}) -> {:?}",
            snapshot.visible_frame,
            visible,
            geometry
        );

        let keyboard_closed = inset == 0 && previous != 0 && !self.direct_panel_signal;
        if keyboard_closed {
            debug!("Bottom inset cleared ({}px -> 0), assuming keyboard closed", previous);
        }

        self.geometry = geometry;
        LayoutChange {
            geometry,
            padding_changed: inset != previous,
            keyboard_closed,
        }
    }

    /// Direct input-panel visibility from the host, when it has one.
    ///
    /// Returns true when this signal means the panel just closed.
    pub fn on_input_panel_visibility(&mut self, visible: bool) -> bool {
        if !self.direct_panel_signal {
            debug!("Host provides input-panel visibility, disabling inset heuristic");
            self.direct_panel_signal = true;
        }
        let closed = self.panel_visible && !visible;
        self.panel_visible = visible;
        closed
    }
}
