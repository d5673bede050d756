//! Frame state shared between the controller and the render surface.
//!
//! [`FrameState`] tracks the window (view) size, the remote framebuffer size
//! and the current zoom/pan. The renderer reads it; the controller mutates it
//! on layout changes, framebuffer resizes and zoom resets.

use rfb_common::{Ratio, Size};
use std::fmt;
use tracing::{debug, trace};

/// Configuration for zoom behaviour.
#[derive(Debug, Clone)]
pub struct ZoomConfig {
    /// Minimum zoom level (1.0 = fit)
    pub min_zoom: f64,
    /// Maximum zoom level
    pub max_zoom: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 5.0,
        }
    }
}

/// Window, framebuffer and zoom/pan state.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    config_min: f64,
    config_max: f64,
    window: Size,
    framebuffer: Size,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame(win={}x{}, fb={}x{}, zoom={:.2}, pan={:.1},{:.1})",
            self.window.width,
            self.window.height,
            self.framebuffer.width,
            self.framebuffer.height,
            self.zoom,
            self.pan_x,
            self.pan_y
        )
    }
}

impl FrameState {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config_min: config.min_zoom,
            config_max: config.max_zoom,
            window: Size::default(),
            framebuffer: Size::default(),
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    /// Set the window size (called on frame-view layout)
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        if self.window != Size::new(width, height) {
            debug!("Frame window size changed to {}x{}", width, height);
            self.window = Size::new(width, height);
        }
    }

    /// Set the framebuffer size (called when the server reports a new desktop size)
    pub fn set_framebuffer_size(&mut self, width: u32, height: u32) {
        if self.framebuffer != Size::new(width, height) {
            debug!("Framebuffer size changed to {}x{}", width, height);
            self.framebuffer = Size::new(width, height);
        }
    }

    pub fn window_size(&self) -> Size {
        self.window
    }

    pub fn framebuffer_size(&self) -> Size {
        self.framebuffer
    }

    /// Framebuffer width:height, `None` until the server has reported a size.
    pub fn framebuffer_aspect(&self) -> Option<Ratio> {
        self.framebuffer.aspect_ratio()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    /// Set zoom level (clamped to configured min/max)
    pub fn set_zoom(&mut self, zoom: f64) {
        let clamped = zoom.clamp(self.config_min, self.config_max);
        if (self.zoom - clamped).abs() > f64::EPSILON {
            trace!("Zoom changed from {:.2} to {:.2}", self.zoom, clamped);
            self.zoom = clamped;
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Reset zoom to 1.0 and drop any pan offset
    pub fn reset_zoom(&mut self) {
        debug!("Resetting zoom");
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}
