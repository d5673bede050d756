//! # rfb-display: viewport geometry for the remote session view
//!
//! This crate keeps the render viewport in step with what the host window can
//! actually show:
//!
//! - **Layout adaptation**: [`GeometryTracker`] turns display-frame
//!   notifications into bottom padding, so a soft keyboard shrinks the
//!   viewport instead of covering it
//! - **Frame state**: [`FrameState`] holds window size, framebuffer size and
//!   zoom/pan, read by the renderer and reset on picture-in-picture entry
//!
//! ## Example
//!
//! ```rust
//! use rfb_common::{Point, Rect};
//! use rfb_display::{GeometryTracker, LayoutSnapshot};
//!
//! let mut tracker = GeometryTracker::new();
//! let change = tracker.on_display_frame_changed(LayoutSnapshot {
//!     visible_frame: Rect::from_edges(0, 0, 600, 700),
//!     root_origin: Point::new(0, 0),
//!     root_bounds: Rect::from_edges(0, 0, 600, 1000),
//! });
//! assert_eq!(change.geometry.bottom_inset, 300);
//! ```

mod geometry;
mod viewport;

pub use geometry::{GeometryTracker, LayoutChange, LayoutSnapshot, ViewportGeometry};
pub use viewport::{FrameState, ZoomConfig};
