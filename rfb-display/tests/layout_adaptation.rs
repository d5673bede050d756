//! Layout adaptation scenarios: keyboard overlap, rotation and split-screen.

use pretty_assertions::assert_eq;
use rfb_common::{Point, Rect};
use rfb_display::{GeometryTracker, LayoutSnapshot, ViewportGeometry};

fn portrait(visible_bottom: i32) -> LayoutSnapshot {
    LayoutSnapshot {
        visible_frame: Rect::from_edges(0, 0, 1080, visible_bottom),
        root_origin: Point::new(0, 0),
        root_bounds: Rect::from_edges(0, 0, 1080, 2000),
    }
}

#[test]
fn test_keyboard_open_close_cycle() {
    let mut tracker = GeometryTracker::new();

    let open = tracker.on_display_frame_changed(portrait(1200));
    assert_eq!(
        open.geometry,
        ViewportGeometry {
            width: 1080,
            height: 1200,
            bottom_inset: 800,
        }
    );

    // Keyboard switches layout (emoji panel is taller)
    let taller = tracker.on_display_frame_changed(portrait(1000));
    assert_eq!(taller.geometry.bottom_inset, 1000);
    assert!(!taller.keyboard_closed);

    let closed = tracker.on_display_frame_changed(portrait(2000));
    assert!(closed.keyboard_closed);
    assert_eq!(tracker.bottom_padding(), 0);
}

#[test]
fn test_rotation_recomputes_width() {
    let mut tracker = GeometryTracker::new();
    tracker.on_display_frame_changed(portrait(2000));

    let landscape = tracker.on_display_frame_changed(LayoutSnapshot {
        visible_frame: Rect::from_edges(0, 0, 2000, 1080),
        root_origin: Point::new(0, 0),
        root_bounds: Rect::from_edges(0, 0, 2000, 1080),
    });
    assert_eq!(landscape.geometry.width, 2000);
    assert_eq!(landscape.geometry.height, 1080);
    assert!(!landscape.keyboard_closed);
}

#[test]
fn test_split_screen_lower_half() {
    // Window occupies the lower half of a 2000px tall display.
    let mut tracker = GeometryTracker::new();
    let change = tracker.on_display_frame_changed(LayoutSnapshot {
        visible_frame: Rect::from_edges(0, 1010, 1080, 2000),
        root_origin: Point::new(0, 1010),
        root_bounds: Rect::from_edges(0, 0, 1080, 990),
    });
    assert_eq!(change.geometry.bottom_inset, 0);
    assert_eq!(change.geometry.height, 990);
}
