mod common;

use common::{harness, harness_with, profile};
use platform_input::{DeviceId, KeyAction, KeyCode, KeyEvent, TouchAction, TouchEvent};
use pretty_assertions::assert_eq;
use rfb_common::{Point, Rect, Size};
use rfb_display::LayoutSnapshot;
use rfb_session::{ServerProfile, SessionAction};
use rvncsession::mock::{HostCall, MOUSE_DEVICE};
use rvncsession::{ToolbarAction, ViewerPrefs};

const KEYBOARD: DeviceId = DeviceId(1);

fn back(action: KeyAction, device: DeviceId) -> KeyEvent {
    KeyEvent::new(KeyCode::Back, action, device)
}

fn frame(visible_bottom: i32) -> LayoutSnapshot {
    LayoutSnapshot {
        visible_frame: Rect::from_edges(0, 0, 1080, visible_bottom),
        root_origin: Point::new(0, 0),
        root_bounds: Rect::from_edges(0, 0, 1080, 1920),
    }
}

#[test]
fn mouse_back_is_swallowed_on_both_edges() {
    let mut h = harness(ViewerPrefs::default());
    assert!(h.controller.on_key_event(&back(KeyAction::Down, MOUSE_DEVICE)));
    assert!(h.controller.on_key_event(&back(KeyAction::Up, MOUSE_DEVICE)));
    assert_eq!(h.host.dispatched(), vec![SessionAction::MouseBack]);
}

#[test]
fn keyboard_back_goes_to_host() {
    let mut h = harness(ViewerPrefs::default());
    assert!(!h.controller.on_key_event(&back(KeyAction::Down, KEYBOARD)));
    assert!(!h.controller.on_key_event(&back(KeyAction::Up, KEYBOARD)));
    assert!(h.host.dispatched().is_empty());
}

#[test]
fn mouse_back_interception_can_be_disabled() {
    let mut prefs = ViewerPrefs::default();
    prefs.input.intercept_mouse_back = false;
    let mut h = harness(prefs);
    assert!(!h.controller.on_key_event(&back(KeyAction::Down, MOUSE_DEVICE)));
    assert!(h.host.dispatched().is_empty());
}

#[test]
fn printable_keys_are_forwarded_as_keysyms() {
    let mut h = harness(ViewerPrefs::default());
    let a = KeyCode::Char('a');
    assert!(h.controller.on_key_event(&KeyEvent::new(a, KeyAction::Down, KEYBOARD)));
    assert!(h.controller.on_key_event(&KeyEvent::new(a, KeyAction::Up, KEYBOARD)));
    assert_eq!(
        h.host.dispatched(),
        vec![
            SessionAction::Key { keysym: 0x61, down: true },
            SessionAction::Key { keysym: 0x61, down: false },
        ]
    );
}

#[test]
fn view_only_session_sends_no_input() {
    let view_only = ServerProfile {
        view_only: true,
        ..profile()
    };
    let mut h = harness_with(ViewerPrefs::default(), view_only);
    h.controller
        .on_key_event(&KeyEvent::new(KeyCode::Char('x'), KeyAction::Down, KEYBOARD));
    h.controller.on_key_event(&back(KeyAction::Down, MOUSE_DEVICE));
    h.controller.on_resume();

    assert_eq!(h.host.dispatched(), vec![SessionAction::SendClipboardText]);
}

#[test]
fn touch_reaches_hid_only_while_visible() {
    let mut h = harness(ViewerPrefs::default());
    h.controller.on_touch(TouchEvent::new(TouchAction::Down, 100, 100));
    h.controller.on_touch(TouchEvent::new(TouchAction::Up, 100, 100));
    assert!(h.hid.touches().is_empty());

    h.controller.on_visible();
    assert!(!h.controller.on_touch(TouchEvent::new(TouchAction::Down, 100, 100)));
    assert!(!h.controller.on_touch(TouchEvent::new(TouchAction::Move, 140, 120)));
    assert!(h.controller.on_touch(TouchEvent::new(TouchAction::Up, 140, 120)));
    assert_eq!(
        h.hid.touches(),
        vec![(1, 100, 100), (1, 140, 120), (0, 140, 120)]
    );

    h.controller.on_hidden();
    h.controller.on_touch(TouchEvent::new(TouchAction::Down, 5, 5));
    assert_eq!(h.hid.touches().len(), 3);
}

#[test]
fn frame_layout_sets_touch_area() {
    let mut h = harness(ViewerPrefs::default());
    h.controller.on_frame_view_layout(Size::new(800, 600));
    h.controller.on_visible();

    // Bottom-right corner of an 800x600 view is not a move.
    h.controller.on_touch(TouchEvent::new(TouchAction::Down, 700, 500));
    assert!(!h.controller.on_touch(TouchEvent::new(TouchAction::Up, 700, 500)));

    h.controller.on_touch(TouchEvent::new(TouchAction::Down, 100, 100));
    assert!(h.controller.on_touch(TouchEvent::new(TouchAction::Up, 100, 100)));
}

#[test]
fn obstruction_becomes_bottom_padding() {
    let mut h = harness(ViewerPrefs::default());
    h.host.clear();

    h.controller.on_display_frame_changed(frame(1620));
    assert_eq!(h.controller.geometry().bottom_inset, 300);
    assert_eq!(h.controller.geometry().height, 1620);

    h.controller.on_display_frame_changed(frame(1920));
    h.controller.on_display_frame_changed(frame(1920));
    assert_eq!(
        h.host.calls(),
        vec![
            HostCall::SetBottomPadding(300),
            HostCall::SetBottomPadding(0),
            HostCall::KeyboardClosed,
        ]
    );
}

#[test]
fn direct_panel_signal_replaces_padding_heuristic() {
    let mut h = harness(ViewerPrefs::default());
    h.controller.on_input_panel_visibility(true);
    h.controller.on_display_frame_changed(frame(1620));
    h.controller.on_display_frame_changed(frame(1920));
    assert_eq!(h.host.count(&HostCall::KeyboardClosed), 0);

    h.controller.on_input_panel_visibility(false);
    assert_eq!(h.host.count(&HostCall::KeyboardClosed), 1);
}

#[test]
fn toolbar_actions() {
    let mut h = harness(ViewerPrefs::default());
    h.host.clear();

    h.controller.on_toolbar_action(ToolbarAction::Keyboard);
    assert_eq!(
        h.host.calls(),
        vec![
            HostCall::ShowSoftKeyboard,
            HostCall::KeyboardOpened,
            HostCall::CloseDrawers,
        ]
    );

    h.host.clear();
    h.controller.frame_mut().set_zoom(2.0);
    h.controller.on_toolbar_action(ToolbarAction::ZoomReset);
    assert_eq!(h.controller.frame().zoom(), 1.0);
    assert_eq!(h.host.calls(), vec![HostCall::CloseDrawers]);

    h.host.clear();
    h.controller.on_toolbar_action(ToolbarAction::VirtualKeys);
    assert_eq!(
        h.host.calls(),
        vec![HostCall::VirtualKeysShow, HostCall::CloseDrawers]
    );

    h.controller.on_toolbar_action(ToolbarAction::Back);
    assert!(h.controller.is_terminated());
    assert_eq!(h.host.count(&HostCall::Finish), 1);
}
