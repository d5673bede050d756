mod common;

use std::time::{Duration, Instant};

use common::harness;
use pretty_assertions::assert_eq;
use rfb_session::SessionState;
use rvncsession::mock::HostCall;
use rvncsession::{SystemUiFlags, ViewerPrefs, DRAWER_HINT_DURATION};

fn immersive_prefs() -> ViewerPrefs {
    let mut prefs = ViewerPrefs::default();
    prefs.viewer.fullscreen = true;
    prefs.experimental.immersive_mode = true;
    prefs
}

#[test]
fn first_connection_shows_drawer_hint() {
    let mut h = harness(ViewerPrefs::default());
    h.host.clear();
    let before = Instant::now();
    h.connect();

    assert_eq!(h.host.count(&HostCall::OpenDrawer), 1);
    assert_eq!(h.host.count(&HostCall::SetMetaKeyCapture(true)), 1);

    h.controller.on_tick(before + Duration::from_millis(100));
    assert_eq!(h.host.count(&HostCall::CloseDrawers), 0);

    h.controller
        .on_tick(Instant::now() + DRAWER_HINT_DURATION + Duration::from_millis(1));
    assert_eq!(h.host.count(&HostCall::CloseDrawers), 1);

    // The hint is one-shot.
    h.controller.on_tick(Instant::now() + Duration::from_secs(10));
    assert_eq!(h.host.count(&HostCall::CloseDrawers), 1);
}

#[test]
fn later_connections_skip_drawer_hint() {
    let mut h = harness(ViewerPrefs::default());
    h.host.set_connected_before(true);
    h.connect();
    assert_eq!(h.host.count(&HostCall::OpenDrawer), 0);
    assert_eq!(h.host.count(&HostCall::SetMetaKeyCapture(true)), 1);
}

#[test]
fn meta_capture_follows_connection() {
    let mut h = harness(ViewerPrefs::default());
    h.host.clear();
    h.drive(&[SessionState::Connecting]);
    assert_eq!(h.host.calls(), vec![HostCall::SetMetaKeyCapture(false)]);

    h.drive(&[
        SessionState::Connected,
        SessionState::Disconnected("server closed connection".into()),
    ]);
    let capture: Vec<HostCall> = h
        .host
        .calls()
        .into_iter()
        .filter(|c| matches!(c, HostCall::SetMetaKeyCapture(_)))
        .collect();
    assert_eq!(
        capture,
        vec![
            HostCall::SetMetaKeyCapture(false),
            HostCall::SetMetaKeyCapture(true),
            HostCall::SetMetaKeyCapture(false),
        ]
    );
    assert_eq!(
        h.host.count(&HostCall::ShowDisconnected("server closed connection".into())),
        1
    );
}

#[test]
fn immersive_flags_only_while_connected() {
    let mut h = harness(immersive_prefs());
    h.host.set_ui_flags(SystemUiFlags::LAYOUT_STABLE);

    h.drive(&[SessionState::Connecting]);
    assert_eq!(h.host.ui_flags(), SystemUiFlags::LAYOUT_STABLE);

    h.drive(&[SessionState::Connected]);
    assert_eq!(
        h.host.ui_flags(),
        SystemUiFlags::LAYOUT_STABLE | SystemUiFlags::IMMERSIVE
    );

    h.drive(&[SessionState::Disconnected("bye".into())]);
    assert_eq!(h.host.ui_flags(), SystemUiFlags::LAYOUT_STABLE);
}

#[test]
fn immersive_needs_both_prefs() {
    let mut prefs = immersive_prefs();
    prefs.viewer.fullscreen = false;
    let mut h = harness(prefs);
    h.connect();
    assert!(!h.host.ui_flags().intersects(SystemUiFlags::IMMERSIVE));
}

#[test]
fn focus_gain_restores_immersive_flags() {
    let mut h = harness(immersive_prefs());
    h.connect();

    // The host dropped the flags, e.g. after a system dialog.
    h.host.set_ui_flags(SystemUiFlags::empty());
    h.controller.on_window_focus_changed(false);
    assert_eq!(h.host.ui_flags(), SystemUiFlags::empty());

    h.controller.on_window_focus_changed(true);
    assert_eq!(h.host.ui_flags(), SystemUiFlags::IMMERSIVE);

    h.host.set_ui_flags(SystemUiFlags::empty());
    h.controller.on_system_ui_visibility_changed();
    assert_eq!(h.host.ui_flags(), SystemUiFlags::IMMERSIVE);
}

#[test]
fn illegal_and_duplicate_transitions_are_dropped() {
    let mut h = harness(ViewerPrefs::default());
    h.drive(&[SessionState::Connected]);
    assert_eq!(h.controller.state(), &SessionState::Idle);

    h.host.clear();
    h.drive(&[SessionState::Connecting, SessionState::Connecting]);
    assert_eq!(h.host.count(&HostCall::SetMetaKeyCapture(false)), 1);

    h.drive(&[
        SessionState::Disconnected("refused".into()),
        SessionState::Connected,
    ]);
    assert_eq!(
        h.controller.state(),
        &SessionState::Disconnected("refused".into())
    );
}

#[test]
fn server_requests_open_dialogs() {
    let mut h = harness(ViewerPrefs::default());
    let events = h.controller.state_sender();
    events
        .send(rfb_session::ServerEvent::CredentialRequested)
        .unwrap();
    events
        .send(rfb_session::ServerEvent::HostKeyVerificationRequested)
        .unwrap();
    h.controller.pump();

    assert_eq!(h.host.count(&HostCall::ShowCredentialDialog), 1);
    assert_eq!(h.host.count(&HostCall::ShowHostKeyDialog), 1);
}
