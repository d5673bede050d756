mod common;

use common::harness;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rfb_common::Ratio;
use rfb_session::{ServerEvent, SessionState};
use rvncsession::mock::HostCall;
use rvncsession::ViewerPrefs;

fn pip_prefs(enabled: bool) -> ViewerPrefs {
    let mut prefs = ViewerPrefs::default();
    prefs.viewer.pip_enabled = enabled;
    prefs
}

fn pip_requests(calls: &[HostCall]) -> Vec<Ratio> {
    calls
        .iter()
        .filter_map(|c| match c {
            HostCall::EnterPip(aspect) => Some(*aspect),
            _ => None,
        })
        .collect()
}

fn resize(h: &mut common::Harness, width: u16, height: u16) {
    h.controller
        .state_sender()
        .send(ServerEvent::FramebufferResized { width, height })
        .unwrap();
    h.controller.pump();
}

#[test]
fn pip_uses_framebuffer_aspect() {
    let mut h = harness(pip_prefs(true));
    h.connect();
    resize(&mut h, 1920, 1080);

    h.controller.on_user_leave_hint();
    assert_eq!(pip_requests(&h.host.calls()), vec![Ratio::new(16, 9).unwrap()]);
}

#[test]
fn pip_disabled_by_pref() {
    let mut h = harness(pip_prefs(false));
    h.connect();
    resize(&mut h, 1280, 800);
    h.controller.on_user_leave_hint();
    assert!(pip_requests(&h.host.calls()).is_empty());
}

#[test]
fn pip_only_while_connected() {
    let mut h = harness(pip_prefs(true));
    resize(&mut h, 1280, 800);
    h.drive(&[SessionState::Connecting]);
    h.controller.on_user_leave_hint();
    assert!(pip_requests(&h.host.calls()).is_empty());
}

#[test]
fn pip_skipped_without_framebuffer_size() {
    let mut h = harness(pip_prefs(true));
    h.connect();
    h.controller.on_user_leave_hint();
    assert!(pip_requests(&h.host.calls()).is_empty());
}

#[test]
fn pip_refusal_is_not_fatal() {
    let mut h = harness(pip_prefs(true));
    h.host.set_refuse_pip(true);
    h.connect();
    resize(&mut h, 800, 600);

    h.controller.on_user_leave_hint();
    assert_eq!(pip_requests(&h.host.calls()), vec![Ratio::new(4, 3).unwrap()]);
    assert_eq!(h.controller.state(), &SessionState::Connected);
    assert!(!h.controller.is_in_pip());
}

#[test]
fn entering_pip_compacts_the_view() {
    let mut h = harness(pip_prefs(true));
    h.controller.frame_mut().set_zoom(2.5);
    h.host.clear();

    h.controller.on_pip_mode_changed(true);
    assert!(h.controller.is_in_pip());
    assert_eq!(h.controller.frame().zoom(), 1.0);
    assert_eq!(
        h.host.calls(),
        vec![HostCall::CloseDrawers, HostCall::VirtualKeysHide]
    );

    h.host.clear();
    h.controller.on_pip_mode_changed(false);
    assert!(h.host.calls().is_empty());
}

proptest! {
    /// PiP is requested exactly when the pref is on and the session is
    /// connected, at the framebuffer's aspect ratio.
    #[test]
    fn pip_eligibility(
        enabled in any::<bool>(),
        progress in 0usize..4,
        width in 1u16..4000,
        height in 1u16..4000,
    ) {
        let path = [
            SessionState::Connecting,
            SessionState::Connected,
            SessionState::Disconnected("lost".into()),
        ];
        let mut h = harness(pip_prefs(enabled));
        resize(&mut h, width, height);
        h.drive(&path[..progress.min(path.len())]);
        let connected = h.controller.state().is_connected();

        h.controller.on_user_leave_hint();
        let requests = pip_requests(&h.host.calls());

        if enabled && connected {
            prop_assert_eq!(
                requests,
                vec![Ratio::new(u32::from(width), u32::from(height)).unwrap()]
            );
        } else {
            prop_assert!(requests.is_empty());
        }
    }
}
