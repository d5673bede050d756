#![allow(dead_code)]

use passthrough_hal::mock::{MockHidService, MockTvInputService};
use passthrough_hal::{
    BridgeError, HidPassthroughBridge, HidService, VideoInput, VideoPassthroughSwitch,
};
use rfb_session::{ServerProfile, SessionState};
use rvncsession::mock::RecordingHost;
use rvncsession::{Hardware, LaunchParams, SessionController, ViewerPrefs};

/// A controller wired to recording collaborators and in-memory hardware.
pub struct Harness {
    pub host: RecordingHost,
    pub hid: MockHidService,
    pub tv: MockTvInputService,
    pub controller: SessionController,
}

pub fn profile() -> ServerProfile {
    ServerProfile {
        name: "office".into(),
        host: "10.0.0.5".into(),
        port: 5901,
        ..ServerProfile::default()
    }
}

pub fn harness(prefs: ViewerPrefs) -> Harness {
    harness_with(prefs, profile())
}

pub fn harness_with(prefs: ViewerPrefs, profile: ServerProfile) -> Harness {
    let host = RecordingHost::new();
    let hid = MockHidService::new();
    let tv = MockTvInputService::with_inputs(vec![VideoInput::passthrough("hdmi1")]);

    let service = hid.clone();
    let hardware = Hardware {
        bridge: HidPassthroughBridge::new(move || -> Result<Box<dyn HidService>, BridgeError> {
            Ok(Box::new(service.clone()))
        }),
        video: VideoPassthroughSwitch::new(Box::new(tv.clone())),
    };
    let params = LaunchParams {
        profile: Some(profile),
        uri: None,
    };
    let controller = SessionController::new(
        &params,
        prefs,
        Box::new(host.clone()),
        host.services(),
        hardware,
    );
    Harness {
        host,
        hid,
        tv,
        controller,
    }
}

impl Harness {
    /// Post transitions as the transport and apply them.
    pub fn drive(&mut self, states: &[SessionState]) {
        for state in states {
            self.host.post(state.clone()).unwrap();
        }
        self.controller.pump();
    }

    pub fn connect(&mut self) {
        self.drive(&[SessionState::Connecting, SessionState::Connected]);
    }
}
