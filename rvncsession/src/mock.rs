//! Recording host for tests.
//!
//! [`RecordingHost`] implements every collaborator trait the controller
//! drives, plus [`Transport`], against one shared journal. Clones share the
//! journal, so a test hands clones to the controller and keeps one to assert
//! on the order of calls across collaborators.

use std::sync::Arc;

use parking_lot::Mutex;
use platform_input::{DeviceId, InputDevices, InputSource};
use rfb_common::Ratio;
use rfb_session::{
    ServerProfile, SessionAction, SessionError, SessionState, StateSender, Transport,
};

use crate::controller::HostServices;
use crate::errors::HostRefusal;
use crate::host::{Relauncher, RenderSurface, RunInfo, SystemUiFlags, UiHost, VirtualKeys};
use crate::prefs::{Orientation, ToolbarAlignment};

/// Device id the recording host reports as a mouse. Every other id is a keyboard.
pub const MOUSE_DEVICE: DeviceId = DeviceId(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    OpenDrawer,
    CloseDrawers,
    SetSystemUiFlags(SystemUiFlags),
    EnterPip(Ratio),
    SetMetaKeyCapture(bool),
    SetBottomPadding(u32),
    SetOrientation(Orientation),
    SetWindowFullscreen(bool),
    ConfigureToolbar(ToolbarAlignment, bool),
    ShowSoftKeyboard,
    ShowCredentialDialog,
    ShowHostKeyDialog,
    ShowDisconnected(String),
    Finish,
    VirtualKeysShow,
    VirtualKeysHide,
    ReleaseMetaKeys,
    KeyboardOpened,
    KeyboardClosed,
    SurfaceResume,
    SurfacePause,
    Relaunch(ServerProfile),
    TransportStart(ServerProfile),
    Dispatch(SessionAction),
}

#[derive(Default)]
struct Journal {
    calls: Vec<HostCall>,
    ui_flags: SystemUiFlags,
    connected_before: bool,
    refuse_pip: bool,
    events: Option<StateSender>,
}

#[derive(Clone, Default)]
pub struct RecordingHost {
    inner: Arc<Mutex<Journal>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborators for a controller, all recording into this journal.
    pub fn services(&self) -> HostServices {
        HostServices {
            ui: Box::new(self.clone()),
            virtual_keys: Box::new(self.clone()),
            run_info: Box::new(self.clone()),
            relauncher: Box::new(self.clone()),
            devices: Box::new(self.clone()),
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.inner.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.inner.lock().calls.clear();
    }

    /// Actions the controller dispatched to the transport, in order.
    pub fn dispatched(&self) -> Vec<SessionAction> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Dispatch(action) => Some(*action),
                _ => None,
            })
            .collect()
    }

    pub fn ui_flags(&self) -> SystemUiFlags {
        self.inner.lock().ui_flags
    }

    pub fn set_ui_flags(&self, flags: SystemUiFlags) {
        self.inner.lock().ui_flags = flags;
    }

    pub fn set_connected_before(&self, connected: bool) {
        self.inner.lock().connected_before = connected;
    }

    pub fn set_refuse_pip(&self, refuse: bool) {
        self.inner.lock().refuse_pip = refuse;
    }

    /// Report a transition the way a transport would.
    pub fn post(&self, state: SessionState) -> Result<(), SessionError> {
        let events = self.inner.lock().events.clone();
        events.ok_or(SessionError::ChannelClosed)?.transition(state)
    }

    pub fn sender(&self) -> Option<StateSender> {
        self.inner.lock().events.clone()
    }

    fn record(&self, call: HostCall) {
        self.inner.lock().calls.push(call);
    }
}

impl UiHost for RecordingHost {
    fn open_drawer(&mut self) {
        self.record(HostCall::OpenDrawer);
    }

    fn close_drawers(&mut self) {
        self.record(HostCall::CloseDrawers);
    }

    fn system_ui_flags(&self) -> SystemUiFlags {
        self.inner.lock().ui_flags
    }

    fn set_system_ui_flags(&mut self, flags: SystemUiFlags) {
        let mut journal = self.inner.lock();
        journal.ui_flags = flags;
        journal.calls.push(HostCall::SetSystemUiFlags(flags));
    }

    fn enter_picture_in_picture(&mut self, aspect: Ratio) -> Result<(), HostRefusal> {
        let mut journal = self.inner.lock();
        journal.calls.push(HostCall::EnterPip(aspect));
        if journal.refuse_pip {
            return Err(HostRefusal::Unsupported);
        }
        Ok(())
    }

    fn set_meta_key_capture(&mut self, enabled: bool) {
        self.record(HostCall::SetMetaKeyCapture(enabled));
    }

    fn set_bottom_padding(&mut self, padding: u32) {
        self.record(HostCall::SetBottomPadding(padding));
    }

    fn set_requested_orientation(&mut self, orientation: Orientation) {
        self.record(HostCall::SetOrientation(orientation));
    }

    fn set_window_fullscreen(&mut self, fullscreen: bool) {
        self.record(HostCall::SetWindowFullscreen(fullscreen));
    }

    fn configure_toolbar(&mut self, alignment: ToolbarAlignment, swipe_to_close: bool) {
        self.record(HostCall::ConfigureToolbar(alignment, swipe_to_close));
    }

    fn show_soft_keyboard(&mut self) {
        self.record(HostCall::ShowSoftKeyboard);
    }

    fn show_credential_dialog(&mut self) {
        self.record(HostCall::ShowCredentialDialog);
    }

    fn show_host_key_dialog(&mut self) {
        self.record(HostCall::ShowHostKeyDialog);
    }

    fn show_disconnected(&mut self, reason: &str) {
        self.record(HostCall::ShowDisconnected(reason.to_string()));
    }

    fn finish(&mut self) {
        self.record(HostCall::Finish);
    }
}

impl VirtualKeys for RecordingHost {
    fn show(&mut self) {
        self.record(HostCall::VirtualKeysShow);
    }

    fn hide(&mut self) {
        self.record(HostCall::VirtualKeysHide);
    }

    fn release_meta_keys(&mut self) {
        self.record(HostCall::ReleaseMetaKeys);
    }

    fn on_keyboard_open(&mut self) {
        self.record(HostCall::KeyboardOpened);
    }

    fn on_keyboard_close(&mut self) {
        self.record(HostCall::KeyboardClosed);
    }
}

impl RunInfo for RecordingHost {
    fn has_connected_successfully(&self) -> bool {
        self.inner.lock().connected_before
    }

    fn mark_connected_successfully(&mut self) {
        self.inner.lock().connected_before = true;
    }
}

impl RenderSurface for RecordingHost {
    fn on_resume(&mut self) {
        self.record(HostCall::SurfaceResume);
    }

    fn on_pause(&mut self) {
        self.record(HostCall::SurfacePause);
    }
}

impl Relauncher for RecordingHost {
    fn relaunch(&mut self, profile: ServerProfile) {
        self.record(HostCall::Relaunch(profile));
    }
}

impl InputDevices for RecordingHost {
    fn sources(&self, device: DeviceId) -> InputSource {
        if device == MOUSE_DEVICE {
            InputSource::MOUSE
        } else {
            InputSource::KEYBOARD
        }
    }
}

impl Transport for RecordingHost {
    fn start(&mut self, profile: &ServerProfile, events: StateSender) {
        let mut journal = self.inner.lock();
        journal.calls.push(HostCall::TransportStart(profile.clone()));
        journal.events = Some(events);
    }

    fn dispatch(&mut self, action: SessionAction) {
        self.record(HostCall::Dispatch(action));
    }
}
