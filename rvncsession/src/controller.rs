//! Session controller.
//!
//! Owns one session instance: the state machine, the passthrough hardware,
//! the input router and the layout trackers. The adapter layer feeds it host
//! lifecycle, layout and input callbacks; it answers through the collaborator
//! traits in [`crate::host`].
//!
//! Everything runs on the controller's thread. The transport may report from
//! any thread through its [`StateSender`]; those reports are applied on the
//! next [`SessionController::pump`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use passthrough_hal::{HidPassthroughBridge, VideoPassthroughSwitch};
use platform_input::{
    InputConfig, InputDevices, InputRouter, KeyEvent, KeysymForwarder, TouchEvent,
};
use rfb_common::Size;
use rfb_display::{FrameState, GeometryTracker, LayoutSnapshot, ViewportGeometry, ZoomConfig};
use rfb_session::{
    ServerEvent, ServerProfile, SessionAction, SessionState, SessionStateMachine, StateSender,
    SubscriptionId, Transport,
};
use tracing::{debug, info, warn};

use crate::host::{Relauncher, RenderSurface, RunInfo, SystemUiFlags, UiHost, VirtualKeys};
use crate::prefs::ViewerPrefs;

/// How long the toolbar drawer stays open after the first ever connection.
pub const DRAWER_HINT_DURATION: Duration = Duration::from_millis(1500);

/// What the session was launched with.
#[derive(Debug, Clone, Default)]
pub struct LaunchParams {
    pub profile: Option<ServerProfile>,
    /// `vnc://` URI, used when no profile was supplied.
    pub uri: Option<String>,
}

/// Resolve the launch profile, falling back to the default one.
pub fn load_profile(params: &LaunchParams) -> ServerProfile {
    if let Some(profile) = &params.profile {
        return profile.clone();
    }
    match params.uri.as_deref().map(ServerProfile::from_uri) {
        Some(Ok(profile)) => profile,
        Some(Err(e)) => {
            warn!("Ignoring launch URI: {}, using default profile", e);
            ServerProfile::default()
        }
        None => {
            warn!("No server profile supplied, using default profile");
            ServerProfile::default()
        }
    }
}

/// Host-side collaborators.
pub struct HostServices {
    pub ui: Box<dyn UiHost>,
    pub virtual_keys: Box<dyn VirtualKeys>,
    pub run_info: Box<dyn RunInfo>,
    pub relauncher: Box<dyn Relauncher>,
    pub devices: Box<dyn InputDevices>,
}

/// Passthrough hardware owned by the session.
pub struct Hardware {
    pub bridge: HidPassthroughBridge,
    pub video: VideoPassthroughSwitch,
}

impl Hardware {
    /// Neither hardware service exists on this host.
    pub fn unavailable() -> Self {
        Self {
            bridge: HidPassthroughBridge::unavailable(),
            video: VideoPassthroughSwitch::unavailable(),
        }
    }
}

/// Toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Keyboard,
    ZoomReset,
    VirtualKeys,
    Back,
}

pub struct SessionController {
    /// Launch profile. Never mutated; retries relaunch with a clone.
    profile: ServerProfile,
    prefs: ViewerPrefs,

    machine: SessionStateMachine,
    transitions: Rc<RefCell<VecDeque<SessionState>>>,
    transport: Box<dyn Transport>,

    ui: Box<dyn UiHost>,
    virtual_keys: Box<dyn VirtualKeys>,
    run_info: Box<dyn RunInfo>,
    relauncher: Box<dyn Relauncher>,
    surface: Option<Box<dyn RenderSurface>>,

    router: InputRouter,
    bridge: HidPassthroughBridge,
    video: VideoPassthroughSwitch,

    geometry: GeometryTracker,
    frame: FrameState,

    visible: bool,
    in_pip: bool,
    terminated: bool,
    drawer_deadline: Option<Instant>,
}

impl SessionController {
    /// Build the controller and start connecting.
    ///
    /// The controller's own observer is registered before the transport is
    /// started, so the first transition is never missed.
    pub fn new(
        params: &LaunchParams,
        prefs: ViewerPrefs,
        transport: Box<dyn Transport>,
        host: HostServices,
        hardware: Hardware,
    ) -> Self {
        let profile = load_profile(params);
        info!(
            "Starting session '{}' for {}",
            profile.name,
            profile.address()
        );

        let mut machine = SessionStateMachine::new();
        let transitions = Rc::new(RefCell::new(VecDeque::new()));
        let mailbox = Rc::clone(&transitions);
        machine.subscribe(move |state: &SessionState| mailbox.borrow_mut().push_back(state.clone()));

        let router = InputRouter::new(
            KeysymForwarder::new(profile.key_compat_mode),
            host.devices,
            InputConfig {
                intercept_mouse_back: prefs.input.intercept_mouse_back,
            },
        );

        let mut controller = Self {
            profile,
            prefs,
            machine,
            transitions,
            transport,
            ui: host.ui,
            virtual_keys: host.virtual_keys,
            run_info: host.run_info,
            relauncher: host.relauncher,
            surface: None,
            router,
            bridge: hardware.bridge,
            video: hardware.video,
            geometry: GeometryTracker::new(),
            frame: FrameState::new(ZoomConfig::default()),
            visible: false,
            in_pip: false,
            terminated: false,
            drawer_deadline: None,
        };
        controller.apply_window_prefs();

        let events = controller.machine.sender();
        controller.transport.start(&controller.profile, events);
        controller
    }

    fn apply_window_prefs(&mut self) {
        let viewer = &self.prefs.viewer;
        self.ui.set_requested_orientation(viewer.orientation);
        if viewer.fullscreen {
            self.ui.set_window_fullscreen(true);
        }
        self.ui.configure_toolbar(
            viewer.toolbar_alignment,
            self.prefs.experimental.swipe_close_toolbar,
        );
    }

    pub fn profile(&self) -> &ServerProfile {
        &self.profile
    }

    pub fn prefs(&self) -> &ViewerPrefs {
        &self.prefs
    }

    pub fn state(&self) -> &SessionState {
        self.machine.current()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    /// Zoom and pan are driven by the render surface's gestures.
    pub fn frame_mut(&mut self) -> &mut FrameState {
        &mut self.frame
    }

    pub fn geometry(&self) -> ViewportGeometry {
        self.geometry.geometry()
    }

    pub fn bridge(&self) -> &HidPassthroughBridge {
        &self.bridge
    }

    pub fn video(&self) -> &VideoPassthroughSwitch {
        &self.video
    }

    /// Handle the transport (and tests) use to report session progress.
    pub fn state_sender(&self) -> StateSender {
        self.machine.sender()
    }

    /// Add an observer. It sees every transition not yet pumped.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&SessionState) + 'static,
    {
        self.machine.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.machine.unsubscribe(id)
    }

    pub fn attach_surface(&mut self, mut surface: Box<dyn RenderSurface>) {
        if self.visible {
            surface.on_resume();
        }
        if self.surface.replace(surface).is_some() {
            debug!("Replaced attached render surface");
        }
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn RenderSurface>> {
        self.surface.take()
    }

    /// The session view became visible.
    ///
    /// Video passthrough and the HID bridge are brought up before the
    /// controller reports itself visible. Failures are logged only.
    pub fn on_visible(&mut self) {
        if self.visible || self.terminated {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.on_resume();
        }
        match self.video.activate() {
            Ok(channel) => debug!("Video passthrough active on {}", channel.input_id),
            Err(e) => warn!("Video passthrough not started: {}", e),
        }
        if let Err(e) = self.bridge.open() {
            warn!("HID passthrough not opened: {}", e);
        }
        self.visible = true;
        debug!("Session view visible");
    }

    /// The session view returned to the foreground.
    pub fn on_resume(&mut self) {
        if self.terminated {
            return;
        }
        self.dispatch(SessionAction::SendClipboardText);
    }

    /// The session view is no longer visible.
    ///
    /// Every teardown step runs regardless of the others failing.
    pub fn on_hidden(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;

        self.virtual_keys.release_meta_keys();
        if let Err(e) = self.video.deactivate() {
            warn!("Video passthrough reset failed: {}", e);
        }
        match self.bridge.close() {
            Ok(true) => debug!("HID passthrough closed"),
            Ok(false) => {}
            Err(e) => warn!("HID passthrough close failed: {}", e),
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.on_pause();
        }
        debug!("Session view hidden");
    }

    /// The session instance is going away.
    pub fn on_terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.on_hidden();
        self.surface = None;
        self.terminated = true;
        info!("Session terminated");
    }

    /// Start a new instance with the original profile and end this one.
    pub fn retry(&mut self) {
        if self.terminated {
            debug!("Ignoring retry on a terminated session");
            return;
        }
        info!("Retrying session to {}", self.profile.address());
        self.relauncher.relaunch(self.profile.clone());
        self.ui.finish();
        self.on_terminate();
    }

    /// Apply everything the transport reported since the last call.
    pub fn pump(&mut self) {
        for event in self.machine.drain() {
            match event {
                ServerEvent::StateChanged(_) => {}
                ServerEvent::FramebufferResized { width, height } => {
                    debug!("Framebuffer resized to {}x{}", width, height);
                    self.frame
                        .set_framebuffer_size(u32::from(width), u32::from(height));
                }
                ServerEvent::CredentialRequested => self.ui.show_credential_dialog(),
                ServerEvent::HostKeyVerificationRequested => self.ui.show_host_key_dialog(),
            }
        }

        loop {
            let next = self.transitions.borrow_mut().pop_front();
            let Some(state) = next else { break };
            self.on_state_changed(&state);
        }
    }

    fn on_state_changed(&mut self, state: &SessionState) {
        info!("Session state: {}", state);
        match state {
            SessionState::Connected => {
                if !self.run_info.has_connected_successfully() {
                    self.run_info.mark_connected_successfully();
                    self.ui.open_drawer();
                    self.drawer_deadline = Some(Instant::now() + DRAWER_HINT_DURATION);
                }
                self.ui.set_meta_key_capture(true);
            }
            SessionState::Disconnected(reason) => {
                self.ui.set_meta_key_capture(false);
                self.ui.show_disconnected(reason);
            }
            SessionState::Idle | SessionState::Connecting => {
                self.ui.set_meta_key_capture(false);
            }
        }
        self.update_immersive();
    }

    /// Timer tick. Closes the first-connection drawer hint when it is due.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(deadline) = self.drawer_deadline {
            if now >= deadline {
                self.drawer_deadline = None;
                self.ui.close_drawers();
            }
        }
    }

    fn update_immersive(&mut self) {
        let wanted = self.prefs.wants_immersive() && self.machine.current().is_connected();
        let current = self.ui.system_ui_flags();
        let next = if wanted {
            current | SystemUiFlags::IMMERSIVE
        } else {
            current - SystemUiFlags::IMMERSIVE
        };
        if next != current {
            debug!("System UI flags {:?} -> {:?}", current, next);
            self.ui.set_system_ui_flags(next);
        }
    }

    pub fn on_window_focus_changed(&mut self, has_focus: bool) {
        if has_focus {
            self.update_immersive();
        }
    }

    pub fn on_system_ui_visibility_changed(&mut self) {
        self.update_immersive();
    }

    /// The user is leaving the session view (home button, app switch).
    pub fn on_user_leave_hint(&mut self) {
        if !self.prefs.viewer.pip_enabled {
            return;
        }
        if !self.machine.current().is_connected() {
            debug!("Not entering picture-in-picture while {}", self.machine.current());
            return;
        }
        let Some(aspect) = self.frame.framebuffer_aspect() else {
            warn!("Framebuffer size unknown, not entering picture-in-picture");
            return;
        };
        match self.ui.enter_picture_in_picture(aspect) {
            Ok(()) => debug!("Requested picture-in-picture at {}", aspect),
            Err(e) => warn!("Picture-in-picture refused: {}", e),
        }
    }

    pub fn on_pip_mode_changed(&mut self, in_pip: bool) {
        self.in_pip = in_pip;
        if in_pip {
            self.ui.close_drawers();
            self.frame.reset_zoom();
            self.virtual_keys.hide();
        }
    }

    pub fn is_in_pip(&self) -> bool {
        self.in_pip
    }

    pub fn on_display_frame_changed(&mut self, snapshot: LayoutSnapshot) {
        let change = self.geometry.on_display_frame_changed(snapshot);
        if change.padding_changed {
            self.ui.set_bottom_padding(change.geometry.bottom_inset);
        }
        if change.keyboard_closed {
            self.virtual_keys.on_keyboard_close();
        }
    }

    /// Direct input-panel visibility, on hosts that report it.
    pub fn on_input_panel_visibility(&mut self, visible: bool) {
        if self.geometry.on_input_panel_visibility(visible) {
            self.virtual_keys.on_keyboard_close();
        }
    }

    /// The frame view was laid out at a new size.
    pub fn on_frame_view_layout(&mut self, size: Size) {
        self.frame.set_window_size(size.width, size.height);
        self.router.touch_listener_mut().set_touch_area(size);
    }

    /// Route a key event. Returns true if it was consumed.
    pub fn on_key_event(&mut self, event: &KeyEvent) -> bool {
        let dispatch = self.router.on_key_event(event);
        for action in dispatch.actions.iter().copied() {
            self.dispatch(action);
        }
        dispatch.is_consumed()
    }

    /// Route a touch event to the HID bridge. Returns true if it was consumed.
    pub fn on_touch(&mut self, event: TouchEvent) -> bool {
        self.router.on_touch(event, &mut self.bridge).consumed
    }

    pub fn on_toolbar_action(&mut self, action: ToolbarAction) {
        debug!("Toolbar action {:?}", action);
        match action {
            ToolbarAction::Keyboard => {
                self.ui.show_soft_keyboard();
                self.virtual_keys.on_keyboard_open();
                self.ui.close_drawers();
            }
            ToolbarAction::ZoomReset => {
                self.frame.reset_zoom();
                self.ui.close_drawers();
            }
            ToolbarAction::VirtualKeys => {
                self.virtual_keys.show();
                self.ui.close_drawers();
            }
            ToolbarAction::Back => {
                if self.terminated {
                    return;
                }
                self.ui.finish();
                self.on_terminate();
            }
        }
    }

    fn dispatch(&mut self, action: SessionAction) {
        let is_input = matches!(action, SessionAction::Key { .. } | SessionAction::MouseBack);
        if self.profile.view_only && is_input {
            debug!("View-only session, dropping {:?}", action);
            return;
        }
        self.transport.dispatch(action);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.visible {
            debug!("Session controller dropped while visible, releasing passthrough");
        }
        self.on_hidden();
        self.surface = None;
    }
}
