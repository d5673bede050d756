//! Console adapters used by the `rvncsession` binary.
//!
//! A desktop host has no drawer, system bars or HID hub. These adapters log
//! what the controller asks for and keep just enough state to answer its
//! queries.

use platform_input::{DeviceId, InputSource};
use rfb_common::Ratio;
use rfb_session::{ServerProfile, SessionAction, SessionState, StateSender, Transport};
use tracing::{debug, info, warn};

use crate::controller::HostServices;
use crate::errors::HostRefusal;
use crate::host::{Relauncher, RenderSurface, RunInfo, SystemUiFlags, UiHost, VirtualKeys};
use crate::prefs::{Orientation, ToolbarAlignment};

/// Device id scripts use for mouse-originated keys.
pub const CONSOLE_MOUSE: DeviceId = DeviceId(2);

fn console_devices(device: DeviceId) -> InputSource {
    if device == CONSOLE_MOUSE {
        InputSource::MOUSE
    } else {
        InputSource::KEYBOARD
    }
}

/// Collaborators that log to the console.
pub fn console_services(pip_supported: bool) -> HostServices {
    HostServices {
        ui: Box::new(ConsoleUi {
            flags: SystemUiFlags::empty(),
            pip_supported,
        }),
        virtual_keys: Box::new(ConsoleVirtualKeys),
        run_info: Box::new(MemoryRunInfo::default()),
        relauncher: Box::new(ConsoleRelauncher),
        devices: Box::new(console_devices),
    }
}

pub struct ConsoleUi {
    flags: SystemUiFlags,
    pip_supported: bool,
}

impl UiHost for ConsoleUi {
    fn open_drawer(&mut self) {
        info!("[ui] drawer opened");
    }

    fn close_drawers(&mut self) {
        info!("[ui] drawers closed");
    }

    fn system_ui_flags(&self) -> SystemUiFlags {
        self.flags
    }

    fn set_system_ui_flags(&mut self, flags: SystemUiFlags) {
        info!("[ui] system UI flags {:?}", flags);
        self.flags = flags;
    }

    fn enter_picture_in_picture(&mut self, aspect: Ratio) -> Result<(), HostRefusal> {
        if !self.pip_supported {
            return Err(HostRefusal::Unsupported);
        }
        info!("[ui] picture-in-picture at {}", aspect);
        Ok(())
    }

    fn set_meta_key_capture(&mut self, enabled: bool) {
        info!("[ui] meta key capture {}", if enabled { "on" } else { "off" });
    }

    fn set_bottom_padding(&mut self, padding: u32) {
        info!("[ui] bottom padding {}px", padding);
    }

    fn set_requested_orientation(&mut self, orientation: Orientation) {
        info!("[ui] orientation {:?}", orientation);
    }

    fn set_window_fullscreen(&mut self, fullscreen: bool) {
        info!("[ui] window fullscreen {}", fullscreen);
    }

    fn configure_toolbar(&mut self, alignment: ToolbarAlignment, swipe_to_close: bool) {
        info!(
            "[ui] toolbar at {:?}, swipe to close {}",
            alignment, swipe_to_close
        );
    }

    fn show_soft_keyboard(&mut self) {
        info!("[ui] soft keyboard shown");
    }

    fn show_credential_dialog(&mut self) {
        info!("[ui] credential dialog");
    }

    fn show_host_key_dialog(&mut self) {
        info!("[ui] host key dialog");
    }

    fn show_disconnected(&mut self, reason: &str) {
        warn!("[ui] disconnected: {}", reason);
    }

    fn finish(&mut self) {
        info!("[ui] finish");
    }
}

pub struct ConsoleVirtualKeys;

impl VirtualKeys for ConsoleVirtualKeys {
    fn show(&mut self) {
        info!("[keys] shown");
    }

    fn hide(&mut self) {
        info!("[keys] hidden");
    }

    fn release_meta_keys(&mut self) {
        debug!("[keys] meta keys released");
    }

    fn on_keyboard_open(&mut self) {
        debug!("[keys] keyboard open");
    }

    fn on_keyboard_close(&mut self) {
        info!("[keys] keyboard closed");
    }
}

/// Run info kept for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryRunInfo {
    connected: bool,
}

impl RunInfo for MemoryRunInfo {
    fn has_connected_successfully(&self) -> bool {
        self.connected
    }

    fn mark_connected_successfully(&mut self) {
        self.connected = true;
    }
}

pub struct ConsoleRelauncher;

impl Relauncher for ConsoleRelauncher {
    fn relaunch(&mut self, profile: ServerProfile) {
        info!("[launcher] relaunch requested for {}", profile.address());
    }
}

pub struct ConsoleSurface;

impl RenderSurface for ConsoleSurface {
    fn on_resume(&mut self) {
        debug!("[surface] resumed");
    }

    fn on_pause(&mut self) {
        debug!("[surface] paused");
    }
}

/// Transport that never touches the network.
///
/// It reports `Connecting` on start; any further progress comes from the
/// script through the controller's state sender.
#[derive(Debug, Default)]
pub struct LoopbackTransport;

impl Transport for LoopbackTransport {
    fn start(&mut self, profile: &ServerProfile, events: StateSender) {
        info!("[transport] loopback session to {}", profile.address());
        if let Err(e) = events.transition(SessionState::Connecting) {
            warn!("[transport] could not report progress: {}", e);
        }
    }

    fn dispatch(&mut self, action: SessionAction) {
        match action {
            SessionAction::Key { keysym, down } => {
                debug!("[transport] key {:#x} {}", keysym, if down { "down" } else { "up" })
            }
            other => debug!("[transport] {:?}", other),
        }
    }
}
