//! Interfaces the controller drives on the host side.
//!
//! The adapter layer implements these for its windowing system. The
//! controller never sees a host framework type.

use bitflags::bitflags;
use rfb_common::Ratio;
use rfb_session::ServerProfile;

use crate::errors::HostRefusal;
use crate::prefs::{Orientation, ToolbarAlignment};

bitflags! {
    /// System UI visibility flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SystemUiFlags: u32 {
        const LAYOUT_STABLE          = 1 << 0;
        const HIDE_NAVIGATION        = 1 << 1;
        const FULLSCREEN             = 1 << 2;
        const LAYOUT_HIDE_NAVIGATION = 1 << 3;
        const LAYOUT_FULLSCREEN      = 1 << 4;
        const IMMERSIVE_STICKY       = 1 << 5;
    }
}

impl SystemUiFlags {
    /// Flags set while immersive mode is active.
    pub const IMMERSIVE: Self = Self::FULLSCREEN
        .union(Self::LAYOUT_FULLSCREEN)
        .union(Self::HIDE_NAVIGATION)
        .union(Self::LAYOUT_HIDE_NAVIGATION)
        .union(Self::IMMERSIVE_STICKY);
}

/// Window, drawer and dialog surface of the session view.
pub trait UiHost {
    fn open_drawer(&mut self);
    fn close_drawers(&mut self);

    fn system_ui_flags(&self) -> SystemUiFlags;
    fn set_system_ui_flags(&mut self, flags: SystemUiFlags);

    fn enter_picture_in_picture(&mut self, aspect: Ratio) -> Result<(), HostRefusal>;

    /// Capture meta/system key combinations instead of letting the host act on them.
    fn set_meta_key_capture(&mut self, enabled: bool);
    fn set_bottom_padding(&mut self, padding: u32);

    fn set_requested_orientation(&mut self, orientation: Orientation);
    fn set_window_fullscreen(&mut self, fullscreen: bool);
    fn configure_toolbar(&mut self, alignment: ToolbarAlignment, swipe_to_close: bool);
    fn show_soft_keyboard(&mut self);

    fn show_credential_dialog(&mut self);
    fn show_host_key_dialog(&mut self);
    /// Transport errors are the only failures shown to the user.
    fn show_disconnected(&mut self, reason: &str);

    /// Close the session view for good.
    fn finish(&mut self);
}

/// On-screen modifier/extra keys panel.
pub trait VirtualKeys {
    fn show(&mut self);
    fn hide(&mut self);
    /// Release any latched modifier so it is not stuck on the server.
    fn release_meta_keys(&mut self);
    fn on_keyboard_open(&mut self);
    fn on_keyboard_close(&mut self);
}

/// Persistent app-run bookkeeping.
pub trait RunInfo {
    fn has_connected_successfully(&self) -> bool;
    fn mark_connected_successfully(&mut self);
}

/// The frame view the remote desktop is drawn into.
pub trait RenderSurface {
    fn on_resume(&mut self);
    fn on_pause(&mut self);
}

/// Starts a fresh session instance.
pub trait Relauncher {
    fn relaunch(&mut self, profile: ServerProfile);
}
