use rfb_session::SessionAction;
use tracing::trace;

use crate::{KeyAction, KeyEvent};

/// X11 keysym values
#[allow(non_upper_case_globals)]
pub mod keysyms {
    pub const XK_BackSpace: u32 = 0xff08;
    pub const XK_Tab: u32 = 0xff09;
    pub const XK_Return: u32 = 0xff0d;
    pub const XK_Escape: u32 = 0xff1b;
    pub const XK_Insert: u32 = 0xff63;
    pub const XK_Delete: u32 = 0xffff;
    pub const XK_Home: u32 = 0xff50;
    pub const XK_End: u32 = 0xff57;
    pub const XK_Page_Up: u32 = 0xff55;
    pub const XK_Page_Down: u32 = 0xff56;
    pub const XK_Left: u32 = 0xff51;
    pub const XK_Up: u32 = 0xff52;
    pub const XK_Right: u32 = 0xff53;
    pub const XK_Down: u32 = 0xff54;
    pub const XK_F1: u32 = 0xffbe;
    pub const XK_Shift_L: u32 = 0xffe1;
    pub const XK_Shift_R: u32 = 0xffe2;
    pub const XK_Control_L: u32 = 0xffe3;
    pub const XK_Control_R: u32 = 0xffe4;
    pub const XK_Caps_Lock: u32 = 0xffe5;
    pub const XK_Alt_L: u32 = 0xffe9;
    pub const XK_Alt_R: u32 = 0xffea;
    pub const XK_Super_L: u32 = 0xffeb; // Left Windows/Command key
    pub const XK_Super_R: u32 = 0xffec; // Right Windows/Command key
    pub const XK_Num_Lock: u32 = 0xff7f;
    pub const XK_space: u32 = 0x0020;
}
use keysyms::*;

/// Host-neutral key codes delivered by the adapter layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key producing a printable character.
    Char(char),
    /// System back / navigation key. Never forwarded as a keysym.
    Back,
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    Insert,
    ForwardDelete,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Up,
    Right,
    Down,
    /// Function key F1..=F12.
    F(u8),
    ShiftLeft,
    ShiftRight,
    CtrlLeft,
    CtrlRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
    CapsLock,
    NumLock,
    /// Raw host key code with no mapping.
    Unknown(u32),
}

/// Map a key code to an X11 keysym, or `None` if it has no remote meaning.
pub fn map_key_code_to_keysym(code: KeyCode) -> Option<u32> {
    use KeyCode as K;
    let keysym = match code {
        K::Char(c) => char_to_keysym(c),
        K::Enter => XK_Return,
        K::Escape => XK_Escape,
        K::Backspace => XK_BackSpace,
        K::Tab => XK_Tab,
        K::Space => XK_space,
        K::Insert => XK_Insert,
        K::ForwardDelete => XK_Delete,
        K::Home => XK_Home,
        K::End => XK_End,
        K::PageUp => XK_Page_Up,
        K::PageDown => XK_Page_Down,
        K::Left => XK_Left,
        K::Up => XK_Up,
        K::Right => XK_Right,
        K::Down => XK_Down,
        K::F(n @ 1..=12) => XK_F1 + u32::from(n - 1),
        K::ShiftLeft => XK_Shift_L,
        K::ShiftRight => XK_Shift_R,
        K::CtrlLeft => XK_Control_L,
        K::CtrlRight => XK_Control_R,
        K::AltLeft => XK_Alt_L,
        K::AltRight => XK_Alt_R,
        K::MetaLeft => XK_Super_L,
        K::MetaRight => XK_Super_R,
        K::CapsLock => XK_Caps_Lock,
        K::NumLock => XK_Num_Lock,
        K::Back | K::F(_) | K::Unknown(_) => return None,
    };
    Some(keysym)
}

/// Latin-1 maps directly; everything else uses the X11 Unicode keysym range.
fn char_to_keysym(c: char) -> u32 {
    let cp = c as u32;
    if (0x20..=0x7e).contains(&cp) || (0xa0..=0xff).contains(&cp) {
        cp
    } else {
        0x0100_0000 | cp
    }
}

/// Keyboard modifiers tracked by the forwarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Super, // Windows/Command key
}

/// The session's direct key-forwarding path.
///
/// Returns true if the event was fully consumed; any produced actions are
/// appended to `out`.
pub trait KeyForwarder {
    fn forward(&mut self, event: &KeyEvent, out: &mut Vec<SessionAction>) -> bool;
}

/// Forwards keys to the server as X11 keysyms and tracks modifier state.
#[derive(Debug, Default)]
pub struct KeysymForwarder {
    shift: bool,
    control: bool,
    alt: bool,
    super_key: bool,
    /// Only printable characters are forwarded; navigation and modifier keys
    /// are left to the host.
    compat_mode: bool,
}

impl KeysymForwarder {
    pub fn new(compat_mode: bool) -> Self {
        Self {
            compat_mode,
            ..Self::default()
        }
    }

    /// Returns true if given modifier is held.
    pub fn is_modifier_active(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Control => self.control,
            Modifier::Alt => self.alt,
            Modifier::Super => self.super_key,
        }
    }

    fn track_modifier(&mut self, code: KeyCode, down: bool) {
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.shift = down,
            KeyCode::CtrlLeft | KeyCode::CtrlRight => self.control = down,
            KeyCode::AltLeft | KeyCode::AltRight => self.alt = down,
            KeyCode::MetaLeft | KeyCode::MetaRight => self.super_key = down,
            _ => {}
        }
    }
}

impl KeyForwarder for KeysymForwarder {
    fn forward(&mut self, event: &KeyEvent, out: &mut Vec<SessionAction>) -> bool {
        if self.compat_mode && !matches!(event.code, KeyCode::Char(_)) {
            return false;
        }
        let Some(keysym) = map_key_code_to_keysym(event.code) else {
            return false;
        };

        match event.action {
            KeyAction::Down => {
                self.track_modifier(event.code, true);
                out.push(SessionAction::Key { keysym, down: true });
            }
            KeyAction::Up => {
                self.track_modifier(event.code, false);
                out.push(SessionAction::Key {
                    keysym,
                    down: false,
                });
            }
            KeyAction::Multiple { repeat } => {
                // Committed text arrives as one event repeated `repeat` times.
                for _ in 0..repeat.max(1) {
                    out.push(SessionAction::Key { keysym, down: true });
                    out.push(SessionAction::Key {
                        keysym,
                        down: false,
                    });
                }
            }
        }
        trace!("Forwarded {:?} as keysym {:#x}", event.code, keysym);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceId;

    fn key(code: KeyCode, action: KeyAction) -> KeyEvent {
        KeyEvent {
            code,
            action,
            device: DeviceId(1),
        }
    }

    #[test]
    fn test_keysym_mapping() {
        assert_eq!(map_key_code_to_keysym(KeyCode::Char('a')), Some('a' as u32));
        assert_eq!(map_key_code_to_keysym(KeyCode::Enter), Some(0xff0d));
        assert_eq!(map_key_code_to_keysym(KeyCode::F(12)), Some(0xffc9));
        assert_eq!(map_key_code_to_keysym(KeyCode::F(13)), None);
        assert_eq!(map_key_code_to_keysym(KeyCode::Back), None);
        assert_eq!(map_key_code_to_keysym(KeyCode::Char('€')), Some(0x0100_20ac));
    }

    #[test]
    fn test_modifier_tracking() {
        let mut fwd = KeysymForwarder::new(false);
        let mut out = Vec::new();
        assert!(fwd.forward(&key(KeyCode::CtrlLeft, KeyAction::Down), &mut out));
        assert!(fwd.is_modifier_active(Modifier::Control));
        assert!(fwd.forward(&key(KeyCode::CtrlLeft, KeyAction::Up), &mut out));
        assert!(!fwd.is_modifier_active(Modifier::Control));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_compat_mode_only_forwards_characters() {
        let mut fwd = KeysymForwarder::new(true);
        let mut out = Vec::new();
        assert!(!fwd.forward(&key(KeyCode::Left, KeyAction::Down), &mut out));
        assert!(fwd.forward(&key(KeyCode::Char('x'), KeyAction::Down), &mut out));
        assert_eq!(
            out,
            vec![SessionAction::Key {
                keysym: 'x' as u32,
                down: true
            }]
        );
    }

    #[test]
    fn test_multiple_expands_to_press_release_pairs() {
        let mut fwd = KeysymForwarder::new(false);
        let mut out = Vec::new();
        fwd.forward(
            &key(KeyCode::Char('z'), KeyAction::Multiple { repeat: 2 }),
            &mut out,
        );
        assert_eq!(out.len(), 4);
    }
}
