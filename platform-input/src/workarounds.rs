//! Device-specific key workarounds.
//!
//! Some devices turn a mouse side button into a system back-press before
//! the application sees it as a button. Those key events carry a mouse-class
//! source, which is what the table below keys on.

use rfb_session::SessionAction;
use tracing::debug;

use crate::{InputConfig, InputSource, KeyAction, KeyCode, KeyEvent};

/// A workaround returns true if it fully consumed the event.
pub(crate) type Workaround =
    fn(&KeyEvent, InputSource, &InputConfig, &mut Vec<SessionAction>) -> bool;

/// Consulted in order after the forwarding path declines an event.
pub(crate) const WORKAROUNDS: &[Workaround] = &[mouse_back_button];

/// Back from a mouse-class device becomes a mouse "back" button press.
///
/// Both edges are consumed so neither reaches back-navigation. Only the down
/// edge produces the action.
fn mouse_back_button(
    event: &KeyEvent,
    sources: InputSource,
    config: &InputConfig,
    out: &mut Vec<SessionAction>,
) -> bool {
    if event.code != KeyCode::Back
        || !sources.contains(InputSource::MOUSE)
        || !config.intercept_mouse_back
    {
        return false;
    }
    if event.action == KeyAction::Down {
        debug!("Intercepted back key from mouse device {:?}", event.device);
        out.push(SessionAction::MouseBack);
    }
    true
}
