//! WebSocket message dispatch
//!
//! Authorization is checked here; accepted messages are queued on the engine.
//! Nothing is ever sent back to the sender, denied or not.

use crate::engine::EngineHandle;
use crate::protocol::ClientMessage;
use crate::types::Role;

/// Macro to check host authorization and drop the message if unauthorized
macro_rules! check_host {
    ($role:expr, $action:expr) => {
        if *$role != Role::Host {
            tracing::warn!("{:?} tried to {}, only host can", $role, $action);
            return false;
        }
    };
}

/// Forward a client message to the engine if the role may send it.
///
/// Returns whether the message was forwarded.
pub fn handle_message(msg: ClientMessage, role: &Role, engine: &EngineHandle) -> bool {
    if msg.is_player_message() {
        if *role == Role::Beamer {
            tracing::warn!("Display connection tried to {}, ignoring", msg.name());
            return false;
        }
    } else {
        check_host!(role, msg.name());
    }

    engine.submit(msg);
    true
}
