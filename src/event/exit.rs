//! Voluntary leave

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::event::Disconnected;
use crate::message::Outgoing;
use crate::rooms::Rooms;

/// Close reason sent to a user who leaves on their own
pub const USER_LEFT: &str = "User Left";

/// Leave the current room
///
/// Same cascade as a dropped connection, ending with a normal closure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exit;

impl Exit {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let disconnect = Disconnected {
            code: Outgoing::NORMAL_CLOSURE,
            reason: USER_LEFT.to_string(),
        };
        disconnect.execute_no_error(rooms, current, outbox);
        Ok(())
    }
}
