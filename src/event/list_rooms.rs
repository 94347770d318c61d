//! Room list

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::rooms::Rooms;

/// Reply with every live room; allowed in or out of a room
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRooms;

impl ListRooms {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        outbox.push(
            current,
            ServerMessage::Rooms {
                rooms: rooms.summaries(),
            },
        );
        Ok(())
    }
}
