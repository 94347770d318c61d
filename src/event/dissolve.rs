//! Owner dissolves the room

use tracing::info;

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::message::Outgoing;
use crate::rooms::Rooms;

/// Close reason sent to every member of a dissolved room
pub const ROOM_DISSOLVED: &str = "Room Dissolved";

/// Disconnect every member and remove the room
///
/// Members get a close frame only; their sessions end with the connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dissolve;

impl Dissolve {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let room_id = rooms
            .connected
            .get(&current.id)
            .cloned()
            .ok_or(AppError::NotInRoom)?;
        let room = rooms.rooms.get(&room_id).ok_or(AppError::RoomNotFound)?;
        let user = room.users.get(&current.id).ok_or(AppError::NotRoomMember)?;
        if !user.owner {
            return Err(AppError::DissolveNotOwner);
        }

        for member in room.users.values() {
            rooms.connected.remove(&member.id);
            outbox.push(&member.info, Outgoing::close(ROOM_DISSOLVED));
        }
        info!("Room {} dissolved by {}", room_id, current.id);

        rooms.close_room(&room_id);
        Ok(())
    }
}
