//! Departure cascade
//!
//! Runs when a connection ends and, through `Exit`, when a user leaves on
//! purpose. Every step tolerates the client, its room or its user already
//! being gone, so the cascade can race with kick, ban or dissolve.

use tracing::info;

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::message::Outgoing;
use crate::rooms::Rooms;

/// A connection ended with the given close code and reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnected {
    pub code: u16,
    pub reason: String,
}

impl Default for Disconnected {
    fn default() -> Self {
        Self {
            code: Outgoing::NORMAL_CLOSURE,
            reason: String::new(),
        }
    }
}

impl Disconnected {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        self.execute_no_error(rooms, current, outbox);
        Ok(())
    }

    pub(crate) fn execute_no_error(&self, rooms: &mut Rooms, current: &ClientInfo, outbox: &mut Outbox) {
        let room_id = rooms.connected.remove(&current.id);
        outbox.push(
            current,
            Outgoing::Close {
                code: self.code,
                reason: self.reason.clone(),
            },
        );

        let Some(room_id) = room_id else {
            return;
        };

        let now_empty = {
            // room may already be removed
            let Some(room) = rooms.rooms.get_mut(&room_id) else {
                return;
            };
            let Some(user) = room.users.remove(&current.id) else {
                return;
            };
            info!("Client {} left room {}", current.id, room_id);

            for session in room.close_sessions_of(current.id) {
                if let Some(other) = session.other(current.id) {
                    room.notify_end_share(other, session.id, outbox);
                }
            }

            if !room.is_empty() {
                if user.owner {
                    if let Some(owner) = room.promote_owner() {
                        info!("Client {} is now owner of room {}", owner, room_id);
                    }
                }
                room.notify_info_changed(outbox);
            }
            room.is_empty()
        };

        rooms.user_left();
        if now_empty {
            rooms.close_room(&room_id);
        }
    }
}
