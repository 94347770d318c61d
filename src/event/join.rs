//! Room creation and joining

use rand::Rng;
use tracing::info;

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::room::Room;
use crate::rooms::Rooms;
use crate::types::{ClientId, RoomId};

/// Create a room, or join it when it exists and `join_if_exist` is set
#[derive(Debug, Clone, Default)]
pub struct Create {
    pub id: Option<String>,
    pub join_if_exist: bool,
    pub username: Option<String>,
}

/// Join an existing room
#[derive(Debug, Clone)]
pub struct Join {
    pub id: RoomId,
    pub username: Option<String>,
}

/// Requested name, or a generated guest name when blank
fn display_name(username: Option<String>) -> String {
    match username.map(|name| name.trim().to_string()) {
        Some(name) if !name.is_empty() => name,
        _ => format!("Guest-{:04}", rand::thread_rng().gen_range(0..10_000)),
    }
}

impl Create {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        if rooms.connected.contains_key(&current.id) {
            return Err(AppError::AlreadyInRoom);
        }

        let id = RoomId::from_request(self.id);
        if rooms.rooms.contains_key(&id) {
            if self.join_if_exist {
                let join = Join {
                    id,
                    username: self.username,
                };
                return join.execute(rooms, current, outbox);
            }
            return Err(AppError::RoomExists(id));
        }

        let mut room = Room::new(id.clone());
        room.add_user(current, display_name(self.username), true);
        room.notify_info_changed(outbox);

        info!("Client {} created room {}", current.id, id);
        rooms.rooms.insert(id.clone(), room);
        rooms.connected.insert(current.id, id);
        Ok(())
    }
}

impl Join {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        if rooms.connected.contains_key(&current.id) {
            return Err(AppError::AlreadyInRoom);
        }

        let ice_servers = rooms.ice_servers().to_vec();
        let room = rooms
            .rooms
            .get_mut(&self.id)
            .ok_or_else(|| AppError::NoSuchRoom(self.id.clone()))?;
        if room.is_banned(&current.addr) {
            info!("Rejected banned address {} for room {}", current.addr, self.id);
            return Err(AppError::Banned);
        }

        room.add_user(current, display_name(self.username), false);

        // the newcomer watches everyone already presenting
        let streamers: Vec<ClientId> = room
            .users
            .values()
            .filter(|u| u.streaming && u.id != current.id)
            .map(|u| u.id)
            .collect();
        for host in streamers {
            room.new_session(host, current.id, &ice_servers, outbox);
        }
        room.notify_info_changed(outbox);

        info!("Client {} joined room {}", current.id, self.id);
        rooms.connected.insert(current.id, self.id);
        Ok(())
    }
}
