//! Room registry
//!
//! Process-wide table of rooms plus the reverse index from connected client
//! to the room it occupies. Every event goes through this registry.

use std::collections::HashMap;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::message::IceServer;
use crate::room::Room;
use crate::types::{ClientId, RoomId};

/// Counter name for departures from rooms
pub const USERS_LEFT_TOTAL: &str = "screenshare_users_left_total";

/// Summary of one live room for the room list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub user_count: usize,
    /// Creation time, milliseconds since the Unix epoch
    pub created_at: u64,
}

/// Registry of all rooms
///
/// `connected` maps a client to its room iff that client is a user of the
/// mapped room.
#[derive(Debug, Default)]
pub struct Rooms {
    /// All live rooms: RoomId -> Room
    pub rooms: HashMap<RoomId, Room>,
    /// Client to room mapping: ClientId -> RoomId
    pub connected: HashMap<ClientId, RoomId>,
    /// ICE servers handed out with every new session
    ice_servers: Vec<IceServer>,
    users_left: u64,
}

impl Rooms {
    /// Create an empty registry
    pub fn new(ice_servers: Vec<IceServer>) -> Self {
        Self {
            rooms: HashMap::new(),
            connected: HashMap::new(),
            ice_servers,
            users_left: 0,
        }
    }

    /// Resolve the room `client` is in
    pub fn current_room(&mut self, client: ClientId) -> Result<&mut Room, AppError> {
        let room_id = self.connected.get(&client).ok_or(AppError::NotInRoom)?;
        self.rooms.get_mut(room_id).ok_or(AppError::RoomNotFound)
    }

    /// Id of the room `client` is in
    pub fn room_of(&self, client: ClientId) -> Option<&RoomId> {
        self.connected.get(&client)
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Remove a room unconditionally
    ///
    /// Callers evict the occupants first.
    pub fn close_room(&mut self, id: &RoomId) {
        if self.rooms.remove(id).is_some() {
            info!("Room {} closed", id);
        }
        debug!("Total rooms: {}, connected: {}", self.rooms.len(), self.connected.len());
    }

    /// Record one departure from a room
    pub fn user_left(&mut self) {
        self.users_left += 1;
        metrics::counter!(USERS_LEFT_TOTAL).increment(1);
    }

    /// Departures recorded since start
    pub fn users_left(&self) -> u64 {
        self.users_left
    }

    pub fn ice_servers(&self) -> &[IceServer] {
        &self.ice_servers
    }

    /// Summaries of every live room, ordered by id
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut list: Vec<RoomSummary> = self
            .rooms
            .values()
            .map(|room| RoomSummary {
                id: room.id.clone(),
                user_count: room.users.len(),
                created_at: room
                    .created_at
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default(),
            })
            .collect();
        list.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        list
    }
}
