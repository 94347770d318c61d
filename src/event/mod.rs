//! Room events
//!
//! Every state change is one event. `Event` is the closed set of them; the
//! handler decodes a `ClientMessage` into an `Event` and the server actor runs
//! it against the registry on behalf of the acting client.
//!
//! An event validates before it mutates: it either applies its whole
//! transition and returns `Ok`, or returns an error having changed nothing.
//! Writes are queued in an `Outbox` and delivered once the transition is done.

pub mod disconnected;
pub mod dissolve;
pub mod exit;
pub mod join;
pub mod list_rooms;
pub mod name;
pub mod owner_action;
pub mod relay;
pub mod share;

pub use disconnected::Disconnected;
pub use dissolve::Dissolve;
pub use exit::Exit;
pub use join::{Create, Join};
pub use list_rooms::ListRooms;
pub use name::Name;
pub use owner_action::{OwnerAction, OwnerActionKind};
pub use relay::{Relay, RelayKind};
pub use share::{Share, StopShare};

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::rooms::Rooms;

/// One room event, tagged by kind
#[derive(Debug)]
pub enum Event {
    Create(Create),
    Join(Join),
    Share(Share),
    StopShare(StopShare),
    Relay(Relay),
    Name(Name),
    Dissolve(Dissolve),
    Exit(Exit),
    OwnerAction(OwnerAction),
    ListRooms(ListRooms),
    /// Synthesized by the transport when a connection ends
    Disconnected(Disconnected),
}

impl Event {
    /// Wire name of the event, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Create(_) => "create",
            Event::Join(_) => "join",
            Event::Share(_) => "share",
            Event::StopShare(_) => "stopshare",
            Event::Relay(relay) => relay.kind.name(),
            Event::Name(_) => "name",
            Event::Dissolve(_) => "dissolve",
            Event::Exit(_) => "exit",
            Event::OwnerAction(_) => "owneraction",
            Event::ListRooms(_) => "rooms",
            Event::Disconnected(_) => "disconnected",
        }
    }

    /// Run the event for `current`
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        match self {
            Event::Create(e) => e.execute(rooms, current, outbox),
            Event::Join(e) => e.execute(rooms, current, outbox),
            Event::Share(e) => e.execute(rooms, current, outbox),
            Event::StopShare(e) => e.execute(rooms, current, outbox),
            Event::Relay(e) => e.execute(rooms, current, outbox),
            Event::Name(e) => e.execute(rooms, current, outbox),
            Event::Dissolve(e) => e.execute(rooms, current, outbox),
            Event::Exit(e) => e.execute(rooms, current, outbox),
            Event::OwnerAction(e) => e.execute(rooms, current, outbox),
            Event::ListRooms(e) => e.execute(rooms, current, outbox),
            Event::Disconnected(e) => e.execute(rooms, current, outbox),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving events against a registry in tests.

    use std::net::{IpAddr, Ipv4Addr};

    use tokio::sync::mpsc;

    use super::*;
    use crate::message::{Outgoing, ServerMessage};
    use crate::types::{ClientId, RoomId};

    /// A connected client whose writes land in the returned receiver
    pub fn connect(ip: [u8; 4]) -> (ClientInfo, mpsc::Receiver<Outgoing>) {
        connect_with_buffer(ip, 64)
    }

    /// Like `connect`, with an outbound queue of `buffer` messages
    pub fn connect_with_buffer(ip: [u8; 4], buffer: usize) -> (ClientInfo, mpsc::Receiver<Outgoing>) {
        let (tx, rx) = mpsc::channel(buffer);
        let info = ClientInfo::new(ClientId::new(), IpAddr::V4(Ipv4Addr::from(ip)), tx);
        (info, rx)
    }

    /// Execute `event` and deliver its writes
    pub async fn run(rooms: &mut Rooms, current: &ClientInfo, event: Event) -> Result<(), AppError> {
        let mut outbox = Outbox::new();
        event.execute(rooms, current, &mut outbox)?;
        outbox.flush();
        Ok(())
    }

    /// Create-or-join `room` as `current`
    pub async fn enter(rooms: &mut Rooms, current: &ClientInfo, room: &str) {
        let event = Event::Create(Create {
            id: Some(room.to_string()),
            join_if_exist: true,
            username: None,
        });
        run(rooms, current, event).await.unwrap();
    }

    /// Everything written to a client so far
    pub fn drain(rx: &mut mpsc::Receiver<Outgoing>) -> Vec<Outgoing> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Close frames in `out`, as (code, reason)
    pub fn closes(out: &[Outgoing]) -> Vec<(u16, String)> {
        out.iter()
            .filter_map(|m| match m {
                Outgoing::Close { code, reason } => Some((*code, reason.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of room info broadcasts in `out`
    pub fn room_infos(out: &[Outgoing]) -> usize {
        out.iter()
            .filter(|m| matches!(m, Outgoing::Message(ServerMessage::Room { .. })))
            .count()
    }

    /// Number of end-of-share notices in `out`
    pub fn end_shares(out: &[Outgoing]) -> usize {
        out.iter()
            .filter(|m| matches!(m, Outgoing::Message(ServerMessage::EndShare { .. })))
            .count()
    }

    /// Check the room invariants that must hold between events
    pub fn assert_consistent(rooms: &Rooms) {
        for (client, room_id) in &rooms.connected {
            let room = rooms.room(room_id).expect("connected client maps to a live room");
            assert!(room.users.contains_key(client), "connected client is a room user");
        }
        for (room_id, room) in &rooms.rooms {
            assert!(!room.is_empty(), "empty room {} left in registry", room_id);
            assert_eq!(room.users.values().filter(|u| u.owner).count(), 1);
            for user in room.users.values() {
                assert_eq!(rooms.room_of(user.id), Some(room_id));
                if !user.can_share {
                    assert!(!user.streaming);
                }
            }
            for session in room.sessions.values() {
                assert!(room.users.contains_key(&session.host));
                assert!(room.users.contains_key(&session.client));
                assert!(room.users[&session.host].streaming);
            }
        }
    }

    pub fn room<'a>(rooms: &'a Rooms, id: &str) -> &'a crate::room::Room {
        rooms.room(&RoomId(id.to_string())).expect("room exists")
    }
}
