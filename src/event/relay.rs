//! WebRTC signal relay
//!
//! Offers, answers and ICE candidates are opaque to the server; it only checks
//! that the sender is the right end of the session and forwards the value.

use tracing::debug;

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::rooms::Rooms;
use crate::types::SessionId;

/// Which signal is being relayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    HostIce,
    ClientIce,
    HostOffer,
    ClientAnswer,
}

impl RelayKind {
    /// Whether the session host sends this signal
    pub fn from_host(self) -> bool {
        matches!(self, RelayKind::HostIce | RelayKind::HostOffer)
    }

    pub fn name(self) -> &'static str {
        match self {
            RelayKind::HostIce => "hostice",
            RelayKind::ClientIce => "clientice",
            RelayKind::HostOffer => "hostoffer",
            RelayKind::ClientAnswer => "clientanswer",
        }
    }

    fn message(self, sid: SessionId, value: serde_json::Value) -> ServerMessage {
        match self {
            RelayKind::HostIce => ServerMessage::HostIce { sid, value },
            RelayKind::ClientIce => ServerMessage::ClientIce { sid, value },
            RelayKind::HostOffer => ServerMessage::HostOffer { sid, value },
            RelayKind::ClientAnswer => ServerMessage::ClientAnswer { sid, value },
        }
    }
}

/// Forward a signal to the other end of a session
#[derive(Debug, Clone)]
pub struct Relay {
    pub kind: RelayKind,
    pub sid: SessionId,
    pub value: serde_json::Value,
}

impl Relay {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let room = rooms.current_room(current.id)?;
        let session = room
            .sessions
            .get(&self.sid)
            .copied()
            .ok_or(AppError::SessionNotFound)?;

        let (sender, receiver) = if self.kind.from_host() {
            (session.host, session.client)
        } else {
            (session.client, session.host)
        };
        if sender != current.id {
            return Err(AppError::PermissionDenied);
        }

        if let Some(user) = room.users.get(&receiver) {
            debug!("Relaying {} for session {}", self.kind.name(), self.sid);
            outbox.push(&user.info, self.kind.message(self.sid, self.value));
        }
        Ok(())
    }
}
