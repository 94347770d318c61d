//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::rooms::RoomSummary;
use crate::types::{ClientId, RoomId, SessionId};

/// Client → Server message
///
/// All messages a client may send. The `type` discriminator selects the
/// variant; `disconnected` is never client-sent and is not listed here.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Create a room (or join it when `joinIfExist` is set)
    #[serde(rename_all = "camelCase")]
    Create {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        join_if_exist: bool,
        #[serde(default)]
        username: Option<String>,
    },
    /// Join an existing room
    Join {
        id: String,
        #[serde(default)]
        username: Option<String>,
    },
    /// Start sharing to every other user in the room
    Share,
    /// Stop sharing
    StopShare,
    /// ICE candidate from a session host
    HostIce { sid: SessionId, value: serde_json::Value },
    /// ICE candidate from a session client
    ClientIce { sid: SessionId, value: serde_json::Value },
    /// SDP offer from a session host
    HostOffer { sid: SessionId, value: serde_json::Value },
    /// SDP answer from a session client
    ClientAnswer { sid: SessionId, value: serde_json::Value },
    /// Change display name
    Name { username: String },
    /// Owner dissolves the room
    Dissolve,
    /// Leave the room voluntarily
    Exit,
    /// List live rooms
    Rooms,
    /// Owner moderation action
    #[serde(rename_all = "camelCase")]
    OwnerAction {
        action: String,
        #[serde(default)]
        target_user_id: String,
    },
}

/// ICE server entry handed to both ends of a new session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IceServer {
    pub urls: Vec<String>,
}

/// One user as seen in a room info broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUser {
    pub id: ClientId,
    pub name: String,
    pub streaming: bool,
    pub you: bool,
    pub owner: bool,
    pub can_share: bool,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with lowercase naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Current room state (sent on join and on every change)
    Room { id: RoomId, users: Vec<RoomUser> },
    /// You host a new session towards `peer`
    #[serde(rename_all = "camelCase")]
    HostSession {
        id: SessionId,
        peer: ClientId,
        ice_servers: Vec<IceServer>,
    },
    /// You are the client of a new session hosted by `peer`
    #[serde(rename_all = "camelCase")]
    ClientSession {
        id: SessionId,
        peer: ClientId,
        ice_servers: Vec<IceServer>,
    },
    HostIce { sid: SessionId, value: serde_json::Value },
    ClientIce { sid: SessionId, value: serde_json::Value },
    HostOffer { sid: SessionId, value: serde_json::Value },
    ClientAnswer { sid: SessionId, value: serde_json::Value },
    /// The session ended
    EndShare { sid: SessionId },
    /// Live rooms, ordered by id
    Rooms { rooms: Vec<RoomSummary> },
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// Error codes for ServerMessage::Error
///
/// Represents different error scenarios that can be communicated to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotInRoom,
    RoomNotFound,
    NotRoomMember,
    NotOwner,
    MissingRequiredField,
    InvalidTargetId,
    TargetNotFound,
    SelfTargetForbidden,
    UnknownAction,
    AlreadyInRoom,
    RoomExists,
    Banned,
    PermissionDenied,
    SessionNotFound,
    /// Invalid message format
    InvalidMessage,
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::NotInRoom => ErrorCode::NotInRoom,
            AppError::RoomNotFound | AppError::NoSuchRoom(_) => ErrorCode::RoomNotFound,
            AppError::NotRoomMember => ErrorCode::NotRoomMember,
            AppError::DissolveNotOwner | AppError::NotOwner => ErrorCode::NotOwner,
            AppError::MissingTarget => ErrorCode::MissingRequiredField,
            AppError::InvalidTargetId => ErrorCode::InvalidTargetId,
            AppError::TargetNotFound => ErrorCode::TargetNotFound,
            AppError::SelfTarget => ErrorCode::SelfTargetForbidden,
            AppError::UnknownAction(_) => ErrorCode::UnknownAction,
            AppError::AlreadyInRoom => ErrorCode::AlreadyInRoom,
            AppError::RoomExists(_) => ErrorCode::RoomExists,
            AppError::Banned => ErrorCode::Banned,
            AppError::SharePermissionDenied | AppError::PermissionDenied => {
                ErrorCode::PermissionDenied
            }
            AppError::SessionNotFound => ErrorCode::SessionNotFound,
            AppError::Json(_) => ErrorCode::InvalidMessage,
            // Fatal errors are not typically converted (connection closes)
            AppError::WebSocket(_) | AppError::Io(_) | AppError::ChannelSend => {
                return ServerMessage::Error {
                    code: ErrorCode::InvalidMessage,
                    message: "Internal error".to_string(),
                };
            }
        };
        ServerMessage::Error {
            code,
            message: err.to_string(),
        }
    }
}

/// Anything that can be written to a connection
///
/// Either a JSON message or a close frame that ends the connection.
#[derive(Debug, Clone)]
pub enum Outgoing {
    Message(ServerMessage),
    Close { code: u16, reason: String },
}

impl Outgoing {
    /// WebSocket normal closure code
    pub const NORMAL_CLOSURE: u16 = 1000;

    /// Normal-closure close frame with the given reason
    pub fn close(reason: impl Into<String>) -> Self {
        Outgoing::Close {
            code: Self::NORMAL_CLOSURE,
            reason: reason.into(),
        }
    }
}

impl From<ServerMessage> for Outgoing {
    fn from(msg: ServerMessage) -> Self {
        Outgoing::Message(msg)
    }
}
