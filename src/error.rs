//! Error types for the signaling server
//!
//! Defines application-level errors, message send errors and configuration
//! errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::RoomId;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// business errors (reported to the acting client only).
/// The display text of business errors is what the client sees.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Client is not in any room
    #[error("you are not in a room")]
    NotInRoom,

    /// Client maps to a room that is gone
    #[error("room does not exist")]
    RoomNotFound,

    /// Client's room no longer lists it as a user
    #[error("you are not in this room")]
    NotRoomMember,

    /// Dissolve attempted by a non-owner
    #[error("only the room owner can dissolve the room")]
    DissolveNotOwner,

    /// Owner action attempted by a non-owner
    #[error("only owner can perform this action")]
    NotOwner,

    /// Individual owner action sent without a target
    #[error("targetUserId is required for individual actions")]
    MissingTarget,

    #[error("invalid user ID")]
    InvalidTargetId,

    #[error("user not found")]
    TargetNotFound,

    #[error("cannot perform action on yourself")]
    SelfTarget,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Create/join while already in a room
    #[error("cannot join room, you are already in one")]
    AlreadyInRoom,

    #[error("room with id {0} does already exist")]
    RoomExists(RoomId),

    #[error("room with id {0} does not exist")]
    NoSuchRoom(RoomId),

    /// Joining address is on the room's ban list
    #[error("bannedFromRoom")]
    Banned,

    #[error("you do not have permission to share screen")]
    SharePermissionDenied,

    #[error("session does not exist")]
    SessionNotFound,

    /// Relay message sent from the wrong end of a session
    #[error("permission denied")]
    PermissionDenied,
}

/// Message send errors
///
/// `ChannelClosed` and `QueueFull` come from queueing a write for a
/// connection; `Timeout` and `WebSocket` from the write task pushing it out
/// to the socket.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection's outbound queue is full
    #[error("Outbound queue full")]
    QueueFull,

    /// The socket did not accept the frame within the write timeout
    #[error("Write timed out")]
    Timeout,

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected a positive integer, got {0:?}")]
    NotPositive(String),
}
