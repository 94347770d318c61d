//! Screen Sharing Signaling Server Library
//!
//! Coordinates rooms of connected users over WebSocket: who is in which room,
//! who owns it, and which sharer is linked to which viewer. Media never passes
//! through the server; it only relays WebRTC offers, answers and candidates.
//!
//! # Features
//! - Room creation and joining, with one owner per room
//! - Sharing sessions between a presenting host and each viewer
//! - Signal relay (offer / answer / ICE) between session ends
//! - Owner moderation: stop share, share permissions, kick, ban
//! - Room dissolution and voluntary exit
//! - Disconnect cascade with ownership transfer
//! - Room listing for the lobby screen
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `SignalServer` is the central actor owning the `Rooms` registry
//! - Each connection has a `handler` task pair communicating with the server
//! - Events run one at a time inside the actor, so no cascade is ever
//!   observed half-applied
//! - The actor only queues writes; each connection's write task owns the
//!   socket and the write timeout
//!
//! # Example
//! ```ignore
//! use std::time::Duration;
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use screenshare_signal::{handle_connection, Rooms, SignalServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:9100").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(SignalServer::new(Rooms::default(), cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, Duration::from_secs(2)));
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod message;
pub mod room;
pub mod rooms;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use client::{ClientInfo, Outbox};
pub use config::ServerConfig;
pub use error::{AppError, ConfigError, SendError};
pub use event::Event;
pub use handler::handle_connection;
pub use message::{ClientMessage, ErrorCode, Outgoing, ServerMessage};
pub use room::{Room, Session, User};
pub use rooms::{RoomSummary, Rooms};
pub use server::{ServerCommand, SignalServer};
pub use types::{ClientId, RoomId, SessionId};
