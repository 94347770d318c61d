//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! message parsing, and bidirectional communication with the SignalServer.

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};

use crate::client::ClientInfo;
use crate::error::{AppError, SendError};
use crate::event::{
    Create, Disconnected, Dissolve, Event, Exit, Join, ListRooms, Name, OwnerAction, Relay,
    RelayKind, Share, StopShare,
};
use crate::message::{ClientMessage, Outgoing, ServerMessage};
use crate::server::ServerCommand;
use crate::types::{ClientId, RoomId, SessionId};

/// Per-connection outbound buffer
///
/// Writes to a connection whose buffer is full are dropped, so this has to
/// cover a burst of ICE candidates.
const OUTBOUND_BUFFER: usize = 128;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Handle a new TCP connection
///
/// Performs WebSocket handshake, sets up bidirectional communication,
/// and manages the connection lifecycle. Every socket write is bounded by
/// `write_timeout`; a peer that stalls past it is disconnected.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    write_timeout: Duration,
) -> Result<(), AppError> {
    let peer_addr = stream.peer_addr()?;

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Generate client ID
    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<Outgoing>(OUTBOUND_BUFFER);
    let client = ClientInfo::new(client_id, peer_addr.ip(), msg_tx);

    // Spawn read task (WebSocket -> ServerCommand)
    let read_client = client.clone();
    let cmd_tx_read = cmd_tx.clone();
    let mut read_task = tokio::spawn(async move {
        let mut disconnected = Disconnected::default();
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = ServerCommand::Dispatch {
                            client: read_client.clone(),
                            event: client_message_to_event(client_msg),
                        };
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", client_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid JSON from {}: {}", client_id, e);
                        let reply = ServerMessage::from(AppError::Json(e));
                        if let Err(e) = read_client.write(reply) {
                            debug!("Could not report invalid message to {}: {}", client_id, e);
                        }
                    }
                },
                Ok(Message::Close(frame)) => {
                    debug!("Client {} sent close frame", client_id);
                    if let Some(frame) = frame {
                        disconnected = Disconnected {
                            code: frame.code.into(),
                            reason: frame.reason.to_string(),
                        };
                    }
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!("Ping from {}", client_id);
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", client_id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
        disconnected
    });

    // Spawn write task (Outgoing -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(out) = msg_rx.recv().await {
            let (frame, last) = match out {
                Outgoing::Message(msg) => match serde_json::to_string(&msg) {
                    Ok(json) => (Message::Text(json), false),
                    Err(e) => {
                        error!("Failed to serialize message: {}", e);
                        // Continue - don't break on serialization errors
                        continue;
                    }
                },
                Outgoing::Close { code, reason } => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.into(),
                    };
                    (Message::Close(Some(frame)), true)
                }
            };

            match send_frame(&mut ws_sender, frame, write_timeout).await {
                Ok(()) if last => break,
                Ok(()) => {}
                Err(SendError::Timeout) => {
                    warn!("Write to {} stalled past {:?}, closing", client_id, write_timeout);
                    break;
                }
                Err(e) => {
                    debug!("WebSocket send to {} failed: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Write task ended for {}", client_id);

        let _ = tokio::time::timeout(write_timeout, ws_sender.close()).await;
    });

    // Wait for either task to complete
    let (disconnected, write_done) = tokio::select! {
        result = &mut read_task => {
            debug!("Read task completed for {}", client_id);
            (result.unwrap_or_default(), false)
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            read_task.abort();
            (Disconnected::default(), true)
        }
    };

    // Run the departure cascade; it queues the final close frame
    let _ = cmd_tx
        .send(ServerCommand::Dispatch {
            client,
            event: Event::Disconnected(disconnected),
        })
        .await;

    if !write_done && tokio::time::timeout(write_timeout, &mut write_task).await.is_err() {
        debug!("Write task for {} did not finish, aborting", client_id);
        write_task.abort();
    }

    info!("Client {} disconnected", client_id);

    Ok(())
}

/// Write one frame, giving up after `timeout`
async fn send_frame(sink: &mut WsSink, frame: Message, timeout: Duration) -> Result<(), SendError> {
    match tokio::time::timeout(timeout, sink.send(frame)).await {
        Ok(result) => result.map_err(SendError::from),
        Err(_) => Err(SendError::Timeout),
    }
}

/// Convert a ClientMessage to an Event
fn client_message_to_event(msg: ClientMessage) -> Event {
    match msg {
        ClientMessage::Create {
            id,
            join_if_exist,
            username,
        } => Event::Create(Create {
            id,
            join_if_exist,
            username,
        }),
        ClientMessage::Join { id, username } => Event::Join(Join {
            id: RoomId(id),
            username,
        }),
        ClientMessage::Share => Event::Share(Share),
        ClientMessage::StopShare => Event::StopShare(StopShare),
        ClientMessage::HostIce { sid, value } => relay(RelayKind::HostIce, sid, value),
        ClientMessage::ClientIce { sid, value } => relay(RelayKind::ClientIce, sid, value),
        ClientMessage::HostOffer { sid, value } => relay(RelayKind::HostOffer, sid, value),
        ClientMessage::ClientAnswer { sid, value } => relay(RelayKind::ClientAnswer, sid, value),
        ClientMessage::Name { username } => Event::Name(Name { username }),
        ClientMessage::Dissolve => Event::Dissolve(Dissolve),
        ClientMessage::Exit => Event::Exit(Exit),
        ClientMessage::Rooms => Event::ListRooms(ListRooms),
        ClientMessage::OwnerAction {
            action,
            target_user_id,
        } => Event::OwnerAction(OwnerAction {
            action,
            target_user_id,
        }),
    }
}

fn relay(kind: RelayKind, sid: SessionId, value: serde_json::Value) -> Event {
    Event::Relay(Relay { kind, sid, value })
}
