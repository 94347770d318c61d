//! Connection handle definitions
//!
//! `ClientInfo` is a connection's identity together with its outbound write
//! capability. `Outbox` collects the writes an event produces so they can be
//! flushed after the state transition is complete.

use std::net::IpAddr;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::error::SendError;
use crate::message::Outgoing;
use crate::types::ClientId;

/// Connected client handle
///
/// Cheap to clone; every clone writes into the same connection channel,
/// which a single write task drains in order. The write task bounds each
/// socket write by the configured write timeout.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Remote address (ban key)
    pub addr: IpAddr,
    /// Server → Client channel
    sender: mpsc::Sender<Outgoing>,
}

impl ClientInfo {
    /// Create a new client handle
    pub fn new(id: ClientId, addr: IpAddr, sender: mpsc::Sender<Outgoing>) -> Self {
        Self { id, addr, sender }
    }

    /// Queue a message for this client without waiting
    ///
    /// Fails if the channel is closed (client disconnected) or the
    /// connection's queue is full because its socket stopped draining.
    pub fn write(&self, msg: impl Into<Outgoing>) -> Result<(), SendError> {
        self.sender.try_send(msg.into()).map_err(|e| match e {
            TrySendError::Full(_) => SendError::QueueFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}

/// Pending writes produced by one event
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<(ClientInfo, Outgoing)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for `target`
    pub fn push(&mut self, target: &ClientInfo, msg: impl Into<Outgoing>) {
        self.pending.push((target.clone(), msg.into()));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything queued so far
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Hand every queued message to its connection, in order
    ///
    /// Never waits on a connection. Failed writes are logged and skipped;
    /// they never abort delivery to the remaining targets.
    pub fn flush(self) {
        for (target, msg) in self.pending {
            match target.write(msg) {
                Ok(()) => {}
                Err(SendError::ChannelClosed) => {
                    debug!("Dropped write to {}: connection already closed", target.id);
                }
                Err(e) => {
                    warn!("Dropped write to {}: {}", target.id, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ServerMessage;
    use crate::types::SessionId;
    use std::net::Ipv4Addr;

    fn client(buffer: usize) -> (ClientInfo, mpsc::Receiver<Outgoing>) {
        let (tx, rx) = mpsc::channel(buffer);
        let info = ClientInfo::new(ClientId::new(), IpAddr::V4(Ipv4Addr::LOCALHOST), tx);
        (info, rx)
    }

    #[tokio::test]
    async fn test_write_delivers() {
        let (info, mut rx) = client(4);
        info.write(Outgoing::close("bye")).unwrap();

        match rx.recv().await {
            Some(Outgoing::Close { code, reason }) => {
                assert_eq!(code, Outgoing::NORMAL_CLOSURE);
                assert_eq!(reason, "bye");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_write_closed_channel() {
        let (info, rx) = client(4);
        drop(rx);
        let result = info.write(Outgoing::close("bye"));
        assert!(matches!(result, Err(SendError::ChannelClosed)));
    }

    #[test]
    fn test_write_stalled_peer_fails_fast() {
        let (info, _rx) = client(1);
        info.write(Outgoing::close("first")).unwrap();
        let result = info.write(Outgoing::close("second"));
        assert!(matches!(result, Err(SendError::QueueFull)));
    }

    #[test]
    fn test_outbox_flush_skips_failed_targets() {
        let (dead, dead_rx) = client(4);
        drop(dead_rx);
        let (full, _full_rx) = client(1);
        full.write(Outgoing::close("filler")).unwrap();
        let (alive, mut alive_rx) = client(4);
        let sid = SessionId::new();

        let mut outbox = Outbox::new();
        outbox.push(&dead, ServerMessage::EndShare { sid });
        outbox.push(&full, ServerMessage::EndShare { sid });
        outbox.push(&alive, ServerMessage::EndShare { sid });
        assert_eq!(outbox.len(), 3);
        outbox.flush();

        assert!(matches!(
            alive_rx.try_recv(),
            Ok(Outgoing::Message(ServerMessage::EndShare { sid: got })) if got == sid
        ));
    }
}
