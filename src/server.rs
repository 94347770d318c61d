//! SignalServer Actor implementation
//!
//! The central actor that owns the room registry. Commands are processed one
//! at a time, so each event's full read-modify-write sequence runs without
//! interleaving with any other connection's events. The actor never waits on
//! a connection: writes are queued without blocking and each connection's
//! write task applies the write timeout.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::client::{ClientInfo, Outbox};
use crate::event::Event;
use crate::message::ServerMessage;
use crate::rooms::Rooms;

/// Commands sent from handlers to the SignalServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Run an event on behalf of a client
    Dispatch { client: ClientInfo, event: Event },
}

/// The main SignalServer actor
pub struct SignalServer {
    rooms: Rooms,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl SignalServer {
    /// Create a new SignalServer over the given registry
    pub fn new(rooms: Rooms, receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self { rooms, receiver }
    }

    /// Run the SignalServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("SignalServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("SignalServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Dispatch { client, event } => {
                self.dispatch(client, event);
            }
        }
    }

    /// Run one event and queue its writes
    ///
    /// A refused event writes nothing but the error reply to its sender.
    fn dispatch(&mut self, client: ClientInfo, event: Event) {
        let name = event.name();
        let mut outbox = Outbox::new();

        if let Err(err) = event.execute(&mut self.rooms, &client, &mut outbox) {
            debug!("Event {} from {} refused: {}", name, client.id, err);
            outbox.clear();
            outbox.push(&client, ServerMessage::from(err));
        }

        debug!(
            "Event {} from {} done, total rooms: {}, connected: {}",
            name,
            client.id,
            self.rooms.rooms.len(),
            self.rooms.connected.len()
        );
        outbox.flush();
    }
}
