//! Fan-out of outbound messages to connected peers.

use crate::{ConnectionId, Outbound, Recipient, ServerMessage};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

/// Registry of per-connection outbound channels.
///
/// Delivery is fire-and-forget: a peer whose channel has closed is skipped.
#[derive(Debug, Default)]
pub struct Hub {
    peers: HashMap<ConnectionId, UnboundedSender<ServerMessage>>,
}

impl Hub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts delivering to `id`.
    #[instrument(skip(self, peer))]
    pub fn register(&mut self, id: ConnectionId, peer: UnboundedSender<ServerMessage>) {
        self.peers.insert(id, peer);
    }

    /// Stops delivering to `id`. Returns false if it was not registered.
    #[instrument(skip(self))]
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        self.peers.remove(&id).is_some()
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Returns true if no peer is registered.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Delivers each message to its recipients, in order.
    pub fn dispatch(&self, outbound: Vec<Outbound>) {
        for Outbound { recipient, message } in outbound {
            match recipient {
                Recipient::All => {
                    for (id, peer) in &self.peers {
                        Self::deliver(*id, peer, message.clone());
                    }
                }
                Recipient::Only(id) => match self.peers.get(&id) {
                    Some(peer) => Self::deliver(id, peer, message),
                    None => debug!(connection_id = %id, "No peer registered, message dropped"),
                },
            }
        }
    }

    fn deliver(id: ConnectionId, peer: &UnboundedSender<ServerMessage>, message: ServerMessage) {
        if peer.send(message).is_err() {
            debug!(connection_id = %id, "Peer channel closed, message dropped");
        }
    }
}
