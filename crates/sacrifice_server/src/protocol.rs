//! Wire messages exchanged with clients.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`, with
//! `data` absent for events that carry nothing.

use crate::ConnectionId;
use sacrifice_rules::{MoveSpec, Side};
use serde::{Deserialize, Serialize};

/// Client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Play a move on the shared board.
    Move(MoveSpec),
    /// Ask where the piece on a square can go.
    GetLegalMoves(String),
    /// Put the pieces back to the start (seat holders only).
    ResetGame,
}

/// Server to client, either targeted or broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The receiver now holds this seat.
    PlayerRole(Side),
    /// The receiver is watching and queued for a seat.
    SpectatorRole,
    /// Number of connected clients.
    ConnectionCount(usize),
    /// Full position as a FEN string.
    BoardState(String),
    /// A move that was just played.
    Move(MoveSpec),
    /// The receiver's move was refused; echoes the request.
    InvalidMove(MoveSpec),
    /// Answer to a legal-move query.
    LegalMoves {
        /// The square that was asked about.
        square: String,
        /// Destination squares, possibly none.
        moves: Vec<String>,
    },
    /// The board went back to the starting position.
    GameReset,
}

/// Who an outbound message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected client.
    All,
    /// A single connection.
    Only(ConnectionId),
}

/// A message the session wants delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Destination.
    pub recipient: Recipient,
    /// Payload.
    pub message: ServerMessage,
}

impl Outbound {
    /// A broadcast to every connection.
    pub fn all(message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::All,
            message,
        }
    }

    /// A message for one connection.
    pub fn only(id: ConnectionId, message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Only(id),
            message,
        }
    }

    /// Returns true if `id` receives this message.
    pub fn reaches(&self, id: ConnectionId) -> bool {
        match self.recipient {
            Recipient::All => true,
            Recipient::Only(target) => target == id,
        }
    }
}
