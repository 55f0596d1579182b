//! Move authorisation, legal-move queries and player resets.

use crate::{ConnectionId, Outbound, ServerMessage, Session};
use chrono::{DateTime, Utc};
use sacrifice_rules::{MoveSpec, RulesEngine};
use tracing::{debug, info, instrument, warn};

impl<R: RulesEngine> Session<R> {
    /// Plays `mv` if `id` holds the seat whose turn it is and the engine agrees.
    ///
    /// Every refusal goes to the requester alone and leaves the board as it was.
    #[instrument(skip(self, mv, now), fields(connection_id = %id, mv = %mv))]
    pub(crate) fn on_move_request(
        &mut self,
        id: ConnectionId,
        mv: MoveSpec,
        now: DateTime<Utc>,
    ) -> Vec<Outbound> {
        self.last_activity = now;

        let turn = self.rules.turn();
        if self.seat(turn) != Some(id) {
            warn!(%turn, "Move from a connection not holding the seat to move");
            return vec![Outbound::only(id, ServerMessage::InvalidMove(mv))];
        }

        if let Err(e) = self.rules.apply(&mv) {
            warn!(error = %e, "Invalid move");
            return vec![Outbound::only(id, ServerMessage::InvalidMove(mv))];
        }

        let status = self.rules.status();
        info!(side = %turn, ?status, "Move played");
        if status.is_over() {
            info!(?status, winner = ?status.winner(), "Game over");
        }

        let position = self.rules.fen();
        vec![
            Outbound::all(ServerMessage::Move(mv)),
            Outbound::all(ServerMessage::BoardState(position)),
        ]
    }

    /// Answers where the piece on `square` can go. Open to anyone.
    #[instrument(skip(self), fields(connection_id = %id))]
    pub(crate) fn on_legal_moves_query(&self, id: ConnectionId, square: String) -> Vec<Outbound> {
        let moves = self.rules.legal_destinations(&square);
        debug!(count = moves.len(), "Legal moves");
        vec![Outbound::only(
            id,
            ServerMessage::LegalMoves { square, moves },
        )]
    }

    /// Resets the board for a seat holder; seats stay as they are.
    ///
    /// Requests from anyone else are dropped without a reply.
    #[instrument(skip(self), fields(connection_id = %id))]
    pub(crate) fn on_reset_request(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let Some(side) = self.side_of(id) else {
            debug!("Reset request from non-player ignored");
            return Vec::new();
        };

        self.rules.reset();
        info!(%side, "Game reset by player");

        vec![
            Outbound::all(ServerMessage::GameReset),
            Outbound::all(ServerMessage::BoardState(self.rules.fen())),
        ]
    }
}
