//! Seat assignment on connect, promotion from the queue on disconnect.

use crate::{ConnectionId, Outbound, ServerMessage, Session};
use chrono::{DateTime, Utc};
use sacrifice_rules::{RulesEngine, Side};
use tracing::{info, instrument, warn};

impl<R: RulesEngine> Session<R> {
    /// Seats a new connection: white if free, else black, else the queue.
    ///
    /// The newcomer gets the position first, then everyone gets the new
    /// count, then the newcomer learns its role.
    #[instrument(skip(self, now), fields(connection_id = %id))]
    pub(crate) fn on_connect(&mut self, id: ConnectionId, now: DateTime<Utc>) -> Vec<Outbound> {
        if self.is_connected(id) {
            warn!("Connection is already registered, ignoring connect");
            return Vec::new();
        }

        self.last_activity = now;
        self.connection_count += 1;
        info!(count = self.connection_count, "Connected");

        let mut outbound = vec![
            Outbound::only(id, ServerMessage::BoardState(self.rules.fen())),
            Outbound::all(ServerMessage::ConnectionCount(self.connection_count)),
        ];

        let role = if self.white.is_none() {
            self.take_seat(id, Side::White)
        } else if self.black.is_none() {
            self.take_seat(id, Side::Black)
        } else {
            self.spectators.push_back(id);
            info!(queue_len = self.spectators.len(), "Joined as spectator");
            ServerMessage::SpectatorRole
        };
        outbound.push(Outbound::only(id, role));

        outbound
    }

    /// Frees whatever `id` held and fills a vacated seat from the queue.
    ///
    /// The last connection leaving an empty table resets the board.
    #[instrument(skip(self), fields(connection_id = %id))]
    pub(crate) fn on_disconnect(&mut self, id: ConnectionId) -> Vec<Outbound> {
        if !self.is_connected(id) {
            warn!("Disconnect for unknown connection, ignoring");
            return Vec::new();
        }

        self.connection_count -= 1;
        info!(count = self.connection_count, "Disconnected");

        let mut outbound = vec![Outbound::all(ServerMessage::ConnectionCount(
            self.connection_count,
        ))];

        match self.side_of(id) {
            Some(side) => {
                *self.seat_mut(side) = None;
                info!(%side, "Seat vacated");
                outbound.extend(self.promote_spectator(side));
            }
            None => {
                self.spectators.retain(|queued| *queued != id);
                self.released.retain(|released| *released != id);
            }
        }

        if self.white.is_none() && self.black.is_none() && self.connection_count == 0 {
            self.reset_game();
            info!("Table empty, game reset");
        }

        outbound
    }

    fn take_seat(&mut self, id: ConnectionId, side: Side) -> ServerMessage {
        *self.seat_mut(side) = Some(id);
        self.in_progress = true;
        info!(%side, "Seated");
        ServerMessage::PlayerRole(side)
    }

    /// Moves the longest-waiting spectator into the empty `side` seat.
    fn promote_spectator(&mut self, side: Side) -> Option<Outbound> {
        let next = self.spectators.pop_front()?;
        *self.seat_mut(side) = Some(next);
        info!(promoted = %next, %side, "Spectator promoted");
        Some(Outbound::only(next, ServerMessage::PlayerRole(side)))
    }
}
