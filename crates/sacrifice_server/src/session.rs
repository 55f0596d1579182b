//! The shared game session and its transition function.

use crate::{ClientMessage, ConnectionId, InactivityPolicy, InvariantViolation, Outbound};
use chrono::{DateTime, Utc};
use sacrifice_rules::{ChessRules, GameStatus, RulesEngine, Side};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, error, instrument};

/// Something that happened which the session must react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A client connected.
    Connect(ConnectionId),
    /// A client went away.
    Disconnect(ConnectionId),
    /// A client sent a message.
    Message(ConnectionId, ClientMessage),
    /// The reaper timer fired.
    ReaperTick,
}

impl Event {
    /// Short label for logs, without the payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Connect(_) => "connect",
            Event::Disconnect(_) => "disconnect",
            Event::Message(_, ClientMessage::Move(_)) => "move",
            Event::Message(_, ClientMessage::GetLegalMoves(_)) => "getLegalMoves",
            Event::Message(_, ClientMessage::ResetGame) => "resetGame",
            Event::ReaperTick => "reaperTick",
        }
    }

    /// The connection behind the event, if any.
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Event::Connect(id) | Event::Disconnect(id) | Event::Message(id, _) => Some(*id),
            Event::ReaperTick => None,
        }
    }
}

/// The single shared game: position, seats, spectator queue, activity clock.
///
/// Owned by whoever drives it; in production that is the event loop task.
/// Every mutation goes through [`Session::handle`].
#[derive(Debug, Clone)]
pub struct Session<R = ChessRules> {
    pub(crate) rules: R,
    pub(crate) white: Option<ConnectionId>,
    pub(crate) black: Option<ConnectionId>,
    /// Waiting for a seat, oldest first.
    pub(crate) spectators: VecDeque<ConnectionId>,
    /// Still connected, but stripped of their role by the reaper.
    pub(crate) released: Vec<ConnectionId>,
    pub(crate) in_progress: bool,
    pub(crate) last_activity: DateTime<Utc>,
    pub(crate) connection_count: usize,
    pub(crate) policy: InactivityPolicy,
}

/// Read-only view of a session, as served on `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Connected clients.
    pub connection_count: usize,
    /// Whether the white seat is taken.
    pub white_seated: bool,
    /// Whether the black seat is taken.
    pub black_seated: bool,
    /// Length of the spectator queue.
    pub spectators: usize,
    /// Connections released by the reaper.
    pub released: usize,
    /// Whether a game has started.
    pub in_progress: bool,
    /// Current position as FEN.
    pub position: String,
    /// Side to move.
    pub turn: Side,
    /// Game status according to the rules engine.
    pub status: GameStatus,
    /// Last move or connect.
    pub last_activity: DateTime<Utc>,
}

impl<R: RulesEngine> Session<R> {
    /// Creates an empty session at the starting position.
    #[instrument(skip(rules))]
    pub fn new(mut rules: R, policy: InactivityPolicy, now: DateTime<Utc>) -> Self {
        rules.reset();
        Self {
            rules,
            white: None,
            black: None,
            spectators: VecDeque::new(),
            released: Vec::new(),
            in_progress: false,
            last_activity: now,
            connection_count: 0,
            policy,
        }
    }

    /// Applies one event and returns what must be sent, in order.
    #[instrument(
        skip(self, event),
        fields(
            event = event.kind(),
            connection_id = ?event.connection(),
            connections = self.connection_count
        )
    )]
    pub fn handle(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Outbound> {
        let outbound = match event {
            Event::Connect(id) => self.on_connect(id, now),
            Event::Disconnect(id) => self.on_disconnect(id),
            Event::Message(id, ClientMessage::Move(mv)) => self.on_move_request(id, mv, now),
            Event::Message(id, ClientMessage::GetLegalMoves(square)) => {
                self.on_legal_moves_query(id, square)
            }
            Event::Message(id, ClientMessage::ResetGame) => self.on_reset_request(id),
            Event::ReaperTick => self.on_reaper_tick(now),
        };

        let checked = self.check_invariants();
        if let Err(violation) = &checked {
            error!(%violation, "Session left inconsistent");
        }
        debug_assert!(checked.is_ok(), "{:?}", checked);
        debug!(messages = outbound.len(), "Event handled");
        outbound
    }

    /// Connection holding the white seat.
    pub fn white(&self) -> Option<ConnectionId> {
        self.white
    }

    /// Connection holding the black seat.
    pub fn black(&self) -> Option<ConnectionId> {
        self.black
    }

    /// Connection holding the given seat.
    pub fn seat(&self, side: Side) -> Option<ConnectionId> {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    pub(crate) fn seat_mut(&mut self, side: Side) -> &mut Option<ConnectionId> {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    /// Which seat `id` holds, if any.
    pub fn side_of(&self, id: ConnectionId) -> Option<Side> {
        if self.white == Some(id) {
            Some(Side::White)
        } else if self.black == Some(id) {
            Some(Side::Black)
        } else {
            None
        }
    }

    /// Spectator queue, oldest first.
    pub fn spectators(&self) -> Vec<ConnectionId> {
        self.spectators.iter().copied().collect()
    }

    /// Connections the reaper stripped of their role.
    pub fn released(&self) -> &[ConnectionId] {
        &self.released
    }

    /// Whether `id` is currently connected in any capacity.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.side_of(id).is_some() || self.spectators.contains(&id) || self.released.contains(&id)
    }

    /// Whether a game has started.
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Connected clients.
    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    /// Time of the last move or connect.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Inactivity settings.
    pub fn policy(&self) -> &InactivityPolicy {
        &self.policy
    }

    /// The rules engine holding the position.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Current position as FEN.
    pub fn position(&self) -> String {
        self.rules.fen()
    }

    /// Serialisable summary of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection_count: self.connection_count,
            white_seated: self.white.is_some(),
            black_seated: self.black.is_some(),
            spectators: self.spectators.len(),
            released: self.released.len(),
            in_progress: self.in_progress,
            position: self.rules.fen(),
            turn: self.rules.turn(),
            status: self.rules.status(),
            last_activity: self.last_activity,
        }
    }

    /// Board back to the start, game no longer in progress. Seats untouched.
    pub(crate) fn reset_game(&mut self) {
        self.rules.reset();
        self.in_progress = false;
    }

    /// Moves every seat holder and spectator to the released list.
    pub(crate) fn release_all_roles(&mut self) {
        self.released.extend(self.white.take());
        self.released.extend(self.black.take());
        self.released.extend(self.spectators.drain(..));
    }

    /// Verifies the seat, queue and count rules.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let (Some(white), Some(black)) = (self.white, self.black)
            && white == black
        {
            return Err(InvariantViolation::new(format!(
                "{} holds both seats",
                white
            )));
        }

        let mut seen = HashSet::new();
        let everyone = self
            .white
            .iter()
            .chain(self.black.iter())
            .chain(self.spectators.iter())
            .chain(self.released.iter());
        for id in everyone {
            if !seen.insert(*id) {
                return Err(InvariantViolation::new(format!(
                    "{} appears in more than one role",
                    id
                )));
            }
        }

        if seen.len() != self.connection_count {
            return Err(InvariantViolation::new(format!(
                "connection count {} but {} connections accounted for",
                self.connection_count,
                seen.len()
            )));
        }

        if !self.in_progress {
            if self.white.is_some() || self.black.is_some() {
                return Err(InvariantViolation::new("seat held while no game is in progress"));
            }
            if !self.rules.is_initial() {
                return Err(InvariantViolation::new(
                    "board moved while no game is in progress",
                ));
            }
        }

        Ok(())
    }
}
