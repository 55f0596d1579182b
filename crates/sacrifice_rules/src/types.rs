//! Core domain types shared between the rules adapter and the session.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A side of the board, and the seat that plays it.
///
/// Serialised as `"w"` / `"b"`, matching the turn field of a FEN string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Side {
    /// White moves first.
    #[serde(rename = "w")]
    #[strum(serialize = "w")]
    White,
    /// Black.
    #[serde(rename = "b")]
    #[strum(serialize = "b")]
    Black,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<chess::Color> for Side {
    fn from(color: chess::Color) -> Self {
        match color {
            chess::Color::White => Side::White,
            chess::Color::Black => Side::Black,
        }
    }
}

/// A move request as it travels over the wire.
///
/// `from` and `to` are algebraic square names (`"e2"`). `promotion` names the
/// piece a pawn becomes on the last rank (`"q"`, `"r"`, `"b"`, `"n"`) and
/// defaults to a queen. It is ignored for every other move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSpec {
    /// Origin square.
    pub from: String,
    /// Destination square.
    pub to: String,
    /// Promotion piece letter, if the client sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl MoveSpec {
    /// Creates a move with no explicit promotion piece.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    /// Sets the promotion piece letter.
    pub fn with_promotion(mut self, piece: impl Into<String>) -> Self {
        self.promotion = Some(piece.into());
        self
    }

    /// The promotion letter to use, falling back to a queen.
    pub fn promotion_or_queen(&self) -> &str {
        self.promotion.as_deref().unwrap_or("q")
    }
}

impl std::fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(piece) = &self.promotion {
            write!(f, "={}", piece)?;
        }
        Ok(())
    }
}

/// Where the game stands, as judged by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStatus {
    /// Moves are still being played.
    InProgress,
    /// The side to move is mated.
    Checkmate {
        /// The side that delivered mate.
        winner: Side,
    },
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// A hundred half-moves without a capture or pawn move.
    FiftyMoveRule,
    /// The same position has occurred three times.
    ThreefoldRepetition,
    /// Neither side can mate.
    InsufficientMaterial,
}

impl GameStatus {
    /// Returns true for every status except [`GameStatus::InProgress`].
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Returns the winner, if the game ended decisively.
    pub fn winner(&self) -> Option<Side> {
        match self {
            GameStatus::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }
}
