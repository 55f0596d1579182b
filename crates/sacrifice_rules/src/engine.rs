//! The rules engine seam and its `chess`-crate implementation.

use crate::{GameStatus, MoveError, MoveSpec, Side};
use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Rank, Square};
use std::str::FromStr;
use tracing::{debug, instrument};

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Owner of the authoritative position.
///
/// The session core only reads and writes the board through this trait, so a
/// different engine (or a scripted fake) can be dropped in without touching
/// seat or turn bookkeeping.
pub trait RulesEngine {
    /// Puts the pieces back on their starting squares.
    fn reset(&mut self);

    /// Serialises the position as a FEN string.
    fn fen(&self) -> String;

    /// The side to move.
    fn turn(&self) -> Side;

    /// Whether the game is still going, and if not, how it ended.
    fn status(&self) -> GameStatus;

    /// Validates `mv` and, if it is legal, plays it.
    ///
    /// On error the position is unchanged.
    fn apply(&mut self, mv: &MoveSpec) -> Result<(), MoveError>;

    /// Destination squares of every legal move starting on `square`.
    ///
    /// Anything that is not a square of the side to move yields an empty list.
    fn legal_destinations(&self, square: &str) -> Vec<String>;

    /// Returns true if the position is the starting position.
    fn is_initial(&self) -> bool {
        self.fen() == STARTING_FEN
    }
}

/// Rules engine backed by the `chess` crate.
///
/// `chess::Board` has no notion of move counters or history, so those are
/// tracked here to produce complete FEN strings and detect repetition.
#[derive(Debug, Clone)]
pub struct ChessRules {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Hashes of every position since the last capture or pawn move, current last.
    positions: Vec<u64>,
}

impl ChessRules {
    /// Creates an engine set up at the starting position.
    #[instrument]
    pub fn new() -> Self {
        Self::with_board(Board::default(), 0, 1)
    }

    /// Creates an engine from a FEN string, or `None` if it does not parse.
    #[instrument]
    pub fn from_fen(fen: &str) -> Option<Self> {
        let board = Board::from_str(fen).ok()?;
        let mut counters = fen.split_whitespace().skip(4);
        let halfmove_clock = counters.next().and_then(|c| c.parse().ok()).unwrap_or(0);
        let fullmove_number = counters.next().and_then(|c| c.parse().ok()).unwrap_or(1);
        Some(Self::with_board(board, halfmove_clock, fullmove_number))
    }

    fn with_board(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Self {
        Self {
            board,
            halfmove_clock,
            fullmove_number,
            positions: vec![board.get_hash()],
        }
    }

    fn parse_square(name: &str) -> Result<Square, MoveError> {
        // `Square::from_str` only looks at the first two characters.
        if name.len() != 2 {
            return Err(MoveError::MalformedSquare(name.to_string()));
        }
        Square::from_str(name).map_err(|_| MoveError::MalformedSquare(name.to_string()))
    }

    fn parse_promotion(letter: &str) -> Result<Piece, MoveError> {
        match letter {
            "q" => Ok(Piece::Queen),
            "r" => Ok(Piece::Rook),
            "b" => Ok(Piece::Bishop),
            "n" => Ok(Piece::Knight),
            other => Err(MoveError::MalformedPromotion(other.to_string())),
        }
    }

    fn promotion_rank(color: Color) -> Rank {
        match color {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        }
    }

    fn insufficient_material(&self) -> bool {
        let kings = *self.board.pieces(Piece::King);
        let others = *self.board.combined() & !kings;
        let minors = *self.board.pieces(Piece::Knight) | *self.board.pieces(Piece::Bishop);

        match others.popcnt() {
            0 => true,
            1 => (others & minors).popcnt() == 1,
            _ => {
                // Any number of bishops, all on the same shade.
                let bishops = *self.board.pieces(Piece::Bishop);
                if others != bishops {
                    return false;
                }
                let mut shades =
                    bishops.map(|sq| (sq.get_rank().to_index() + sq.get_file().to_index()) % 2);
                let first = shades.next();
                shades.all(|shade| Some(shade) == first)
            }
        }
    }

    /// The square a capturing pawn lands on, one rank behind the pawn that
    /// just advanced two squares.
    fn en_passant_target(&self) -> Option<Square> {
        let pawn = self.board.en_passant()?;
        let rank = match self.board.side_to_move() {
            Color::White => Rank::Sixth,
            Color::Black => Rank::Third,
        };
        Some(Square::make_square(rank, pawn.get_file()))
    }

    fn repetition_count(&self) -> usize {
        let current = self.board.get_hash();
        self.positions.iter().filter(|&&hash| hash == current).count()
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ChessRules {
    #[instrument(skip(self))]
    fn reset(&mut self) {
        *self = Self::new();
        debug!("Board reset to starting position");
    }

    fn fen(&self) -> String {
        // The board's own FEN always ends in "0 1" and names the double-pushed
        // pawn rather than the capture square; rebuild both.
        let board_fen = self.board.to_string();
        let fields: Vec<&str> = board_fen.split_whitespace().take(3).collect();
        let en_passant = self
            .en_passant_target()
            .map_or_else(|| "-".to_string(), |square| square.to_string());
        format!(
            "{} {} {} {}",
            fields.join(" "),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn turn(&self) -> Side {
        self.board.side_to_move().into()
    }

    fn status(&self) -> GameStatus {
        match self.board.status() {
            BoardStatus::Checkmate => GameStatus::Checkmate {
                winner: (!self.board.side_to_move()).into(),
            },
            BoardStatus::Stalemate => GameStatus::Stalemate,
            BoardStatus::Ongoing if self.insufficient_material() => {
                GameStatus::InsufficientMaterial
            }
            BoardStatus::Ongoing if self.halfmove_clock >= 100 => GameStatus::FiftyMoveRule,
            BoardStatus::Ongoing if self.repetition_count() >= 3 => {
                GameStatus::ThreefoldRepetition
            }
            BoardStatus::Ongoing => GameStatus::InProgress,
        }
    }

    #[instrument(skip(self, mv), fields(mv = %mv))]
    fn apply(&mut self, mv: &MoveSpec) -> Result<(), MoveError> {
        let from = Self::parse_square(&mv.from)?;
        let to = Self::parse_square(&mv.to)?;
        let piece = self
            .board
            .piece_on(from)
            .ok_or_else(|| MoveError::NoPieceToMove(mv.from.clone()))?;

        let mover = self.board.side_to_move();
        let promotion = if piece == Piece::Pawn && to.get_rank() == Self::promotion_rank(mover) {
            Some(Self::parse_promotion(mv.promotion_or_queen())?)
        } else {
            None
        };

        let candidate = ChessMove::new(from, to, promotion);
        if !self.board.legal(candidate) {
            debug!("Rejected by move generator");
            return Err(MoveError::Illegal {
                from: mv.from.clone(),
                to: mv.to.clone(),
            });
        }

        let irreversible = piece == Piece::Pawn || self.board.piece_on(to).is_some();
        self.board = self.board.make_move_new(candidate);

        if irreversible {
            self.halfmove_clock = 0;
            self.positions.clear();
        } else {
            self.halfmove_clock += 1;
        }
        if mover == Color::Black {
            self.fullmove_number += 1;
        }
        self.positions.push(self.board.get_hash());

        debug!(fen = %self.fen(), "Move applied");
        Ok(())
    }

    fn legal_destinations(&self, square: &str) -> Vec<String> {
        let Ok(origin) = Self::parse_square(square) else {
            debug!(square, "Legal move query for malformed square");
            return Vec::new();
        };

        let mut destinations: Vec<String> = Vec::new();
        for mv in MoveGen::new_legal(&self.board).filter(|mv| mv.get_source() == origin) {
            let dest = mv.get_dest().to_string();
            if !destinations.contains(&dest) {
                destinations.push(dest);
            }
        }
        destinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parser_rejects_trailing_characters() {
        assert!(ChessRules::parse_square("e2").is_ok());
        assert!(matches!(
            ChessRules::parse_square("e22"),
            Err(MoveError::MalformedSquare(_))
        ));
        assert!(matches!(
            ChessRules::parse_square("z9"),
            Err(MoveError::MalformedSquare(_))
        ));
        assert!(ChessRules::parse_square("").is_err());
    }

    #[test]
    fn test_promotion_letters() {
        assert_eq!(ChessRules::parse_promotion("q"), Ok(Piece::Queen));
        assert_eq!(ChessRules::parse_promotion("n"), Ok(Piece::Knight));
        assert!(ChessRules::parse_promotion("k").is_err());
    }
}
