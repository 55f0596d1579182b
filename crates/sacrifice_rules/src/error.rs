//! Move rejection reasons.

/// Why the rules engine refused a move.
///
/// None of these are fatal to the session: the requester is told the move was
/// invalid and the position is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// A square reference that is not a board square.
    #[display("Malformed square reference {:?}", _0)]
    MalformedSquare(String),

    /// A promotion letter that does not name a promotable piece.
    #[display("Malformed promotion piece {:?}", _0)]
    MalformedPromotion(String),

    /// The origin square is empty.
    #[display("No piece on {}", _0)]
    NoPieceToMove(String),

    /// The move breaks the rules of chess in the current position.
    #[display("Illegal move {}-{}", from, to)]
    Illegal {
        /// Origin square.
        from: String,
        /// Destination square.
        to: String,
    },
}

impl std::error::Error for MoveError {}
