//! Chess rules adapter for the sacrifice session server.
//!
//! The session core never touches a board directly. It drives a
//! [`RulesEngine`], which owns the position and answers three kinds of
//! question: whose turn it is, whether a requested move is legal (applying it
//! if so), and where a piece on a given square may go.
//!
//! [`ChessRules`] is the production implementation, backed by the `chess`
//! crate's move generator.
//!
//! # Example
//!
//! ```
//! use sacrifice_rules::{ChessRules, MoveSpec, RulesEngine, Side};
//!
//! let mut rules = ChessRules::new();
//! assert_eq!(rules.turn(), Side::White);
//!
//! rules.apply(&MoveSpec::new("e2", "e4")).expect("opening move is legal");
//! assert_eq!(rules.turn(), Side::Black);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod error;
mod types;

pub use engine::{ChessRules, RulesEngine, STARTING_FEN};
pub use error::MoveError;
pub use types::{GameStatus, MoveSpec, Side};
