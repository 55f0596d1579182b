//! Sacrifice session server - one shared chess board, two seats, a queue.
//!
//! # Architecture
//!
//! - **Session**: the authoritative state machine. Every connect, disconnect,
//!   move, legal-move query, reset request and reaper tick is an [`Event`]
//!   handled by [`Session::handle`], which returns the [`Outbound`] messages
//!   to deliver. No I/O happens inside.
//! - **Event loop**: a single tokio task owns the session and a [`Hub`] of
//!   connected peers, so transitions never interleave. [`SessionHandle`] is
//!   the cloneable way in.
//! - **Transport**: axum WebSocket endpoint plus `/health` and `/status`.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use sacrifice_rules::{ChessRules, Side};
//! use sacrifice_server::{ConnectionId, Event, InactivityPolicy, ServerMessage, Session};
//!
//! let mut session = Session::new(ChessRules::new(), InactivityPolicy::default(), Utc::now());
//! let outbound = session.handle(Event::Connect(ConnectionId::from(1)), Utc::now());
//!
//! assert!(outbound
//!     .iter()
//!     .any(|o| o.message == ServerMessage::PlayerRole(Side::White)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod connection;
mod error;
mod event_loop;
mod gate;
mod hub;
mod protocol;
mod reaper;
mod roles;
mod session;
mod transport;

pub use config::{ConfigError, ServerConfig};
pub use connection::ConnectionId;
pub use error::{InvariantViolation, ServerError};
pub use event_loop::SessionHandle;
pub use hub::Hub;
pub use protocol::{ClientMessage, Outbound, Recipient, ServerMessage};
pub use reaper::InactivityPolicy;
pub use session::{Event, Session, SessionSnapshot};
pub use transport::{router, run, serve};
