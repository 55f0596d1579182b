//! Connection identity.

use serde::{Deserialize, Serialize};

/// Opaque token naming one live client connection.
///
/// The session only ever compares these for equality. The transport hands
/// them out from a counter, so a reconnecting client is a new connection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("conn-{}", _0)]
pub struct ConnectionId(u64);
