//! Inactivity reaper: releases an abandoned game.

use crate::{Outbound, ServerMessage, Session};
use chrono::{DateTime, Utc};
use sacrifice_rules::RulesEngine;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// How often the reaper looks, and how long a game may sit idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct InactivityPolicy {
    /// Period of the reaper timer.
    pub check_interval: Duration,
    /// Idle time after which the session is released.
    pub timeout: Duration,
}

impl Default for InactivityPolicy {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            timeout: Duration::from_secs(10 * 60),
        }
    }
}

impl InactivityPolicy {
    /// Returns true if a game last touched at `last_activity` has gone stale.
    pub fn is_expired(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards yields a negative span, which is never stale.
        match now.signed_duration_since(last_activity).to_std() {
            Ok(idle) => idle > self.timeout,
            Err(_) => false,
        }
    }
}

impl<R: RulesEngine> Session<R> {
    /// Full reset when nobody has moved or joined for longer than the timeout.
    ///
    /// Unlike a player's reset request this also empties both seats and the
    /// spectator queue. The affected clients stay connected but hold no role.
    #[instrument(skip(self))]
    pub(crate) fn on_reaper_tick(&mut self, now: DateTime<Utc>) -> Vec<Outbound> {
        if !self.in_progress || !self.policy.is_expired(self.last_activity, now) {
            debug!(in_progress = self.in_progress, "Reaper tick, nothing to do");
            return Vec::new();
        }

        let idle_secs = now.signed_duration_since(self.last_activity).num_seconds();
        self.release_all_roles();
        self.reset_game();

        info!(
            idle_secs,
            released = self.released.len(),
            "Game reset due to inactivity"
        );

        vec![
            Outbound::all(ServerMessage::GameReset),
            Outbound::all(ServerMessage::BoardState(self.rules.fen())),
        ]
    }
}
