//! Single-task event loop that owns the session.
//!
//! Every transition, reaper ticks included, runs on the one task spawned by
//! [`SessionHandle::spawn`], so handlers never interleave.

use crate::{
    ClientMessage, ConnectionId, Event, Hub, ServerError, ServerMessage, Session, SessionSnapshot,
};
use chrono::Utc;
use sacrifice_rules::RulesEngine;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
enum Command {
    Connect {
        id: ConnectionId,
        peer: mpsc::UnboundedSender<ServerMessage>,
    },
    Disconnect(ConnectionId),
    Message(ConnectionId, ClientMessage),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Cloneable entry point to the running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
}

impl SessionHandle {
    /// Moves `session` onto its own task and returns a handle to it.
    ///
    /// The reaper fires every `policy.check_interval`. The task ends once
    /// every handle has been dropped.
    #[instrument(skip(session))]
    pub fn spawn<R>(session: Session<R>) -> (Self, JoinHandle<()>)
    where
        R: RulesEngine + Send + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(session, receiver));
        let handle = Self {
            commands,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (handle, task)
    }

    /// Registers a new connection and returns its id and message stream.
    #[instrument(skip(self))]
    pub fn connect(
        &self,
    ) -> Result<(ConnectionId, mpsc::UnboundedReceiver<ServerMessage>), ServerError> {
        let id = ConnectionId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (peer, stream) = mpsc::unbounded_channel();
        self.submit(Command::Connect { id, peer })?;
        Ok((id, stream))
    }

    /// Reports that `id` has gone away.
    #[instrument(skip(self))]
    pub fn disconnect(&self, id: ConnectionId) -> Result<(), ServerError> {
        self.submit(Command::Disconnect(id))
    }

    /// Forwards a client message from `id`.
    #[instrument(skip(self))]
    pub fn send(&self, id: ConnectionId, message: ClientMessage) -> Result<(), ServerError> {
        self.submit(Command::Message(id, message))
    }

    /// Fetches a summary of the session.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ServerError> {
        let (reply, response) = oneshot::channel();
        self.submit(Command::Snapshot(reply))?;
        response
            .await
            .map_err(|_| ServerError::new("Session loop dropped snapshot request"))
    }

    fn submit(&self, command: Command) -> Result<(), ServerError> {
        self.commands
            .send(command)
            .map_err(|_| ServerError::new("Session loop has stopped"))
    }
}

async fn run_loop<R: RulesEngine>(
    mut session: Session<R>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut hub = Hub::new();
    // `interval` panics on a zero period.
    let period = session.policy().check_interval.max(Duration::from_millis(1));
    let mut reaper = tokio::time::interval(period);
    reaper.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    reaper.tick().await;

    info!(
        check_interval = ?session.policy().check_interval,
        timeout = ?session.policy().timeout,
        "Session loop started"
    );

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("All session handles dropped, stopping loop");
                    break;
                };
                match command {
                    Command::Connect { id, peer } => {
                        hub.register(id, peer);
                        hub.dispatch(session.handle(Event::Connect(id), Utc::now()));
                    }
                    Command::Disconnect(id) => {
                        if !hub.unregister(id) {
                            warn!(connection_id = %id, "Disconnect for unregistered peer");
                        }
                        hub.dispatch(session.handle(Event::Disconnect(id), Utc::now()));
                    }
                    Command::Message(id, message) => {
                        hub.dispatch(session.handle(Event::Message(id, message), Utc::now()));
                    }
                    Command::Snapshot(reply) => {
                        if reply.send(session.snapshot()).is_err() {
                            debug!("Snapshot requester went away");
                        }
                    }
                }
            }
            _ = reaper.tick() => {
                hub.dispatch(session.handle(Event::ReaperTick, Utc::now()));
            }
        }
    }
}
