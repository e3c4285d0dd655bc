//! The game engine task.
//!
//! One task owns the [`Game`] and drains a single command queue. Client
//! commands, timer ticks and observer attach/detach all go through that queue,
//! so each command is fully applied and broadcast before the next one starts.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::broadcast::Broadcaster;
use crate::protocol::{ClientMessage, GameStateView, ServerMessage};
use crate::questions::QuestionBank;
use crate::registry::ConnectionRegistry;
use crate::state::persist::{SnapshotStore, SnapshotWriter};
use crate::state::{Effects, Game, TimerAction};
use crate::timer::{TimerService, TimerTick};
use crate::types::{ConnectionCounts, ConnectionId, Role};

pub enum Command {
    Client(ClientMessage),
    Tick(TimerTick),
    Attach {
        role: Role,
        reply: oneshot::Sender<Attachment>,
    },
    Detach {
        id: ConnectionId,
    },
    Snapshot {
        reply: oneshot::Sender<GameStateView>,
    },
    Status {
        reply: oneshot::Sender<StatusReport>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

impl From<TimerTick> for Command {
    fn from(tick: TimerTick) -> Self {
        Command::Tick(tick)
    }
}

/// A freshly attached observer: the `init` frame plus every frame after it
pub struct Attachment {
    pub id: ConnectionId,
    pub init: ServerMessage,
    pub updates: broadcast::Receiver<ServerMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub game_state: GameStateView,
    pub players: usize,
    pub connections: ConnectionCounts,
}

/// Cheap, cloneable access to the engine task
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    /// Queue a client command. Invalid commands are dropped by the engine.
    pub fn submit(&self, msg: ClientMessage) {
        if self.tx.send(Command::Client(msg)).is_err() {
            tracing::warn!("Game engine is not running, command dropped");
        }
    }

    pub async fn attach(&self, role: Role) -> Option<Attachment> {
        self.request(|reply| Command::Attach { role, reply }).await
    }

    pub fn detach(&self, id: ConnectionId) {
        let _ = self.tx.send(Command::Detach { id });
    }

    /// Replace a lagging attachment with a fresh one.
    ///
    /// The new receiver starts right after the returned state, so nothing older
    /// than it can be delivered. The old connection is detached afterwards.
    pub async fn resync(&self, old: ConnectionId, role: Role) -> Option<Attachment> {
        let attachment = self.attach(role).await?;
        self.detach(old);
        Some(attachment)
    }

    /// Current state, ordered after everything submitted before
    pub async fn snapshot(&self) -> Option<GameStateView> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn status(&self) -> Option<StatusReport> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Stop the engine after the queued commands and wait for the last save.
    pub async fn shutdown(&self) {
        let _ = self.request(|reply| Command::Shutdown { reply }).await;
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Option<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(command(reply)).ok()?;
        rx.await.ok()
    }
}

pub struct Engine {
    game: Game,
    questions: Arc<QuestionBank>,
    timer: TimerService,
    registry: ConnectionRegistry,
    broadcaster: Broadcaster,
    writer: Option<SnapshotWriter>,
    /// Weak so that dropping every handle still ends the task
    ticks: mpsc::WeakUnboundedSender<Command>,
}

impl Engine {
    /// Start the engine task on the current runtime.
    pub fn spawn(
        game: Game,
        questions: Arc<QuestionBank>,
        store: Arc<dyn SnapshotStore>,
    ) -> EngineHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Engine {
            game,
            questions,
            timer: TimerService::default(),
            registry: ConnectionRegistry::new(),
            broadcaster: Broadcaster::default(),
            writer: Some(SnapshotWriter::spawn(store)),
            ticks: tx.downgrade(),
        };
        tokio::spawn(engine.run(rx));
        EngineHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("Game engine started");

        while let Some(command) = rx.recv().await {
            match command {
                Command::Client(msg) => self.handle_client(msg),
                Command::Tick(tick) => self.handle_tick(tick),
                Command::Attach { role, reply } => {
                    let attachment = self.attach(role);
                    let id = attachment.id.clone();
                    if reply.send(attachment).is_err() {
                        self.registry.detach(&id);
                    }
                }
                Command::Detach { id } => {
                    if let Some(role) = self.registry.detach(&id) {
                        tracing::info!(
                            "Observer {} ({:?}) detached, {} still connected",
                            id,
                            role,
                            self.registry.len()
                        );
                    }
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.game.view());
                }
                Command::Status { reply } => {
                    let _ = reply.send(StatusReport {
                        game_state: self.game.view(),
                        players: self.game.players.len(),
                        connections: self.registry.counts(),
                    });
                }
                Command::Shutdown { reply } => {
                    self.stop().await;
                    let _ = reply.send(());
                    return;
                }
            }
        }

        self.stop().await;
    }

    fn handle_client(&mut self, msg: ClientMessage) {
        let mut next = self.game.clone();
        match next.apply(&msg, &self.questions) {
            Ok(effects) => {
                tracing::debug!("Applied {}", msg.name());
                self.game = next;
                self.commit(effects);
            }
            Err(rejection) => {
                tracing::debug!("Dropped {}: {}", msg.name(), rejection);
            }
        }
    }

    fn handle_tick(&mut self, tick: TimerTick) {
        if !self.timer.accepts(tick) {
            tracing::trace!("Ignoring stale timer tick (epoch {})", tick.epoch);
            return;
        }
        let effects = self.game.tick();
        self.commit(effects);
    }

    fn commit(&mut self, effects: Effects) {
        match effects.timer {
            TimerAction::Keep => {}
            TimerAction::Start => {
                self.timer.start(self.ticks.clone());
            }
            TimerAction::Cancel => self.timer.cancel(),
        }

        if effects.persist {
            if let Some(writer) = &self.writer {
                writer.save(&self.game);
            }
        }

        if let Some(update) = effects.update {
            self.broadcaster.update(update, &self.game);
        }
        for signal in effects.signals {
            self.broadcaster.signal(signal);
        }
    }

    fn attach(&mut self, role: Role) -> Attachment {
        // Subscribe before building init: nothing can be broadcast in between
        let updates = self.broadcaster.subscribe();
        let id = self.registry.attach(role);
        tracing::info!(
            "Observer {} attached as {:?}, {} connected",
            id,
            role,
            self.registry.len()
        );

        Attachment {
            id,
            init: ServerMessage::Init {
                game_state: self.game.view(),
                questions: (*self.questions).clone(),
                role,
                server_now: chrono::Utc::now().to_rfc3339(),
            },
            updates,
        }
    }

    async fn stop(&mut self) {
        self.timer.cancel();
        if let Some(writer) = self.writer.take() {
            writer.close().await;
        }
        tracing::info!("Game engine stopped");
    }
}
