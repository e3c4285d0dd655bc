//! Durable game snapshot.
//!
//! Only the part of the game that should survive a restart is stored. Buzzer
//! queue and timer are not stored and come back as defaults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::round::{FlatRound, RoundState};
use super::Game;
use crate::types::*;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted subset of the game state.
///
/// Every field has a default so older or partial files still load. Files
/// written by the previous server use camelCase keys, accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Snapshot {
    pub players: Vec<Player>,
    #[serde(alias = "isGameStarted")]
    pub started: bool,
    #[serde(alias = "currentRound")]
    pub round: RoundTag,
    #[serde(alias = "currentEasyQuestion")]
    pub easy_index: i32,
    #[serde(alias = "currentHardQuestion")]
    pub hard_index: i32,
    #[serde(alias = "revealedClues")]
    pub revealed_clues: Vec<bool>,
    #[serde(alias = "revealedAnswers")]
    pub revealed_answers: Vec<bool>,
    #[serde(alias = "showSpeedUpAnswers")]
    pub show_speed_up_answers: bool,
    #[serde(alias = "activePlayerId")]
    pub active_player_id: Option<PlayerId>,
    #[serde(alias = "finishQuestionType")]
    pub finish_question_type: FinishQuestionType,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot::from(&Game::default())
    }
}

impl From<&Game> for Snapshot {
    fn from(game: &Game) -> Self {
        let flat = game.round.flatten();
        Self {
            players: game.players.clone(),
            started: game.started,
            round: game.round.tag(),
            easy_index: flat.easy_index,
            hard_index: flat.hard_index,
            revealed_clues: flat.revealed_clues.to_vec(),
            revealed_answers: flat.revealed_answers.to_vec(),
            show_speed_up_answers: flat.show_speed_up_answers,
            active_player_id: game.active_player_id.clone(),
            finish_question_type: game.finish_question_type,
        }
    }
}

impl From<Snapshot> for Game {
    fn from(snapshot: Snapshot) -> Self {
        let mut players: Vec<Player> = Vec::with_capacity(snapshot.players.len());
        for player in snapshot.players {
            if players.iter().any(|p| p.id == player.id) {
                tracing::warn!("Dropping duplicate player {} from snapshot", player.id);
                continue;
            }
            players.push(player);
        }

        let active_player_id = snapshot
            .active_player_id
            .filter(|id| players.iter().any(|p| &p.id == id));

        let flat = FlatRound {
            easy_index: snapshot.easy_index,
            hard_index: snapshot.hard_index,
            revealed_clues: fixed_reveals(&snapshot.revealed_clues),
            revealed_answers: fixed_reveals(&snapshot.revealed_answers),
            show_speed_up_answers: snapshot.show_speed_up_answers,
        };

        Game {
            started: snapshot.started,
            players,
            active_player_id,
            finish_question_type: snapshot.finish_question_type,
            round: RoundState::unflatten(snapshot.round, &flat),
            ..Game::default()
        }
    }
}

/// Pad or truncate a stored reveal array to the board size
fn fixed_reveals(stored: &[bool]) -> [bool; CLUE_COUNT] {
    let mut reveals = [false; CLUE_COUNT];
    for (slot, value) in reveals.iter_mut().zip(stored) {
        *slot = *value;
    }
    reveals
}

/// Storage backend for snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    async fn load(&self) -> Result<Option<Snapshot>, PersistError>;
    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// Snapshot stored as a single JSON document, replaced wholesale on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

/// Build the startup game from the store, falling back to defaults on any failure.
pub async fn load_game(store: &dyn SnapshotStore) -> Game {
    match store.load().await {
        Ok(Some(snapshot)) => {
            let game = Game::from(snapshot);
            tracing::info!(
                "Restored game snapshot: {} players, round {:?}, started={}",
                game.players.len(),
                game.round.tag(),
                game.started
            );
            game
        }
        Ok(None) => {
            tracing::info!("No game snapshot found, starting fresh");
            Game::default()
        }
        Err(e) => {
            tracing::warn!("Ignoring unreadable game snapshot: {}", e);
            Game::default()
        }
    }
}

/// Background snapshot writer.
///
/// `save` never waits for the disk. Writes happen one at a time in a separate
/// task and a backlog collapses to the newest snapshot.
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<Snapshot>,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    pub fn spawn(store: Arc<dyn SnapshotStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(store, rx));
        Self { tx, task }
    }

    pub fn save(&self, game: &Game) {
        if self.tx.send(Snapshot::from(game)).is_err() {
            tracing::error!("Snapshot writer is gone, game state not saved");
        }
    }

    /// Stop accepting snapshots and wait for pending writes to finish.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::error!("Snapshot writer task failed: {}", e);
        }
    }
}

async fn run_writer(store: Arc<dyn SnapshotStore>, mut rx: mpsc::UnboundedReceiver<Snapshot>) {
    while let Some(mut snapshot) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            snapshot = newer;
        }
        match store.save(&snapshot).await {
            Ok(()) => tracing::debug!("Game snapshot saved ({} players)", snapshot.players.len()),
            Err(e) => tracing::error!("Failed to save game snapshot: {}", e),
        }
    }
}
