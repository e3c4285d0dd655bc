pub mod apply;
pub mod persist;
mod player;
pub mod round;

use crate::protocol::GameStateView;
use crate::types::*;

pub use apply::{Effects, Rejection, Signal, TimerAction, Update};
pub use round::{Cursor, ObstacleBoard, RoundState};

/// The authoritative game state.
///
/// Owned by the engine task; everything else only sees [`GameStateView`] copies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Game {
    /// Roster is locked and gameplay has begun
    pub started: bool,
    /// Join order
    pub players: Vec<Player>,
    /// FIFO, index 0 holds the right to answer
    pub buzzer_queue: Vec<PlayerId>,
    pub timer_seconds: u32,
    pub active_player_id: Option<PlayerId>,
    pub finish_question_type: FinishQuestionType,
    pub round: RoundState,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat wire representation
    pub fn view(&self) -> GameStateView {
        let flat = self.round.flatten();
        GameStateView {
            started: self.started,
            round: self.round.tag(),
            players: self.players.clone(),
            buzzer_queue: self.buzzer_queue.clone(),
            timer_seconds: self.timer_seconds,
            active_player_id: self.active_player_id.clone(),
            easy_index: flat.easy_index,
            hard_index: flat.hard_index,
            revealed_clues: flat.revealed_clues,
            revealed_answers: flat.revealed_answers,
            show_speed_up_answers: flat.show_speed_up_answers,
            finish_question_type: self.finish_question_type,
        }
    }
}
