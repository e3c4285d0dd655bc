//! Command application.
//!
//! Every client command either mutates the game and reports which side effects
//! the engine must carry out, or is rejected. Rejections are never sent back to
//! anyone; the engine logs them and moves on.

use chrono::Utc;
use thiserror::Error;

use super::round::{Cursor, RoundState};
use super::Game;
use crate::protocol::ClientMessage;
use crate::questions::QuestionBank;
use crate::types::*;

/// Why a command was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("game already started, roster is locked")]
    RosterLocked,
    #[error("player name and id must not be blank")]
    BlankIdentity,
    #[error("player {0} already joined")]
    DuplicatePlayer(PlayerId),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is already in the buzzer queue")]
    AlreadyBuzzed(PlayerId),
    #[error("clue index {0} out of range")]
    ClueOutOfRange(usize),
    #[error("{action} needs round {expected:?}, current round is {actual:?}")]
    WrongRound {
        action: &'static str,
        expected: RoundTag,
        actual: RoundTag,
    },
    #[error("cursor {0:?} cannot move {1:?}")]
    AtBoundary(CursorKind, Direction),
    #[error("cue name must not be blank")]
    BlankCue,
}

/// What observers should receive after a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    FullState,
    Score { player_id: PlayerId, new_score: i64 },
}

/// Transient events that are not part of the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Buzzed { player_id: PlayerId },
    PlayCue { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerAction {
    #[default]
    Keep,
    Start,
    Cancel,
}

/// Side effects of an applied command, in the order the engine performs them:
/// timer, persistence, update, signals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Effects {
    pub timer: TimerAction,
    pub persist: bool,
    pub update: Option<Update>,
    pub signals: Vec<Signal>,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn full_state() -> Self {
        Self {
            update: Some(Update::FullState),
            ..Self::default()
        }
    }

    pub fn score(player_id: PlayerId, new_score: i64) -> Self {
        Self {
            update: Some(Update::Score {
                player_id,
                new_score,
            }),
            ..Self::default()
        }
    }

    pub fn signal(signal: Signal) -> Self {
        Self::none().with_signal(signal)
    }

    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }

    pub fn with_timer(mut self, timer: TimerAction) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }
}

impl Game {
    /// Apply a client command.
    ///
    /// On `Err` the game may be partially modified; callers apply commands to a
    /// working copy and only keep it on `Ok`.
    pub fn apply(
        &mut self,
        msg: &ClientMessage,
        questions: &QuestionBank,
    ) -> Result<Effects, Rejection> {
        match msg {
            ClientMessage::Join { name, id } => self.join(name, id),
            ClientMessage::Buzz { player_id } => self.buzz(player_id),
            ClientMessage::SubmitAnswer {
                kind,
                player_id,
                text,
            } => self.submit_answer(*kind, player_id, text),
            ClientMessage::ToggleStar { player_id } => {
                let player = self.known_player_mut(player_id)?;
                player.star_of_hope = !player.star_of_hope;
                Ok(Effects::full_state())
            }
            ClientMessage::StartGame => {
                self.started = true;
                Ok(Effects::full_state().persisted())
            }
            ClientMessage::EndGame => {
                *self = Game {
                    players: self.reset_roster(),
                    ..Game::default()
                };
                Ok(Effects::full_state()
                    .persisted()
                    .with_timer(TimerAction::Cancel))
            }
            ClientMessage::SwitchRound { round } => {
                self.round = RoundState::enter(*round);
                self.buzzer_queue.clear();
                self.timer_seconds = 0;
                self.clear_round_flags();
                Ok(Effects::full_state().with_timer(TimerAction::Cancel))
            }
            ClientMessage::StartTimer { seconds } => {
                self.timer_seconds = *seconds;
                let timer = if *seconds > 0 {
                    TimerAction::Start
                } else {
                    TimerAction::Cancel
                };
                Ok(Effects::full_state().with_timer(timer))
            }
            ClientMessage::Navigate { cursor, direction } => {
                self.navigate(*cursor, *direction, questions)
            }
            ClientMessage::RevealClue { index } => {
                let board = self.obstacle_board("reveal_clue")?;
                let slot = board
                    .revealed_clues
                    .get_mut(*index)
                    .ok_or(Rejection::ClueOutOfRange(*index))?;
                *slot = true;
                Ok(Effects::full_state())
            }
            ClientMessage::RevealAnswer { index } => {
                let board = self.obstacle_board("reveal_answer")?;
                let slot = board
                    .revealed_answers
                    .get_mut(*index)
                    .ok_or(Rejection::ClueOutOfRange(*index))?;
                *slot = true;
                Ok(Effects::full_state())
            }
            ClientMessage::RevealSpeedUpAnswers => {
                let actual = self.round.tag();
                let RoundState::SpeedUp { show_answers, .. } = &mut self.round else {
                    return Err(Rejection::WrongRound {
                        action: "reveal_speed_up_answers",
                        expected: RoundTag::SpeedUp,
                        actual,
                    });
                };
                *show_answers = true;
                Ok(Effects::full_state())
            }
            ClientMessage::ShowObstacle => {
                self.obstacle_board("show_obstacle")?.shown = true;
                for player in &mut self.players {
                    player.clear_obstacle_answer();
                }
                Ok(Effects::full_state())
            }
            ClientMessage::HideObstacle => {
                self.obstacle_board("hide_obstacle")?.shown = false;
                Ok(Effects::full_state())
            }
            ClientMessage::UpdateScore { player_id, delta } => {
                let player = self.known_player_mut(player_id)?;
                player.score = player.score.saturating_add(*delta);
                Ok(Effects::score(player.id.clone(), player.score).persisted())
            }
            ClientMessage::SetActivePlayer { player_id } => {
                if let Some(id) = player_id {
                    if !self.has_player(id) {
                        return Err(Rejection::UnknownPlayer(id.clone()));
                    }
                }
                self.active_player_id = player_id.clone();
                Ok(Effects::full_state())
            }
            ClientMessage::KickPlayer { player_id } => {
                if !self.remove_player(player_id) {
                    return Err(Rejection::UnknownPlayer(player_id.clone()));
                }
                Ok(Effects::full_state().persisted())
            }
            ClientMessage::ResetBuzzer => {
                self.buzzer_queue.clear();
                Ok(Effects::full_state())
            }
            ClientMessage::BroadcastCue { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(Rejection::BlankCue);
                }
                Ok(Effects::signal(Signal::PlayCue {
                    name: name.to_string(),
                }))
            }
        }
    }

    /// One countdown second elapsed
    pub fn tick(&mut self) -> Effects {
        self.timer_seconds = self.timer_seconds.saturating_sub(1);
        let effects = Effects::full_state();
        if self.timer_seconds == 0 {
            effects.with_timer(TimerAction::Cancel)
        } else {
            effects
        }
    }

    fn join(&mut self, name: &str, id: &str) -> Result<Effects, Rejection> {
        if self.started {
            return Err(Rejection::RosterLocked);
        }
        if name.trim().is_empty() || id.trim().is_empty() {
            return Err(Rejection::BlankIdentity);
        }
        if self.has_player(id) {
            return Err(Rejection::DuplicatePlayer(id.to_string()));
        }
        self.players.push(Player::new(id, name));
        Ok(Effects::full_state().persisted())
    }

    fn buzz(&mut self, player_id: &str) -> Result<Effects, Rejection> {
        if !self.has_player(player_id) {
            return Err(Rejection::UnknownPlayer(player_id.to_string()));
        }
        if self.buzzer_queue.iter().any(|id| id == player_id) {
            return Err(Rejection::AlreadyBuzzed(player_id.to_string()));
        }
        self.buzzer_queue.push(player_id.to_string());
        Ok(Effects::full_state().with_signal(Signal::Buzzed {
            player_id: player_id.to_string(),
        }))
    }

    fn submit_answer(
        &mut self,
        kind: AnswerKind,
        player_id: &str,
        text: &str,
    ) -> Result<Effects, Rejection> {
        let actual = self.round.tag();
        if actual != kind.round() {
            return Err(Rejection::WrongRound {
                action: "submit_answer",
                expected: kind.round(),
                actual,
            });
        }
        let now = Utc::now().to_rfc3339();
        let player = self.known_player_mut(player_id)?;
        match kind {
            AnswerKind::SpeedUp => {
                player.speed_up_answer = Some(text.to_string());
                player.speed_up_answer_at = Some(now);
            }
            AnswerKind::Obstacle => {
                player.obstacle_answer = Some(text.to_string());
                player.obstacle_answer_at = Some(now);
            }
        }
        Ok(Effects::full_state())
    }

    fn navigate(
        &mut self,
        cursor: CursorKind,
        direction: Direction,
        questions: &QuestionBank,
    ) -> Result<Effects, Rejection> {
        let len = questions.cursor_len(cursor);
        let actual = self.round.tag();
        let wrong_round = |expected| Rejection::WrongRound {
            action: "navigate",
            expected,
            actual,
        };
        let step = |current: Cursor| {
            current
                .step(direction, len)
                .ok_or(Rejection::AtBoundary(cursor, direction))
        };

        match (cursor, &mut self.round) {
            (CursorKind::WarmUp, RoundState::WarmUp { question }) => {
                *question = step(*question)?;
            }
            (CursorKind::WarmUp, _) => return Err(wrong_round(RoundTag::WarmUp)),
            (
                CursorKind::SpeedUp,
                RoundState::SpeedUp {
                    video,
                    show_answers,
                },
            ) => {
                *video = step(*video)?;
                *show_answers = false;
                for player in &mut self.players {
                    player.clear_speed_up_answer();
                }
            }
            (CursorKind::SpeedUp, _) => return Err(wrong_round(RoundTag::SpeedUp)),
            (CursorKind::Easy, RoundState::Finish { easy, .. }) => {
                let moved = step(*easy);
                select_finish(
                    &mut self.finish_question_type,
                    FinishQuestionType::Easy,
                    easy,
                    moved,
                )?;
            }
            (CursorKind::Hard, RoundState::Finish { hard, .. }) => {
                let moved = step(*hard);
                select_finish(
                    &mut self.finish_question_type,
                    FinishQuestionType::Hard,
                    hard,
                    moved,
                )?;
            }
            (CursorKind::Easy | CursorKind::Hard, _) => {
                return Err(wrong_round(RoundTag::Finish))
            }
        }
        Ok(Effects::full_state())
    }

    fn known_player_mut(&mut self, player_id: &str) -> Result<&mut Player, Rejection> {
        self.player_mut(player_id)
            .ok_or_else(|| Rejection::UnknownPlayer(player_id.to_string()))
    }

    fn obstacle_board(
        &mut self,
        action: &'static str,
    ) -> Result<&mut super::ObstacleBoard, Rejection> {
        let actual = self.round.tag();
        match &mut self.round {
            RoundState::Obstacle(board) => Ok(board),
            _ => Err(Rejection::WrongRound {
                action,
                expected: RoundTag::Obstacle,
                actual,
            }),
        }
    }
}

/// Finish navigation always selects its set, even when that set's cursor is
/// already at an edge. A boundary only rejects when nothing changes.
fn select_finish(
    shown: &mut FinishQuestionType,
    target: FinishQuestionType,
    cursor: &mut Cursor,
    moved: Result<Cursor, Rejection>,
) -> Result<(), Rejection> {
    let switched = *shown != target;
    *shown = target;
    match moved {
        Ok(next) => {
            *cursor = next;
            Ok(())
        }
        Err(_) if switched => Ok(()),
        Err(boundary) => Err(boundary),
    }
}
