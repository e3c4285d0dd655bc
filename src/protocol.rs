use crate::questions::QuestionBank;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    // Player messages
    Join {
        name: String,
        id: PlayerId,
    },
    Buzz {
        player_id: PlayerId,
    },
    SubmitAnswer {
        kind: AnswerKind,
        player_id: PlayerId,
        text: String,
    },
    // Host-only messages
    ToggleStar {
        player_id: PlayerId,
    },
    StartGame,
    EndGame,
    SwitchRound {
        round: RoundTag,
    },
    StartTimer {
        seconds: u32,
    },
    Navigate {
        cursor: CursorKind,
        direction: Direction,
    },
    RevealClue {
        index: usize,
    },
    RevealAnswer {
        index: usize,
    },
    RevealSpeedUpAnswers,
    ShowObstacle,
    HideObstacle,
    UpdateScore {
        player_id: PlayerId,
        delta: i64,
    },
    SetActivePlayer {
        player_id: Option<PlayerId>,
    },
    KickPlayer {
        player_id: PlayerId,
    },
    ResetBuzzer,
    BroadcastCue {
        name: String,
    },
}

impl ClientMessage {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::Join { .. } => "join",
            ClientMessage::Buzz { .. } => "buzz",
            ClientMessage::SubmitAnswer { .. } => "submit_answer",
            ClientMessage::ToggleStar { .. } => "toggle_star",
            ClientMessage::StartGame => "start_game",
            ClientMessage::EndGame => "end_game",
            ClientMessage::SwitchRound { .. } => "switch_round",
            ClientMessage::StartTimer { .. } => "start_timer",
            ClientMessage::Navigate { .. } => "navigate",
            ClientMessage::RevealClue { .. } => "reveal_clue",
            ClientMessage::RevealAnswer { .. } => "reveal_answer",
            ClientMessage::RevealSpeedUpAnswers => "reveal_speed_up_answers",
            ClientMessage::ShowObstacle => "show_obstacle",
            ClientMessage::HideObstacle => "hide_obstacle",
            ClientMessage::UpdateScore { .. } => "update_score",
            ClientMessage::SetActivePlayer { .. } => "set_active_player",
            ClientMessage::KickPlayer { .. } => "kick_player",
            ClientMessage::ResetBuzzer => "reset_buzzer",
            ClientMessage::BroadcastCue { .. } => "broadcast_cue",
        }
    }

    /// Messages a contestant's own client may send
    pub fn is_player_message(&self) -> bool {
        matches!(
            self,
            ClientMessage::Join { .. }
                | ClientMessage::Buzz { .. }
                | ClientMessage::SubmitAnswer { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every connection
    Init {
        game_state: GameStateView,
        questions: QuestionBank,
        role: Role,
        server_now: String,
    },
    GameStateUpdate {
        game_state: GameStateView,
    },
    ScoreUpdated {
        player_id: PlayerId,
        new_score: i64,
    },
    Buzzed {
        player_id: PlayerId,
    },
    PlayCue {
        name: String,
    },
}

/// Flat game state as observers see it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateView {
    pub started: bool,
    pub round: RoundTag,
    pub players: Vec<Player>,
    pub buzzer_queue: Vec<PlayerId>,
    pub timer_seconds: u32,
    pub active_player_id: Option<PlayerId>,
    pub easy_index: i32,
    pub hard_index: i32,
    pub revealed_clues: [bool; CLUE_COUNT],
    pub revealed_answers: [bool; CLUE_COUNT],
    pub show_speed_up_answers: bool,
    pub finish_question_type: FinishQuestionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_messages() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"join","name":"Alice","id":"p1"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                name: "Alice".to_string(),
                id: "p1".to_string()
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"navigate","cursor":"easy","direction":"prev"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Navigate {
                cursor: CursorKind::Easy,
                direction: Direction::Prev
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"switch_round","round":"OBSTACLE"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SwitchRound {
                round: RoundTag::Obstacle
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"set_active_player","player_id":null}"#).unwrap();
        assert_eq!(msg, ClientMessage::SetActivePlayer { player_id: None });
    }

    #[test]
    fn test_reject_malformed_client_messages() {
        // Negative index
        assert!(
            serde_json::from_str::<ClientMessage>(r#"{"t":"reveal_clue","index":-1}"#).is_err()
        );
        // Unknown tag
        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"timer_tick"}"#).is_err());
        // Missing field
        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"buzz"}"#).is_err());
    }

    #[test]
    fn test_player_messages() {
        assert!(ClientMessage::Buzz {
            player_id: "p".into()
        }
        .is_player_message());
        assert!(!ClientMessage::ResetBuzzer.is_player_message());
        assert!(!ClientMessage::ToggleStar {
            player_id: "p".into()
        }
        .is_player_message());
    }

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_value(ServerMessage::ScoreUpdated {
            player_id: "p1".into(),
            new_score: 30,
        })
        .unwrap();
        assert_eq!(json["t"], "score_updated");
        assert_eq!(json["new_score"], 30);

        let json = serde_json::to_value(ServerMessage::PlayCue {
            name: "bell.mp3".into(),
        })
        .unwrap();
        assert_eq!(json["t"], "play_cue");
    }
}
