use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type ConnectionId = String;

/// Number of clues on the obstacle board (and length of both reveal arrays)
pub const CLUE_COUNT: usize = 8;

/// Older snapshots use the on-screen round names, accepted on load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundTag {
    #[default]
    Lobby,
    #[serde(alias = "Khởi động")]
    WarmUp,
    #[serde(alias = "Chướng ngại vật")]
    Obstacle,
    #[serde(alias = "Tăng tốc")]
    SpeedUp,
    #[serde(alias = "Về đích")]
    Finish,
}

/// Which finish-round question set is on screen.
///
/// Older snapshots spell these as point values, so those labels are accepted on load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishQuestionType {
    #[default]
    #[serde(alias = "easy", alias = "20p", alias = "20đ")]
    Easy,
    #[serde(alias = "hard", alias = "30p", alias = "30đ")]
    Hard,
}

/// Kind of free-text answer a player can submit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    SpeedUp,
    Obstacle,
}

impl AnswerKind {
    /// Round in which answers of this kind are collected
    pub fn round(self) -> RoundTag {
        match self {
            AnswerKind::SpeedUp => RoundTag::SpeedUp,
            AnswerKind::Obstacle => RoundTag::Obstacle,
        }
    }
}

/// Navigation cursors the host can move
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    /// Warm-up question
    WarmUp,
    /// Speed-up video
    SpeedUp,
    /// Finish round, easy set
    Easy,
    /// Finish round, hard set
    Hard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Prev,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: i64,
    #[serde(default, alias = "hasStarOfHope")]
    pub star_of_hope: bool,
    #[serde(default, alias = "speedUpAnswer", skip_serializing_if = "Option::is_none")]
    pub speed_up_answer: Option<String>,
    /// ISO timestamp of the speed-up submission
    #[serde(default, alias = "speedUpAnswerAt", skip_serializing_if = "Option::is_none")]
    pub speed_up_answer_at: Option<String>,
    #[serde(default, alias = "obstacleAnswer", skip_serializing_if = "Option::is_none")]
    pub obstacle_answer: Option<String>,
    /// ISO timestamp of the obstacle submission
    #[serde(default, alias = "obstacleAnswerAt", skip_serializing_if = "Option::is_none")]
    pub obstacle_answer_at: Option<String>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0,
            star_of_hope: false,
            speed_up_answer: None,
            speed_up_answer_at: None,
            obstacle_answer: None,
            obstacle_answer_at: None,
        }
    }

    pub fn clear_speed_up_answer(&mut self) {
        self.speed_up_answer = None;
        self.speed_up_answer_at = None;
    }

    pub fn clear_obstacle_answer(&mut self) {
        self.obstacle_answer = None;
        self.obstacle_answer_at = None;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Moderator panel, the only role allowed to drive the show
    Host,
    /// Public display, read-only
    Beamer,
    Player,
}

impl Role {
    /// Parse the `role` query parameter; anything unknown is a read-only display.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("host") => Role::Host,
            Some("player") => Role::Player,
            _ => Role::Beamer,
        }
    }
}

/// Attached observers per role
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionCounts {
    pub hosts: usize,
    pub beamers: usize,
    pub players: usize,
}
