use crate::types::{Direction, RoundTag, CLUE_COUNT};

/// Navigation cursor. `None` is the intro screen, shown as `-1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor(Option<usize>);

impl Cursor {
    pub const INTRO: Cursor = Cursor(None);

    pub fn at(index: usize) -> Self {
        Cursor(Some(index))
    }

    pub fn to_wire(self) -> i32 {
        self.0
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(-1)
    }

    /// Negative values are the intro sentinel.
    pub fn from_wire(value: i32) -> Self {
        usize::try_from(value).map(Cursor::at).unwrap_or(Cursor::INTRO)
    }

    /// Move one step within a set of `len` items.
    ///
    /// Returns `None` when the move would leave `[0, len)`; there is no wraparound
    /// and no way back to the intro screen.
    pub fn step(self, direction: Direction, len: usize) -> Option<Cursor> {
        let target = match (self.0, direction) {
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => return None,
            (Some(i), Direction::Next) => i + 1,
            (Some(i), Direction::Prev) => i.checked_sub(1)?,
        };
        (target < len).then_some(Cursor::at(target))
    }
}

/// Obstacle board: hidden keyword with progressively revealed clues
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObstacleBoard {
    /// Board content is on screen (the intro is hidden)
    pub shown: bool,
    pub revealed_clues: [bool; CLUE_COUNT],
    pub revealed_answers: [bool; CLUE_COUNT],
}

/// Round-scoped state. Each round only carries the fields it uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoundState {
    #[default]
    Lobby,
    WarmUp {
        question: Cursor,
    },
    Obstacle(ObstacleBoard),
    SpeedUp {
        video: Cursor,
        show_answers: bool,
    },
    Finish {
        easy: Cursor,
        hard: Cursor,
    },
}

/// Round fields in their flat wire shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRound {
    pub easy_index: i32,
    pub hard_index: i32,
    pub revealed_clues: [bool; CLUE_COUNT],
    pub revealed_answers: [bool; CLUE_COUNT],
    pub show_speed_up_answers: bool,
}

impl RoundState {
    /// Round-entry defaults
    pub fn enter(tag: RoundTag) -> Self {
        match tag {
            RoundTag::Lobby => RoundState::Lobby,
            RoundTag::WarmUp => RoundState::WarmUp {
                question: Cursor::INTRO,
            },
            RoundTag::Obstacle => RoundState::Obstacle(ObstacleBoard::default()),
            RoundTag::SpeedUp => RoundState::SpeedUp {
                video: Cursor::INTRO,
                show_answers: false,
            },
            RoundTag::Finish => RoundState::Finish {
                easy: Cursor::INTRO,
                hard: Cursor::INTRO,
            },
        }
    }

    pub fn tag(&self) -> RoundTag {
        match self {
            RoundState::Lobby => RoundTag::Lobby,
            RoundState::WarmUp { .. } => RoundTag::WarmUp,
            RoundState::Obstacle(_) => RoundTag::Obstacle,
            RoundState::SpeedUp { .. } => RoundTag::SpeedUp,
            RoundState::Finish { .. } => RoundTag::Finish,
        }
    }

    pub fn flatten(&self) -> FlatRound {
        let mut flat = FlatRound {
            easy_index: -1,
            hard_index: -1,
            revealed_clues: [false; CLUE_COUNT],
            revealed_answers: [false; CLUE_COUNT],
            show_speed_up_answers: false,
        };
        match self {
            RoundState::Lobby => {}
            RoundState::WarmUp { question } => flat.easy_index = question.to_wire(),
            RoundState::Obstacle(board) => {
                flat.easy_index = if board.shown { 0 } else { -1 };
                flat.revealed_clues = board.revealed_clues;
                flat.revealed_answers = board.revealed_answers;
            }
            RoundState::SpeedUp {
                video,
                show_answers,
            } => {
                flat.easy_index = video.to_wire();
                flat.show_speed_up_answers = *show_answers;
            }
            RoundState::Finish { easy, hard } => {
                flat.easy_index = easy.to_wire();
                flat.hard_index = hard.to_wire();
            }
        }
        flat
    }

    /// Rebuild round state from its flat shape, keeping only what `tag` uses.
    pub fn unflatten(tag: RoundTag, flat: &FlatRound) -> Self {
        match tag {
            RoundTag::Lobby => RoundState::Lobby,
            RoundTag::WarmUp => RoundState::WarmUp {
                question: Cursor::from_wire(flat.easy_index),
            },
            RoundTag::Obstacle => RoundState::Obstacle(ObstacleBoard {
                shown: flat.easy_index >= 0,
                revealed_clues: flat.revealed_clues,
                revealed_answers: flat.revealed_answers,
            }),
            RoundTag::SpeedUp => RoundState::SpeedUp {
                video: Cursor::from_wire(flat.easy_index),
                show_answers: flat.show_speed_up_answers,
            },
            RoundTag::Finish => RoundState::Finish {
                easy: Cursor::from_wire(flat.easy_index),
                hard: Cursor::from_wire(flat.hard_index),
            },
        }
    }
}
