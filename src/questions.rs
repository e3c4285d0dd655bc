//! Static question bank.
//!
//! The bank is read once at startup and never mutated. The engine only needs
//! the length of each set to bound navigation; the content itself is relayed
//! to observers in the `init` frame. Field names follow the existing data file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::types::CursorKind;

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuestionBank {
    #[serde(rename = "KhoiDong")]
    pub warm_up: Vec<WarmUpQuestion>,
    #[serde(rename = "ChuongNgaiVat")]
    pub obstacle: ObstacleSet,
    #[serde(rename = "TangToc")]
    pub speed_up: Vec<SpeedUpVideo>,
    #[serde(rename = "VeDich")]
    pub finish: FinishQuestions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarmUpQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleSet {
    pub img: String,
    pub keyword: String,
    pub clues: Vec<ObstacleClue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleClue {
    pub question: String,
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeedUpVideo {
    pub video: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FinishQuestions {
    #[serde(alias = "20p")]
    pub easy: Vec<FinishQuestion>,
    #[serde(alias = "30p")]
    pub hard: Vec<FinishQuestion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FinishQuestion {
    pub question: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuestionBank {
    /// Parse a bank from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QuestionBankError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load the bank, falling back to an empty one if the file is missing or broken.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(bank) => {
                tracing::info!(
                    "Loaded question bank from {}: {} warm-up, {} clues, {} videos, {}/{} finish",
                    path.display(),
                    bank.warm_up.len(),
                    bank.obstacle.clues.len(),
                    bank.speed_up.len(),
                    bank.finish.easy.len(),
                    bank.finish.hard.len()
                );
                bank
            }
            Err(QuestionBankError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Question bank {} not found, starting with an empty bank",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Question bank {} unusable ({}), starting with an empty bank",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Number of positions a navigation cursor can take
    pub fn cursor_len(&self, cursor: CursorKind) -> usize {
        match cursor {
            CursorKind::WarmUp => self.warm_up.len(),
            CursorKind::SpeedUp => self.speed_up.len(),
            CursorKind::Easy => self.finish.easy.len(),
            CursorKind::Hard => self.finish.hard.len(),
        }
    }
}
