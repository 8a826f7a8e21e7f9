use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a question received from the backend cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question needs at least 2 options, got {len}")]
    TooFewOptions { len: usize },

    #[error("answer {answer:?} is not one of the options")]
    AnswerNotInOptions { answer: String },

    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),

    #[error("question prompt is empty")]
    EmptyPrompt,
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Difficulty tag attached to each question.
///
/// Parsed case-insensitively; grading never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_owned())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION TYPES ───────────────────────────────────────────────────────────
//

/// Wire shape of a question as the backend sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_reference: Option<String>,
}

impl QuestionDraft {
    /// Check the draft and pin it to its position in the document.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two options are
    /// given, the answer is not one of the options, or the difficulty is unknown.
    pub fn validate(self, ordinal: usize) -> Result<Question, QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                len: self.options.len(),
            });
        }
        if !self.options.iter().any(|o| *o == self.answer) {
            return Err(QuestionError::AnswerNotInOptions {
                answer: self.answer,
            });
        }
        let difficulty = self.difficulty.parse()?;

        Ok(Question {
            id: self.id,
            ordinal,
            prompt: self.question,
            options: self.options,
            answer: self.answer,
            difficulty,
            section_reference: self
                .section_reference
                .filter(|s| !s.trim().is_empty()),
            explanation: self.explanation,
        })
    }
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    ordinal: usize,
    prompt: String,
    options: Vec<String>,
    answer: String,
    difficulty: Difficulty,
    section_reference: Option<String>,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Zero-based position of this question in its document.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The canonical correct option, byte-for-byte as the backend sent it.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn section_reference(&self) -> Option<&str> {
        self.section_reference.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }

    /// Exact comparison against the answer key.
    #[must_use]
    pub fn is_correct(&self, value: &str) -> bool {
        self.answer == value
    }

    pub(crate) fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            id: self.id,
            question: self.prompt.clone(),
            options: self.options.clone(),
            answer: self.answer.clone(),
            difficulty: self.difficulty.as_str().to_owned(),
            explanation: self.explanation.clone(),
            section_reference: self.section_reference.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
