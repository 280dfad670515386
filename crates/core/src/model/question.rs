use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Label that means "no filter" for category and difficulty selections.
pub const ALL_LABEL: &str = "All";

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("answer option {slot} cannot be empty")]
    EmptyOption { slot: AnswerSlot },

    #[error("category label cannot be empty")]
    EmptyCategory,

    #[error("category label `{0}` is reserved")]
    ReservedCategory(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid answer slot: {raw}")]
pub struct ParseSlotError {
    raw: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid difficulty: {raw}")]
pub struct ParseDifficultyError {
    raw: String,
}

//
// ─── ANSWER SLOT ───────────────────────────────────────────────────────────────
//

/// One of the four answer positions of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerSlot {
    A,
    B,
    C,
    D,
}

impl AnswerSlot {
    pub const ALL: [AnswerSlot; OPTION_COUNT] =
        [AnswerSlot::A, AnswerSlot::B, AnswerSlot::C, AnswerSlot::D];

    /// Zero-based position of the slot.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AnswerSlot::A => 0,
            AnswerSlot::B => 1,
            AnswerSlot::C => 2,
            AnswerSlot::D => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerSlot::A => "A",
            AnswerSlot::B => "B",
            AnswerSlot::C => "C",
            AnswerSlot::D => "D",
        }
    }
}

impl fmt::Display for AnswerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerSlot {
    type Err = ParseSlotError;

    /// Accepts a letter (`a`-`d`, any case) or a 1-based option number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" | "1" => Ok(AnswerSlot::A),
            "B" | "2" => Ok(AnswerSlot::B),
            "C" | "3" => Ok(AnswerSlot::C),
            "D" | "4" => Ok(AnswerSlot::D),
            _ => Err(ParseSlotError { raw: s.to_owned() }),
        }
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError { raw: s.to_owned() }),
        }
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Free-form, non-empty category label such as "Science".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Creates a category from a trimmed label.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyCategory` for blank labels and
    /// `QuestionError::ReservedCategory` for the "All" sentinel.
    pub fn new(label: impl Into<String>) -> Result<Self, QuestionError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(QuestionError::EmptyCategory);
        }
        if trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            return Err(QuestionError::ReservedCategory(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = QuestionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Validated question content that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    prompt: String,
    options: [String; OPTION_COUNT],
    correct: AnswerSlot,
    category: Category,
    difficulty: Difficulty,
}

impl QuestionDraft {
    /// Validate prompt and options, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or any option is blank.
    pub fn new(
        prompt: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct: AnswerSlot,
        category: Category,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let options = options.map(|o| o.trim().to_owned());
        if let Some(pos) = options.iter().position(String::is_empty) {
            let slot = AnswerSlot::ALL[pos];
            return Err(QuestionError::EmptyOption { slot });
        }

        Ok(Self {
            prompt,
            options,
            correct,
            category,
            difficulty,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> AnswerSlot {
        self.correct
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Attach a storage id and creation timestamp.
    #[must_use]
    pub fn into_question(self, id: QuestionId, created_at: DateTime<Utc>) -> Question {
        Question {
            id,
            content: self,
            created_at,
        }
    }
}

/// A stored trivia question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    content: QuestionDraft,
    created_at: DateTime<Utc>,
}

impl Question {
    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if stored fields fail validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: QuestionId,
        prompt: String,
        options: [String; OPTION_COUNT],
        correct: AnswerSlot,
        category: String,
        difficulty: Difficulty,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionError> {
        let category = Category::new(category)?;
        let content = QuestionDraft::new(prompt, options, correct, category, difficulty)?;
        Ok(content.into_question(id, created_at))
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        self.content.prompt()
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        self.content.options()
    }

    #[must_use]
    pub fn option(&self, slot: AnswerSlot) -> &str {
        &self.content.options()[slot.index()]
    }

    #[must_use]
    pub fn correct(&self) -> AnswerSlot {
        self.content.correct()
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        self.content.category()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.content.difficulty()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn content(&self) -> &QuestionDraft {
        &self.content
    }

    #[must_use]
    pub fn is_correct(&self, choice: AnswerSlot) -> bool {
        self.content.correct() == choice
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
