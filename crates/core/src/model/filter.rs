use std::fmt;

use crate::model::question::{
    ALL_LABEL, Category, Difficulty, ParseDifficultyError, Question, QuestionError,
};

/// Category/difficulty selection for a quiz. `None` stands for "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QuestionFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionFilter {
    /// Filter that matches every question.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from user-facing labels where "All" (any case) or a blank
    /// label disables that dimension.
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if the difficulty label is unknown.
    pub fn from_labels(category: &str, difficulty: &str) -> Result<Self, FilterError> {
        let category = if is_all(category) {
            None
        } else {
            Some(Category::new(category)?)
        };
        let difficulty = if is_all(difficulty) {
            None
        } else {
            Some(difficulty.parse::<Difficulty>()?)
        };
        Ok(Self {
            category,
            difficulty,
        })
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.category.is_none() && self.difficulty.is_none()
    }

    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        self.category
            .as_ref()
            .is_none_or(|c| c == question.category())
            && self.difficulty.is_none_or(|d| d == question.difficulty())
    }

    /// Label stored on results for the category selection.
    #[must_use]
    pub fn category_label(&self) -> String {
        self.category
            .as_ref()
            .map_or_else(|| ALL_LABEL.to_owned(), ToString::to_string)
    }

    /// Label stored on results for the difficulty selection.
    #[must_use]
    pub fn difficulty_label(&self) -> String {
        self.difficulty
            .map_or_else(|| ALL_LABEL.to_owned(), |d| d.as_str().to_owned())
    }
}

impl fmt::Display for QuestionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category_label(), self.difficulty_label())
    }
}

fn is_all(label: &str) -> bool {
    let trimmed = label.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_LABEL)
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterError {
    #[error(transparent)]
    Category(#[from] QuestionError),
    #[error(transparent)]
    Difficulty(#[from] ParseDifficultyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSlot, QuestionId};
    use crate::time::fixed_now;

    fn question(category: &str, difficulty: Difficulty) -> Question {
        Question::from_persisted(
            QuestionId::new(1),
            "Q".into(),
            ["a", "b", "c", "d"].map(String::from),
            AnswerSlot::A,
            category.into(),
            difficulty,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn all_labels_produce_empty_filter() {
        let filter = QuestionFilter::from_labels("All", "all").unwrap();
        assert!(filter.is_all());
        assert_eq!(filter.to_string(), "All / All");
    }

    #[test]
    fn labels_parse_into_filter() {
        let filter = QuestionFilter::from_labels("Science", "Hard").unwrap();
        assert_eq!(filter.category_label(), "Science");
        assert_eq!(filter.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let err = QuestionFilter::from_labels("All", "Impossible").unwrap_err();
        assert!(matches!(err, FilterError::Difficulty(_)));
    }

    #[test]
    fn matches_respects_both_dimensions() {
        let q = question("Science", Difficulty::Easy);
        assert!(QuestionFilter::all().matches(&q));
        assert!(QuestionFilter::from_labels("Science", "All").unwrap().matches(&q));
        assert!(!QuestionFilter::from_labels("Science", "Hard").unwrap().matches(&q));
        assert!(!QuestionFilter::from_labels("History", "All").unwrap().matches(&q));
    }
}
