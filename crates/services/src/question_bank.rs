use std::sync::Arc;

use serde::Deserialize;

use quiz_core::model::{
    AnswerSlot, Category, Difficulty, OPTION_COUNT, Question, QuestionDraft, QuestionFilter,
    QuestionId,
};
use storage::repository::QuestionRepository;

use crate::Clock;
use crate::error::QuestionBankError;
use crate::sample_bank::sample_drafts;

/// One entry of a question import file, validated after parsing.
#[derive(Debug, Deserialize)]
struct ImportedQuestion {
    prompt: String,
    options: Vec<String>,
    correct: String,
    category: String,
    difficulty: String,
}

impl ImportedQuestion {
    fn into_draft(self) -> Result<QuestionDraft, String> {
        let options: [String; OPTION_COUNT] = self.options.try_into().map_err(|v: Vec<String>| {
            format!("expected {OPTION_COUNT} options, found {}", v.len())
        })?;
        let correct = self
            .correct
            .parse::<AnswerSlot>()
            .map_err(|e| e.to_string())?;
        let difficulty = self
            .difficulty
            .parse::<Difficulty>()
            .map_err(|e| e.to_string())?;
        let category = Category::new(self.category).map_err(|e| e.to_string())?;

        QuestionDraft::new(self.prompt, options, correct, category, difficulty)
            .map_err(|e| e.to_string())
    }
}

/// Manages the stored question bank.
#[derive(Clone)]
pub struct QuestionBankService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionBankService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { clock, questions }
    }

    /// Insert the built-in sample bank when no questions are stored.
    ///
    /// Returns how many questions were inserted.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if counting or inserting fails.
    pub async fn seed_if_empty(&self) -> Result<usize, QuestionBankError> {
        if self.questions.count_questions().await? > 0 {
            return Ok(0);
        }

        let drafts = sample_drafts()?;
        let ids = self
            .questions
            .insert_questions(&drafts, self.clock.now())
            .await?;
        tracing::info!(inserted = ids.len(), "seeded sample questions");
        Ok(ids.len())
    }

    /// Import questions from a JSON array.
    ///
    /// Every entry is validated before anything is written; one bad entry
    /// rejects the whole file.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Json` for malformed JSON.
    /// Returns `QuestionBankError::InvalidImport` for the first invalid entry.
    /// Returns `QuestionBankError::Storage` if persistence fails.
    pub async fn import_json(&self, text: &str) -> Result<Vec<QuestionId>, QuestionBankError> {
        let entries: Vec<ImportedQuestion> = serde_json::from_str(text)?;
        let drafts = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .into_draft()
                    .map_err(|reason| QuestionBankError::InvalidImport { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ids = self
            .questions
            .insert_questions(&drafts, self.clock.now())
            .await?;
        tracing::info!(imported = ids.len(), "imported questions");
        Ok(ids)
    }

    /// Questions matching `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if the query fails.
    pub async fn list(&self, filter: &QuestionFilter) -> Result<Vec<Question>, QuestionBankError> {
        Ok(self.questions.list_questions(filter).await?)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if the query fails.
    pub async fn get(&self, id: QuestionId) -> Result<Option<Question>, QuestionBankError> {
        Ok(self.questions.get_question(id).await?)
    }

    /// Persist a single validated draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if persistence fails.
    pub async fn add(&self, draft: &QuestionDraft) -> Result<QuestionId, QuestionBankError> {
        let id = self
            .questions
            .insert_question(draft, self.clock.now())
            .await?;
        tracing::debug!(question_id = %id, "question added");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` (including `NotFound`) on failure.
    pub async fn delete(&self, id: QuestionId) -> Result<(), QuestionBankError> {
        self.questions.delete_question(id).await?;
        tracing::debug!(question_id = %id, "question deleted");
        Ok(())
    }

    /// Distinct category labels, sorted.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, QuestionBankError> {
        Ok(self.questions.list_categories().await?)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if the query fails.
    pub async fn count(&self) -> Result<u64, QuestionBankError> {
        Ok(self.questions.count_questions().await?)
    }
}
