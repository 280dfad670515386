/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub correct: u32,
    pub is_complete: bool,
}

impl SessionProgress {
    /// 1-based position of the question being shown, capped at `total`.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.answered + 1).min(self.total)
    }

    /// Fraction of the quiz reached, counting the current question.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.position() as f32 / self.total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_counts_current_question() {
        let progress = SessionProgress {
            total: 4,
            answered: 1,
            remaining: 3,
            correct: 1,
            is_complete: false,
        };
        assert_eq!(progress.position(), 2);
        assert!((progress.fraction() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn completed_progress_is_full() {
        let progress = SessionProgress {
            total: 2,
            answered: 2,
            remaining: 0,
            correct: 0,
            is_complete: true,
        };
        assert_eq!(progress.position(), 2);
        assert!((progress.fraction() - 1.0).abs() < f32::EPSILON);
    }
}
