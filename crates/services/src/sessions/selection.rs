use quiz_core::model::Question;
use rand::Rng;
use rand::seq::SliceRandom;

/// Randomly pick up to `limit` questions without replacement.
pub(crate) fn sample_questions<R: Rng + ?Sized>(
    mut pool: Vec<Question>,
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    pool.shuffle(rng);
    pool.truncate(limit);
    pool
}
