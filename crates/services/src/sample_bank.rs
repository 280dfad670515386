//! Built-in questions inserted into an empty store on first launch.

use quiz_core::model::{AnswerSlot, Category, Difficulty, QuestionDraft, QuestionError};

struct SampleQuestion {
    prompt: &'static str,
    options: [&'static str; 4],
    correct: AnswerSlot,
    category: &'static str,
    difficulty: Difficulty,
}

const SAMPLES: &[SampleQuestion] = &[
    // Geography
    SampleQuestion {
        prompt: "What is the capital of Australia?",
        options: ["Sydney", "Melbourne", "Canberra", "Perth"],
        correct: AnswerSlot::C,
        category: "Geography",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which river is the longest in South America?",
        options: ["Paraná", "Amazon", "Orinoco", "Magdalena"],
        correct: AnswerSlot::B,
        category: "Geography",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which country has the most natural lakes?",
        options: ["Canada", "Russia", "Finland", "United States"],
        correct: AnswerSlot::A,
        category: "Geography",
        difficulty: Difficulty::Medium,
    },
    SampleQuestion {
        prompt: "What is the smallest country in Africa by land area?",
        options: ["Gambia", "Eswatini", "Djibouti", "Seychelles"],
        correct: AnswerSlot::D,
        category: "Geography",
        difficulty: Difficulty::Hard,
    },
    // Science
    SampleQuestion {
        prompt: "What is the chemical symbol for gold?",
        options: ["Ag", "Au", "Gd", "Go"],
        correct: AnswerSlot::B,
        category: "Science",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which planet is known as the Red Planet?",
        options: ["Venus", "Jupiter", "Mars", "Mercury"],
        correct: AnswerSlot::C,
        category: "Science",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "What part of the cell contains most of its genetic material?",
        options: ["Nucleus", "Ribosome", "Mitochondrion", "Cell membrane"],
        correct: AnswerSlot::A,
        category: "Science",
        difficulty: Difficulty::Medium,
    },
    SampleQuestion {
        prompt: "What is the approximate speed of light in a vacuum?",
        options: [
            "150,000 km/s",
            "300,000 km/s",
            "450,000 km/s",
            "1,000,000 km/s",
        ],
        correct: AnswerSlot::B,
        category: "Science",
        difficulty: Difficulty::Hard,
    },
    // History
    SampleQuestion {
        prompt: "In which year did World War II end?",
        options: ["1943", "1944", "1945", "1946"],
        correct: AnswerSlot::C,
        category: "History",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Who was the first President of the United States?",
        options: [
            "Thomas Jefferson",
            "John Adams",
            "Benjamin Franklin",
            "George Washington",
        ],
        correct: AnswerSlot::D,
        category: "History",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which empire built Machu Picchu?",
        options: ["Aztec", "Inca", "Maya", "Olmec"],
        correct: AnswerSlot::B,
        category: "History",
        difficulty: Difficulty::Medium,
    },
    SampleQuestion {
        prompt: "In which year was the Magna Carta sealed?",
        options: ["1066", "1215", "1348", "1492"],
        correct: AnswerSlot::B,
        category: "History",
        difficulty: Difficulty::Hard,
    },
    // Art
    SampleQuestion {
        prompt: "Who painted the Mona Lisa?",
        options: [
            "Michelangelo",
            "Raphael",
            "Leonardo da Vinci",
            "Donatello",
        ],
        correct: AnswerSlot::C,
        category: "Art",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which artist cut off part of his own ear?",
        options: [
            "Vincent van Gogh",
            "Claude Monet",
            "Pablo Picasso",
            "Salvador Dalí",
        ],
        correct: AnswerSlot::A,
        category: "Art",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which art movement is Salvador Dalí most associated with?",
        options: ["Cubism", "Impressionism", "Baroque", "Surrealism"],
        correct: AnswerSlot::D,
        category: "Art",
        difficulty: Difficulty::Medium,
    },
    SampleQuestion {
        prompt: "Who painted 'The Garden of Earthly Delights'?",
        options: [
            "Pieter Bruegel the Elder",
            "Hieronymus Bosch",
            "Jan van Eyck",
            "Albrecht Dürer",
        ],
        correct: AnswerSlot::B,
        category: "Art",
        difficulty: Difficulty::Hard,
    },
    // Sports
    SampleQuestion {
        prompt: "How many players does a soccer team have on the field?",
        options: ["9", "10", "11", "12"],
        correct: AnswerSlot::C,
        category: "Sports",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "In which sport would you perform a slam dunk?",
        options: ["Basketball", "Volleyball", "Tennis", "Handball"],
        correct: AnswerSlot::A,
        category: "Sports",
        difficulty: Difficulty::Easy,
    },
    SampleQuestion {
        prompt: "Which country won the first FIFA World Cup in 1930?",
        options: ["Brazil", "Argentina", "Italy", "Uruguay"],
        correct: AnswerSlot::D,
        category: "Sports",
        difficulty: Difficulty::Medium,
    },
    SampleQuestion {
        prompt: "How long is a marathon, in kilometres (rounded)?",
        options: ["40.0", "42.2", "44.5", "39.1"],
        correct: AnswerSlot::B,
        category: "Sports",
        difficulty: Difficulty::Hard,
    },
];

/// Validated drafts for every built-in question.
///
/// # Errors
///
/// Returns `QuestionError` if a built-in entry fails validation.
pub fn sample_drafts() -> Result<Vec<QuestionDraft>, QuestionError> {
    SAMPLES
        .iter()
        .map(|sample| {
            QuestionDraft::new(
                sample.prompt,
                sample.options.map(String::from),
                sample.correct,
                Category::new(sample.category)?,
                sample.difficulty,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn all_samples_validate() {
        let drafts = sample_drafts().unwrap();
        assert_eq!(drafts.len(), SAMPLES.len());

        let prompts: HashSet<&str> = drafts.iter().map(QuestionDraft::prompt).collect();
        assert_eq!(prompts.len(), drafts.len(), "duplicate prompt in sample bank");
    }

    #[test]
    fn every_category_has_each_difficulty() {
        let drafts = sample_drafts().unwrap();
        let categories: BTreeSet<&str> = drafts.iter().map(|d| d.category().as_str()).collect();
        assert_eq!(
            categories.into_iter().collect::<Vec<_>>(),
            vec!["Art", "Geography", "History", "Science", "Sports"]
        );

        for category in ["Art", "Geography", "History", "Science", "Sports"] {
            for difficulty in Difficulty::ALL {
                assert!(
                    drafts
                        .iter()
                        .any(|d| d.category().as_str() == category && d.difficulty() == difficulty),
                    "{category} has no {difficulty} question"
                );
            }
        }
    }
}
