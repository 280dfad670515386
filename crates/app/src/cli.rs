use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quiz_core::model::ALL_LABEL;
use services::DEFAULT_TOP_SCORES;

use crate::config::DEFAULT_DB_URL;

/// trivia quiz with categories, difficulty levels and a persistent score history
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// SQLite database URL or file path
    #[clap(long = "db", env = "QUIZ_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// seed for question selection, for reproducible quizzes
    #[clap(long, global = true)]
    pub seed: Option<u64>,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// play a quiz of up to ten random questions (default)
    Play(FilterArgs),
    /// show totals and the average score
    Stats,
    /// show the best results
    Scores {
        /// number of results to show
        #[clap(short = 'n', long, default_value_t = DEFAULT_TOP_SCORES)]
        limit: u32,
    },
    /// list past results, newest first
    History {
        /// only results recorded for this category label
        #[clap(short = 'c', long)]
        category: Option<String>,
    },
    /// list stored questions
    Questions(FilterArgs),
    /// list question categories
    Categories,
    /// insert the sample questions if the bank is empty
    Seed,
    /// import questions from a JSON file
    Import {
        /// path to a JSON array of questions
        file: PathBuf,
    },
    /// export all results as JSON
    Export {
        /// output file; prints to stdout when omitted
        file: Option<PathBuf>,
    },
    /// delete every stored result
    ClearResults,
    /// delete all questions and results
    ResetAll {
        /// confirm the reset
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct FilterArgs {
    /// category label, or "All"
    #[clap(short = 'c', long, default_value = ALL_LABEL)]
    pub category: String,

    /// Easy, Medium, Hard, or "All"
    #[clap(short = 'd', long, default_value = ALL_LABEL)]
    pub difficulty: String,
}

impl Default for FilterArgs {
    fn default() -> Self {
        Self {
            category: ALL_LABEL.to_owned(),
            difficulty: ALL_LABEL.to_owned(),
        }
    }
}

impl Cli {
    /// The requested command, falling back to an unfiltered quiz.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Play(FilterArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_plays_everything() {
        let cli = Cli::try_parse_from(["quiz", "--db", "sqlite::memory:"]).unwrap();
        assert_eq!(cli.db_url, "sqlite::memory:");
        assert_eq!(cli.command(), Command::Play(FilterArgs::default()));
    }

    #[test]
    fn play_accepts_filters_and_global_flags() {
        let cli = Cli::try_parse_from([
            "quiz", "play", "-c", "Science", "--difficulty", "Hard", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(9));
        assert_eq!(
            cli.command(),
            Command::Play(FilterArgs {
                category: "Science".into(),
                difficulty: "Hard".into(),
            })
        );
    }

    #[test]
    fn scores_limit_defaults_to_leaderboard_size() {
        let cli = Cli::try_parse_from(["quiz", "scores"]).unwrap();
        assert_eq!(cli.command(), Command::Scores { limit: 10 });
    }

    #[test]
    fn maintenance_commands_parse() {
        let cli = Cli::try_parse_from(["quiz", "reset-all", "--yes"]).unwrap();
        assert_eq!(cli.command(), Command::ResetAll { yes: true });

        let cli = Cli::try_parse_from(["quiz", "export"]).unwrap();
        assert_eq!(cli.command(), Command::Export { file: None });

        let cli = Cli::try_parse_from(["quiz", "import", "questions.json"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::Import {
                file: PathBuf::from("questions.json")
            }
        );

        assert!(Cli::try_parse_from(["quiz", "import"]).is_err());
    }
}
