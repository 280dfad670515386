//! Terminal front end for the quiz engine.
mod cli;
mod config;
mod format;
mod play;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use quiz_core::model::QuestionFilter;
use services::{AppServices, Clock};
use tokio::io::{AsyncBufReadExt, BufReader};

use cli::{Cli, Command};
use config::{normalize_sqlite_url, prepare_sqlite_file};
use format::{result_row, statistics_block};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    // Open + migrate SQLite at startup so services only ever see a ready store.
    let db_url = normalize_sqlite_url(&cli.db_url)?;
    prepare_sqlite_file(&db_url)?;
    let command = cli.command();
    // `seed` reports on the bank as found; every other command seeds an empty one.
    let services = if command == Command::Seed {
        AppServices::open_sqlite(&db_url, Clock::default_clock()).await
    } else {
        AppServices::new_sqlite(&db_url, Clock::default_clock()).await
    }
    .with_context(|| format!("failed to open quiz database at {db_url}"))?;
    tracing::debug!(%db_url, "quiz database ready");

    let mut stdout = std::io::stdout().lock();

    match command {
        Command::Play(filter) => {
            let mut controller = services.session_controller();
            if let Some(seed) = cli.seed {
                controller = controller.with_seed(seed);
            }
            let mut input = BufReader::new(tokio::io::stdin()).lines();
            play::play(&mut controller, &filter, &mut input, &mut stdout).await?;
        }
        Command::Stats => {
            let stats = services.stats().statistics().await?;
            writeln!(stdout, "{}", statistics_block(&stats))?;
        }
        Command::Scores { limit } => {
            let scores = services.stats().top_scores(limit).await?;
            if scores.is_empty() {
                writeln!(stdout, "No quizzes completed yet.")?;
            }
            for (rank, stored) in scores.iter().enumerate() {
                writeln!(stdout, "{:>2}. {}", rank + 1, result_row(stored))?;
            }
        }
        Command::History { category } => {
            let history = services.stats().history(category.as_deref()).await?;
            if history.is_empty() {
                writeln!(stdout, "No results recorded.")?;
            }
            for stored in &history {
                writeln!(stdout, "{}", result_row(stored))?;
            }
        }
        Command::Questions(filter) => {
            let filter = QuestionFilter::from_labels(&filter.category, &filter.difficulty)?;
            let questions = services.question_bank().list(&filter).await?;
            for question in &questions {
                writeln!(
                    stdout,
                    "{:>4}  {:<10} {:<6} {}  [{}]",
                    question.id().value(),
                    question.category().as_str(),
                    question.difficulty().as_str(),
                    question.prompt(),
                    question.correct()
                )?;
            }
            writeln!(stdout, "{} question(s) matching {filter}.", questions.len())?;
        }
        Command::Categories => {
            for category in services.question_bank().categories().await? {
                writeln!(stdout, "{category}")?;
            }
        }
        Command::Seed => {
            let bank = services.question_bank();
            let inserted = bank.seed_if_empty().await?;
            if inserted == 0 {
                let count = bank.count().await?;
                writeln!(stdout, "Question bank already holds {count} question(s).")?;
            } else {
                writeln!(stdout, "Inserted {inserted} sample question(s).")?;
            }
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let ids = services.question_bank().import_json(&text).await?;
            writeln!(stdout, "Imported {} question(s).", ids.len())?;
        }
        Command::Export { file } => {
            let json = services.stats().export_json().await?;
            match file {
                Some(path) => {
                    tokio::fs::write(&path, json.as_bytes())
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    writeln!(stdout, "Results exported to {}.", path.display())?;
                }
                None => writeln!(stdout, "{json}")?,
            }
        }
        Command::ClearResults => {
            let removed = services.stats().clear_results().await?;
            writeln!(stdout, "Deleted {removed} result(s).")?;
        }
        Command::ResetAll { yes } => {
            if !yes {
                writeln!(
                    stdout,
                    "This deletes every question and result. Re-run with --yes to confirm."
                )?;
                return Ok(());
            }
            let (questions, results) = services.stats().reset_all().await?;
            writeln!(
                stdout,
                "Deleted {questions} question(s) and {results} result(s). \
                 Sample questions return on next start."
            )?;
        }
    }

    Ok(())
}
