use std::path::{Path, PathBuf};

use thiserror::Error;

/// Database used when neither `--db` nor `QUIZ_DB_URL` is given.
pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid database url: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("failed to prepare database file: {0}")]
    Io(#[from] std::io::Error),
}

fn is_in_memory(url: &str) -> bool {
    url == MEMORY_URL || url.contains("mode=memory")
}

/// Turn a path or `sqlite:` URL into an absolute `sqlite://` URL.
///
/// In-memory URLs are returned unchanged. Query parameters are preserved.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDbUrl` for a blank value.
pub fn normalize_sqlite_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidDbUrl { raw: raw.to_owned() });
    }
    if is_in_memory(trimmed) {
        return Ok(trimmed.to_owned());
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return Err(ConfigError::InvalidDbUrl { raw: raw.to_owned() });
    }

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    Ok(match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    })
}

/// Create the database file and its parent directory if missing.
///
/// Expects a URL produced by `normalize_sqlite_url`.
///
/// # Errors
///
/// Returns `ConfigError` if the URL has no file path or the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigError> {
    if is_in_memory(db_url) {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ConfigError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::InvalidDbUrl {
            raw: db_url.to_owned(),
        });
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        tracing::info!(path = %path.display(), "created database file");
    }

    Ok(())
}
