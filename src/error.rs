// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "BGG API token is missing. Register an app at \
         https://boardgamegeek.com/manage/applications, create a token, \
         then set BGG_TOKEN (env, .env or scout.toml)"
    )]
    MissingToken,

    #[error("Unauthorized (401): the BGG API token is invalid or expired")]
    Unauthorized,

    #[error("BGG collection is still processing. Try again in a moment.")]
    StillQueued,

    #[error("Request timed out after multiple attempts.")]
    Timeout,

    #[error("BGG API error: HTTP {status} {snippet}")]
    Http { status: u16, snippet: String },

    #[error("Exceeded max retries for {0}")]
    RetriesExhausted(String),

    #[error("No {kind} games found for user '{username}'")]
    EmptyCollection { kind: &'static str, username: String },

    #[error("Database not found: {0} (and no bundled archive to extract)")]
    MissingDatabase(PathBuf),

    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error("Login failed - {0}")]
    LoginFailed(String),

    #[error("Could not find download link. Saved page to {0}")]
    LinkNotFound(PathBuf),

    #[error("Missing column '{0}' in ranks CSV")]
    MissingColumn(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
