// src/db/mod.rs
//
// Both databases are plain SQLite files, opened through a small sqlx pool.

pub mod games;
pub mod ratings;

use std::path::Path;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use games::{GameRow, GamesDb};
pub use ratings::{RatingRow, RatingsDb, RatingsStats};

use crate::error::Result;

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .busy_timeout(Duration::from_secs(30));

    Ok(SqlitePoolOptions::new().max_connections(4).connect_with(opts).await?)
}

/// `games.last_updated` format: UTC, whole seconds, `Z` suffix.
pub fn utc_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Ratings-side timestamps: local ISO-8601 with microseconds, which sorts
/// correctly as text.
pub fn local_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
