// src/db/ratings.rs
//
// Guild ratings store. `users_tracking` drives the rotating update: users
// never fetched (NULL date) come first, then the stalest.

use std::collections::HashMap;
use std::path::Path;

use sqlx::{FromRow, SqlitePool};

use super::{connect, local_stamp};
use crate::bgg::UserRating;
use crate::error::Result;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS ratings (
        username TEXT,
        game_id INTEGER,
        game_name TEXT,
        rating REAL,
        date_updated TIMESTAMP,
        PRIMARY KEY (username, game_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_date_updated ON ratings(username, date_updated)",
    r#"
    CREATE TABLE IF NOT EXISTS users_tracking (
        username TEXT PRIMARY KEY,
        date_updated TIMESTAMP,
        ratings_count INTEGER DEFAULT 0
    )
    "#,
];

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct RatingRow {
    pub username: String,
    pub game_id: i64,
    pub rating: f64,
}

#[derive(Clone, Debug, Default, PartialEq, FromRow)]
pub struct RatingsStats {
    pub total_users: i64,
    pub updated_users: i64,
    pub never_updated: i64,
    pub users_with_ratings: i64,
    pub total_ratings: i64,
    pub oldest_update: Option<String>,
    pub newest_update: Option<String>,
}

#[derive(Clone)]
pub struct RatingsDb {
    pool: SqlitePool,
}

impl RatingsDb {
    /// Creates the file and schema when missing.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = connect(path, true).await?;
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Register users we haven't seen, leaving known ones untouched.
    pub async fn seed_users(&self, names: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for name in names {
            sqlx::query(
                "INSERT OR IGNORE INTO users_tracking (username, date_updated, ratings_count) VALUES (?, NULL, 0)",
            )
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        logf!("Database initialized with {} users", names.len());
        Ok(())
    }

    pub async fn users_to_update(&self, limit: usize) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT username
            FROM users_tracking
            ORDER BY
                CASE WHEN date_updated IS NULL THEN 0 ELSE 1 END,
                date_updated ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(u,)| u).collect())
    }

    /// Replace a user's ratings and stamp them. A failed write is rolled
    /// back and logged; the cycle carries on with the next user.
    pub async fn save_ratings(&self, username: &str, ratings: &[UserRating]) -> bool {
        match self.try_save_ratings(username, ratings).await {
            Ok(()) => true,
            Err(e) => {
                loge!("DB error saving ratings for {username}: {e}");
                false
            }
        }
    }

    async fn try_save_ratings(&self, username: &str, ratings: &[UserRating]) -> Result<()> {
        let now = local_stamp();
        // dropped without commit = rollback
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ratings WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await?;

        for r in ratings {
            sqlx::query(
                "INSERT OR REPLACE INTO ratings (username, game_id, game_name, rating, date_updated) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(username)
            .bind(r.game_id as i64)
            .bind(&r.game_name)
            .bind(r.rating)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO users_tracking (username, date_updated, ratings_count) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(&now)
        .bind(ratings.len() as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Stamp a user as fetched even though they rated nothing.
    pub async fn mark_no_ratings(&self, username: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO users_tracking (username, date_updated, ratings_count) VALUES (?, ?, 0)",
        )
        .bind(username)
        .bind(local_stamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<RatingsStats> {
        let s = sqlx::query_as::<_, RatingsStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users_tracking) AS total_users,
                (SELECT COUNT(*) FROM users_tracking WHERE date_updated IS NOT NULL) AS updated_users,
                (SELECT COUNT(*) FROM users_tracking WHERE date_updated IS NULL) AS never_updated,
                (SELECT COUNT(DISTINCT username) FROM ratings) AS users_with_ratings,
                (SELECT COUNT(*) FROM ratings) AS total_ratings,
                (SELECT MIN(date_updated) FROM users_tracking WHERE date_updated IS NOT NULL) AS oldest_update,
                (SELECT MAX(date_updated) FROM users_tracking WHERE date_updated IS NOT NULL) AS newest_update
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(s)
    }

    pub async fn all_ratings(&self) -> Result<Vec<RatingRow>> {
        Ok(sqlx::query_as("SELECT username, game_id, rating FROM ratings")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn user_ratings(&self, username: &str) -> Result<Vec<(u32, f64)>> {
        let rows: Vec<(i64, f64)> = sqlx::query_as("SELECT game_id, rating FROM ratings WHERE username = ?")
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, r)| (id as u32, r)).collect())
    }

    /// Mean guild rating per game.
    pub async fn game_averages(&self) -> Result<HashMap<u32, f64>> {
        let rows: Vec<(i64, f64)> = sqlx::query_as("SELECT game_id, AVG(rating) FROM ratings GROUP BY game_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, avg)| (id as u32, avg)).collect())
    }
}
