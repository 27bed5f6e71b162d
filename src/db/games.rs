// src/db/games.rs
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::connect;
use crate::bgg::GameRecord;
use crate::error::{Error, Result};
use crate::search::{SearchFilters, SearchPage, push_where};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY,
    rank INTEGER,
    title TEXT,
    description TEXT,
    thumbnail TEXT,
    image TEXT,
    geek_rating REAL,
    avg_rating REAL,
    num_voters INTEGER,
    year_published INTEGER,
    complexity REAL,
    min_players INTEGER,
    max_players INTEGER,
    min_playtime INTEGER,
    max_playtime INTEGER,
    playing_time INTEGER,
    min_age INTEGER,
    categories TEXT,
    designers TEXT,
    artists TEXT,
    publishers TEXT,
    mechanics TEXT,
    last_updated TEXT
)
"#;

/// Columns the search table shows, in display order after the title.
pub const ROW_COLUMNS: &str = "id, title, geek_rating, avg_rating, num_voters, year_published, \
     complexity, min_players, max_players, min_playtime, max_playtime, min_age, \
     categories, designers, artists, publishers, mechanics";

#[derive(Clone, Debug, Default, PartialEq, FromRow)]
pub struct GameRow {
    pub id: i64,
    pub title: Option<String>,
    pub geek_rating: Option<f64>,
    pub avg_rating: Option<f64>,
    pub num_voters: Option<i64>,
    pub year_published: Option<i64>,
    pub complexity: Option<f64>,
    pub min_players: Option<i64>,
    pub max_players: Option<i64>,
    pub min_playtime: Option<i64>,
    pub max_playtime: Option<i64>,
    pub min_age: Option<i64>,
    pub categories: Option<String>,
    pub designers: Option<String>,
    pub artists: Option<String>,
    pub publishers: Option<String>,
    pub mechanics: Option<String>,
}

#[derive(Clone)]
pub struct GamesDb {
    pool: SqlitePool,
}

impl GamesDb {
    /// Open `path`. Unless `create` is set, the file has to exist already.
    pub async fn open(path: &Path, create: bool) -> Result<Self> {
        if !create && !path.exists() {
            return Err(Error::MissingDatabase(path.to_path_buf()));
        }
        let pool = connect(path, create).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// `id -> num_voters` for every stored game.
    pub async fn voter_counts(&self) -> Result<HashMap<u32, Option<i64>>> {
        let rows: Vec<(i64, Option<i64>)> = sqlx::query_as("SELECT id, num_voters FROM games")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, n)| (id as u32, n)).collect())
    }

    pub async fn insert_game(&self, rank: Option<i64>, g: &GameRecord, now: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO games (
                id, rank, title, description, thumbnail, image,
                geek_rating, avg_rating, num_voters, year_published,
                complexity, min_players, max_players, min_playtime,
                max_playtime, playing_time, min_age, categories,
                designers, artists, publishers, mechanics, last_updated
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(g.id as i64)
        .bind(rank)
        .bind(&g.title)
        .bind(&g.description)
        .bind(&g.thumbnail)
        .bind(&g.image)
        .bind(g.geek_rating)
        .bind(g.avg_rating)
        .bind(g.num_voters)
        .bind(g.year_published)
        .bind(g.complexity)
        .bind(g.min_players)
        .bind(g.max_players)
        .bind(g.min_playtime)
        .bind(g.max_playtime)
        .bind(g.playing_time)
        .bind(g.min_age)
        .bind(&g.categories)
        .bind(&g.designers)
        .bind(&g.artists)
        .bind(&g.publishers)
        .bind(&g.mechanics)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_game(&self, rank: Option<i64>, g: &GameRecord, now: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE games SET
                rank = ?, title = ?, description = ?, thumbnail = ?, image = ?,
                geek_rating = ?, avg_rating = ?, num_voters = ?, year_published = ?,
                complexity = ?, min_players = ?, max_players = ?, min_playtime = ?,
                max_playtime = ?, playing_time = ?, min_age = ?, categories = ?,
                designers = ?, artists = ?, publishers = ?, mechanics = ?,
                last_updated = ?
            WHERE id = ?
            "#,
        )
        .bind(rank)
        .bind(&g.title)
        .bind(&g.description)
        .bind(&g.thumbnail)
        .bind(&g.image)
        .bind(g.geek_rating)
        .bind(g.avg_rating)
        .bind(g.num_voters)
        .bind(g.year_published)
        .bind(g.complexity)
        .bind(g.min_players)
        .bind(g.max_players)
        .bind(g.min_playtime)
        .bind(g.max_playtime)
        .bind(g.playing_time)
        .bind(g.min_age)
        .bind(&g.categories)
        .bind(&g.designers)
        .bind(&g.artists)
        .bind(&g.publishers)
        .bind(&g.mechanics)
        .bind(now)
        .bind(g.id as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn distinct_mechanics(&self) -> Result<Vec<String>> {
        self.distinct_list("mechanics").await
    }

    pub async fn distinct_categories(&self) -> Result<Vec<String>> {
        self.distinct_list("categories").await
    }

    // Comma-joined columns, split back out, trimmed, deduped and sorted.
    async fn distinct_list(&self, column: &'static str) -> Result<Vec<String>> {
        let sql = format!("SELECT {column} FROM games WHERE {column} IS NOT NULL AND {column} != ''");
        let values: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let set: BTreeSet<String> = values
            .iter()
            .flat_map(|(v,)| v.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(set.into_iter().collect())
    }

    pub async fn count(&self, filters: &SearchFilters) -> Result<i64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM games");
        push_where(&mut qb, filters);
        let (n,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(n)
    }

    /// One page of matches, best geek rating first (unrated last).
    pub async fn search(&self, filters: &SearchFilters, page: usize, page_size: usize) -> Result<SearchPage> {
        let count = self.count(filters).await?.max(0) as usize;
        let total = if filters.max_results > 0 { count.min(filters.max_results) } else { count };

        let mut out = SearchPage { total, page, page_size, rows: Vec::new() };
        // An offset past usize is past the end too.
        let Some(offset) = page.checked_mul(page_size).filter(|&o| o < total) else {
            return Ok(out);
        };
        let limit = page_size.min(total - offset);

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {ROW_COLUMNS} FROM games"));
        push_where(&mut qb, filters);
        qb.push(" ORDER BY (geek_rating IS NULL), geek_rating DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        out.rows = qb.build_query_as::<GameRow>().fetch_all(&self.pool).await?;
        Ok(out)
    }

    pub async fn titles(&self, ids: &[u32]) -> Result<HashMap<u32, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT id, title FROM games WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id as i64);
        }
        qb.push(")");

        let rows: Vec<(i64, Option<String>)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, t)| t.map(|t| (id as u32, t)))
            .collect())
    }
}
