// src/search.rs
//
// Search filters -> SQL. Every active filter adds one AND-ed condition;
// multiselects add one condition per selected value, so all are required.

use sqlx::{QueryBuilder, Sqlite};

use crate::config::consts::DEFAULT_MAX_COMPLEXITY;
use crate::db::GameRow;

#[derive(Clone, Debug, PartialEq)]
pub struct SearchFilters {
    /// Top search box; wins over `title` when non-empty.
    pub query: String,
    pub title: String,
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,
    pub designers: String,
    pub artists: String,
    pub publishers: String,
    pub min_players: Option<i64>,
    pub max_players: Option<i64>,
    pub min_duration: Option<i64>,
    pub max_duration: Option<i64>,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
    pub max_complexity: f64,
    pub min_age: Option<i64>,
    /// 0 = unlimited
    pub max_results: usize,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: s!(),
            title: s!(),
            categories: Vec::new(),
            mechanics: Vec::new(),
            designers: s!(),
            artists: s!(),
            publishers: s!(),
            min_players: None,
            max_players: None,
            min_duration: None,
            max_duration: None,
            min_year: None,
            max_year: None,
            max_complexity: DEFAULT_MAX_COMPLEXITY,
            min_age: None,
            max_results: 0,
        }
    }
}

impl SearchFilters {
    /// The text used for the title match, if any.
    pub fn title_term(&self) -> Option<&str> {
        let q = self.query.trim();
        if !q.is_empty() {
            return Some(q);
        }
        let t = self.title.trim();
        (!t.is_empty()).then_some(t)
    }
}

// Emits " WHERE " before the first condition, " AND " before the rest.
struct Where<'q, 'a> {
    qb: &'q mut QueryBuilder<'a, Sqlite>,
    first: bool,
}

impl<'a> Where<'_, 'a> {
    fn cond(&mut self, sql: &str) -> &mut QueryBuilder<'a, Sqlite> {
        self.qb.push(if self.first { " WHERE " } else { " AND " });
        self.first = false;
        self.qb.push(sql)
    }
}

fn like(s: &str) -> String {
    format!("%{}%", s.trim().to_lowercase())
}

/// Append ` WHERE …` (or nothing) for `f`.
pub fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, f: &SearchFilters) {
    let mut w = Where { qb, first: true };

    if let Some(t) = f.title_term() {
        w.cond("lower(title) LIKE ").push_bind(like(t));
    }
    for c in f.categories.iter().filter(|c| !c.trim().is_empty()) {
        w.cond("lower(categories) LIKE ").push_bind(like(c));
    }
    for m in f.mechanics.iter().filter(|m| !m.trim().is_empty()) {
        w.cond("lower(mechanics) LIKE ").push_bind(like(m));
    }
    for (column, value) in [("designers", &f.designers), ("artists", &f.artists), ("publishers", &f.publishers)] {
        if !value.trim().is_empty() {
            w.cond(&format!("lower({column}) LIKE ")).push_bind(like(value));
        }
    }

    if let Some(v) = f.min_players {
        w.cond("min_players IS NOT NULL AND min_players <= ").push_bind(v);
    }
    if let Some(v) = f.max_players {
        w.cond("max_players IS NOT NULL AND max_players <= ").push_bind(v);
    }
    if let Some(v) = f.min_duration {
        w.cond("min_playtime >= ").push_bind(v);
    }
    if let Some(v) = f.max_duration {
        w.cond("max_playtime <= ").push_bind(v);
    }
    if let Some(v) = f.min_year {
        w.cond("year_published >= ").push_bind(v);
    }
    if let Some(v) = f.max_year {
        w.cond("year_published <= ").push_bind(v);
    }
    if (f.max_complexity - DEFAULT_MAX_COMPLEXITY).abs() > f64::EPSILON {
        w.cond("complexity <= ").push_bind(f.max_complexity);
    }
    if let Some(v) = f.min_age {
        w.cond("min_age >= ").push_bind(v);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPage {
    /// Matches, capped by `max_results`.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub rows: Vec<GameRow>,
}

impl SearchPage {
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1).saturating_mul(self.page_size) < self.total
    }

    /// 1-based number of the first row on this page.
    pub fn first_number(&self) -> usize {
        self.page.saturating_mul(self.page_size).saturating_add(1)
    }

    pub fn page_count(&self) -> usize {
        if self.page_size == 0 { 0 } else { self.total.div_ceil(self.page_size) }
    }
}
