// src/bgg/mod.rs
//
// Parsers for the BGG XML API2 endpoints we call. All pure: `&str` in,
// plain records out. Fetching lives with the callers.

pub mod collection;
pub mod guild;
pub mod hot;
pub mod thing;
pub mod xml;

use serde::{Deserialize, Serialize};

/// One `thing` item with `stats=1`; the shape of a `games` table row.
/// Numbers BGG leaves out (or sends as garbage) are `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub year_published: Option<i64>,
    pub geek_rating: Option<f64>,
    pub avg_rating: Option<f64>,
    pub num_voters: Option<i64>,
    pub complexity: Option<f64>,
    pub min_players: Option<i64>,
    pub max_players: Option<i64>,
    pub min_playtime: Option<i64>,
    pub max_playtime: Option<i64>,
    pub playing_time: Option<i64>,
    pub min_age: Option<i64>,
    pub categories: String,
    pub mechanics: String,
    pub designers: String,
    pub artists: String,
    pub publishers: String,
}

/// A row of someone's collection as the "Your Games" tab shows it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionEntry {
    pub title: String,
    pub year: String,
    pub bgg_rating: Option<f64>,
    pub your_rating: String,
    pub plays: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserRating {
    pub game_id: u32,
    pub game_name: String,
    pub rating: f64,
}
