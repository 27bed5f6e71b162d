// src/data.rs
//
// String tables: what the GUI grid shows and what Copy/Export write.

use crate::bgg::{CollectionEntry, GameRecord};
use crate::db::GameRow;
use crate::recommend::Recommendation;
use crate::search::SearchPage;

pub const GAME_HEADERS: [&str; 16] = [
    "Title",
    "Geek Rating",
    "Average Rating",
    "Number of Voters",
    "Year",
    "Complexity",
    "Min Players",
    "Max Players",
    "Min Time",
    "Max Time",
    "Min Age",
    "Type / Category",
    "Designers",
    "Artists",
    "Publishers",
    "Mechanics",
];

pub const COLLECTION_HEADERS: [&str; 5] = ["Title", "Year", "BGG Rating", "Your Rating", "Plays"];

pub const RECOMMEND_HEADERS: [&str; 4] = ["Title", "Predicted Rating", "Guild Avg Rating", "Reason"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prefix a 1-based "No." column starting at `first`.
    fn numbered(headers: &[&str], rows: Vec<Vec<String>>, first: usize) -> Self {
        let headers = std::iter::once("No.").chain(headers.iter().copied()).map(String::from).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| std::iter::once((first + i).to_string()).chain(r).collect())
            .collect();
        Self { headers, rows }
    }

    /// One search page; numbering continues across pages.
    pub fn from_search(page: &SearchPage) -> Self {
        let rows = page.rows.iter().map(search_row).collect();
        Self::numbered(&GAME_HEADERS, rows, page.first_number())
    }

    pub fn from_hot(games: &[GameRecord]) -> Self {
        let rows = games.iter().map(hot_row).collect();
        Self::numbered(&GAME_HEADERS, rows, 1)
    }

    /// `entries` is the visible slice, the first being number `first`.
    pub fn from_collection(entries: &[CollectionEntry], first: usize) -> Self {
        let rows = entries
            .iter()
            .map(|e| {
                vec![
                    e.title.clone(),
                    e.year.clone(),
                    e.bgg_rating.map(|r| format!("{r:.2}")).unwrap_or_default(),
                    e.your_rating.clone(),
                    e.plays.clone(),
                ]
            })
            .collect();
        Self::numbered(&COLLECTION_HEADERS, rows, first)
    }

    pub fn from_recommendations(recs: &[Recommendation]) -> Self {
        let rows = recs
            .iter()
            .map(|r| {
                vec![
                    r.title.clone().unwrap_or_else(|| format!("#{}", r.game_id)),
                    format!("{:.1}", r.predicted),
                    r.avg_guild.map(|a| format!("{a:.2}")).unwrap_or_default(),
                    r.reason.clone(),
                ]
            })
            .collect();
        Self::numbered(&RECOMMEND_HEADERS, rows, 1)
    }
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(T::to_string).unwrap_or_default()
}

fn fixed2(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_default()
}

fn text(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn search_row(g: &GameRow) -> Vec<String> {
    vec![
        text(&g.title),
        opt(&g.geek_rating),
        opt(&g.avg_rating),
        opt(&g.num_voters),
        opt(&g.year_published),
        opt(&g.complexity),
        opt(&g.min_players),
        opt(&g.max_players),
        opt(&g.min_playtime),
        opt(&g.max_playtime),
        opt(&g.min_age),
        text(&g.categories),
        text(&g.designers),
        text(&g.artists),
        text(&g.publishers),
        text(&g.mechanics),
    ]
}

fn hot_row(g: &GameRecord) -> Vec<String> {
    vec![
        text(&g.title),
        fixed2(g.geek_rating),
        fixed2(g.avg_rating),
        opt(&g.num_voters),
        opt(&g.year_published),
        fixed2(g.complexity),
        opt(&g.min_players),
        opt(&g.max_players),
        opt(&g.min_playtime),
        opt(&g.max_playtime),
        opt(&g.min_age),
        g.categories.clone(),
        g.designers.clone(),
        g.artists.clone(),
        g.publishers.clone(),
        g.mechanics.clone(),
    ]
}
