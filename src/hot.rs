// src/hot.rs
use std::time::{Duration, Instant};

use crate::bgg::xml::round2;
use crate::bgg::{GameRecord, hot, thing};
use crate::config::consts::{HOT_CACHE_TTL, THING_BATCH_SIZE};
use crate::core::{BggClient, RetryPolicy};
use crate::error::Result;
use crate::progress::Progress;

/// Trending games with full details, in BGG's hotness order.
pub async fn fetch_hot_games(client: &BggClient, progress: &mut dyn Progress) -> Result<Vec<GameRecord>> {
    let list = client
        .get_xml("hot", &[("type", s!("boardgame"))], &RetryPolicy::once())
        .await?;
    let ids = hot::parse_ids(&list)?;
    let batches: Vec<&[u32]> = ids.chunks(THING_BATCH_SIZE).collect();
    progress.begin(batches.len());

    let mut games = Vec::with_capacity(ids.len());
    for (i, batch) in batches.iter().enumerate() {
        progress.log(&format!("Fetching details {}/{}", i + 1, batches.len()));
        match fetch_things(client, batch, &RetryPolicy::once()).await {
            Ok(mut found) => {
                // thing returns items in id order; keep the hot ranking instead
                found.sort_by_key(|g| batch.iter().position(|id| *id == g.id));
                games.extend(found);
            }
            Err(e) => logw!("Failed to fetch details for batch {}: {e}", i + 1),
        }
        progress.advance(i + 1);
    }

    for g in &mut games {
        tidy(g);
    }
    progress.finish();
    logf!("Loaded {} hot games", games.len());
    Ok(games)
}

fn tidy(g: &mut GameRecord) {
    g.geek_rating = g.geek_rating.map(round2);
    g.avg_rating = g.avg_rating.map(round2);
    g.complexity = g.complexity.map(round2);
    if g.title.as_deref().is_none_or(str::is_empty) {
        g.title = Some(s!("N/A"));
    }
}

/// `thing?id=a,b,c&stats=1` for one batch.
pub async fn fetch_things(client: &BggClient, ids: &[u32], policy: &RetryPolicy) -> Result<Vec<GameRecord>> {
    let joined = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
    let xml = client
        .get_xml("thing", &[("id", joined), ("stats", s!("1"))], policy)
        .await?;
    thing::parse_items(&xml)
}

/// Hot list kept in memory for `HOT_CACHE_TTL`.
#[derive(Default)]
pub struct HotCache {
    entry: Option<(Instant, Vec<GameRecord>)>,
}

impl HotCache {
    pub fn get(&self) -> Option<&[GameRecord]> {
        self.get_at(Instant::now())
    }

    pub fn get_at(&self, now: Instant) -> Option<&[GameRecord]> {
        match &self.entry {
            Some((at, games)) if now.saturating_duration_since(*at) < HOT_CACHE_TTL => Some(games),
            _ => None,
        }
    }

    pub fn put(&mut self, games: Vec<GameRecord>) {
        self.put_at(Instant::now(), games);
    }

    pub fn put_at(&mut self, at: Instant, games: Vec<GameRecord>) {
        self.entry = Some((at, games));
    }

    pub fn age(&self) -> Option<Duration> {
        self.entry.as_ref().map(|(at, _)| at.elapsed())
    }
}
