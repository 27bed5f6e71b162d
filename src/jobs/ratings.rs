// src/jobs/ratings.rs
//
// Rotating guild-ratings cycle: each run refreshes the stalest slice of the
// guild, pacing itself to stay under BGG's rate limit.

use std::time::{Duration, Instant};

use crate::bgg::{UserRating, collection, guild};
use crate::config::consts::{GUILD_PAGE_PAUSE, MAX_DELAY, MIN_DELAY, RATINGS_PROGRESS_EVERY};
use crate::core::net::RateLimitHook;
use crate::core::{BggClient, RetryPolicy};
use crate::db::{RatingsDb, RatingsStats};
use crate::error::{Error, Result};
use crate::progress::Progress;

// Give up on the member list after this many unreadable pages in a row.
const MAX_BAD_PAGES: usize = 5;

/// Pause between users: grows 20% per 429 (up to MAX_DELAY), shrinks 2% per
/// success (down to MIN_DELAY).
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveDelay {
    current: f64,
    consecutive_429: u32,
}

impl Default for AdaptiveDelay {
    fn default() -> Self {
        Self { current: MIN_DELAY, consecutive_429: 0 }
    }
}

impl AdaptiveDelay {
    pub fn secs(&self) -> f64 {
        self.current
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.current)
    }

    pub fn consecutive_429(&self) -> u32 {
        self.consecutive_429
    }
}

impl RateLimitHook for AdaptiveDelay {
    fn on_rate_limited(&mut self) -> u32 {
        self.consecutive_429 += 1;
        self.current = (self.current * 1.2).min(MAX_DELAY);
        logw!("Rate limited! Increasing delay to {:.1}s", self.current);
        self.consecutive_429
    }

    fn on_success(&mut self) {
        self.consecutive_429 = 0;
        self.current = (self.current * 0.98).max(MIN_DELAY);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatingsRunSummary {
    pub successful: usize,
    pub no_ratings: usize,
    /// Fetched but not stored; left unstamped for the next run.
    pub failed: usize,
    pub elapsed: Duration,
    pub stats: RatingsStats,
}

/// Every member name of the guild, first-seen order, no duplicates.
pub async fn fetch_guild_members(client: &BggClient, guild_id: u32) -> Result<Vec<String>> {
    let mut members: Vec<String> = Vec::new();
    let mut page = 1u32;
    let mut bad_pages = 0;
    logf!("Fetching guild members...");

    loop {
        let query = [("id", guild_id.to_string()), ("members", s!("1")), ("page", page.to_string())];
        let parsed = match client.get_xml("guild", &query, &RetryPolicy::guild()).await {
            Ok(xml) => guild::parse_members(&xml),
            Err(e) => Err(e),
        };

        let names = match parsed {
            Ok(names) => names,
            Err(e) => {
                logw!("Skipping guild page {page}: {e}");
                bad_pages += 1;
                if bad_pages >= MAX_BAD_PAGES {
                    break;
                }
                page += 1;
                continue;
            }
        };
        bad_pages = 0;

        if names.is_empty() {
            break;
        }
        logd!("Guild page {page}: {} members", names.len());
        members.extend(names);
        page += 1;
        tokio::time::sleep(GUILD_PAGE_PAUSE).await;
    }

    let mut seen = std::collections::HashSet::new();
    members.retain(|m| seen.insert(m.clone()));
    logf!("Found {} unique members", members.len());
    Ok(members)
}

/// A user's positive ratings. Auth and HTTP failures come back empty so the
/// cycle can stamp the user and move on.
pub async fn fetch_user_ratings(client: &BggClient, username: &str, delay: &mut AdaptiveDelay) -> Vec<UserRating> {
    let query = [
        ("username", s!(username)),
        ("rated", s!("1")),
        ("stats", s!("1")),
        ("subtype", s!("boardgame")),
    ];
    let xml = match client
        .get_xml_with("collection", &query, &RetryPolicy::user_ratings(), delay)
        .await
    {
        Ok(xml) => xml,
        Err(Error::Unauthorized) => {
            loge!("Unauthorized while fetching {username}");
            return Vec::new();
        }
        Err(e) => {
            logd!("No ratings for {username}: {e}");
            return Vec::new();
        }
    };

    collection::parse_ratings(&xml).unwrap_or_else(|e| {
        logw!("Unreadable ratings for {username}: {e}");
        Vec::new()
    })
}

fn log_stats(title: &str, s: &RatingsStats) {
    logf!(
        "{title}: total users {}, updated {}, never updated {}, users with ratings {}, total ratings {}",
        s.total_users,
        s.updated_users,
        s.never_updated,
        s.users_with_ratings,
        s.total_ratings
    );
    if let Some(d) = &s.oldest_update {
        logf!("Oldest update: {}", d.get(..10).unwrap_or(d));
    }
    if let Some(d) = &s.newest_update {
        logf!("Newest update: {}", d.get(..10).unwrap_or(d));
    }
}

pub async fn run(
    client: &BggClient,
    db: &RatingsDb,
    guild_id: u32,
    limit: usize,
    progress: &mut dyn Progress,
) -> Result<RatingsRunSummary> {
    client.require_token()?;
    logf!("BGG guild ratings: rotating update of {limit} users per run");

    let members = fetch_guild_members(client, guild_id).await?;
    db.seed_users(&members).await?;
    log_stats("Current database stats", &db.stats().await?);

    let users = db.users_to_update(limit).await?;
    logf!("Will update {} users in this run", users.len());
    progress.begin(users.len());

    let started = Instant::now();
    let mut delay = AdaptiveDelay::default();
    let mut summary = RatingsRunSummary::default();

    for (i, user) in users.iter().enumerate() {
        let n = i + 1;
        logd!("[{n}/{}] Processing: {user} (delay: {:.1}s)", users.len(), delay.secs());

        let ratings = fetch_user_ratings(client, user, &mut delay).await;
        if ratings.is_empty() {
            db.mark_no_ratings(user).await?;
            logf!("[{n}/{}] {user}: no ratings", users.len());
            summary.no_ratings += 1;
        } else if db.save_ratings(user, &ratings).await {
            logf!("[{n}/{}] {user}: {} ratings", users.len(), ratings.len());
            summary.successful += 1;
        } else {
            logw!("[{n}/{}] {user}: {} ratings not saved", users.len(), ratings.len());
            summary.failed += 1;
        }
        progress.advance(n);

        if n < users.len() {
            tokio::time::sleep(delay.duration()).await;
        }

        if n % RATINGS_PROGRESS_EVERY == 0 {
            let (rate, eta) = pace(n, users.len(), started.elapsed());
            progress.log(&format!("Progress: {n}/{} | Rate: {rate:.1}/min | ETA: {eta:.0}min", users.len()));
        }
    }

    summary.elapsed = started.elapsed();
    summary.stats = db.stats().await?;
    logf!(
        "Run complete in {:.1} minutes: {} successful, {} without ratings, {} failed",
        summary.elapsed.as_secs_f64() / 60.0,
        summary.successful,
        summary.no_ratings,
        summary.failed
    );
    log_stats("Updated database stats", &summary.stats);
    progress.finish();
    Ok(summary)
}

/// (users per minute, minutes left) after `done` of `total`.
pub fn pace(done: usize, total: usize, elapsed: Duration) -> (f64, f64) {
    let secs = elapsed.as_secs_f64();
    if done == 0 || secs <= 0.0 {
        return (0.0, 0.0);
    }
    let rate = done as f64 / secs * 60.0;
    let eta = total.saturating_sub(done) as f64 / rate;
    (rate, eta)
}
