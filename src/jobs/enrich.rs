// src/jobs/enrich.rs
//
// Incremental games DB refresh from the ranks dump: fetch details for ids we
// don't have, and re-fetch ids whose voter count moved.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::consts::{BATCH_PAUSE, PROGRESS_EVERY, THING_BATCH_SIZE};
use crate::core::{BggClient, RetryPolicy};
use crate::csv::{column, parse_rows};
use crate::db::{GamesDb, utc_stamp};
use crate::error::{Error, Result};
use crate::hot::fetch_things;
use crate::progress::Progress;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankRow {
    pub id: u32,
    pub rank: Option<i64>,
    pub users_rated: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnrichSummary {
    pub inserted: usize,
    pub updated: usize,
    pub duration: Duration,
}

pub fn read_ranks_csv(path: &Path) -> Result<Vec<RankRow>> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    parse_ranks(&std::fs::read_to_string(path)?)
}

/// Rows of the ranks dump; columns are found by header name.
pub fn parse_ranks(text: &str) -> Result<Vec<RankRow>> {
    let mut rows = parse_rows(text, ',').into_iter();
    let Some(headers) = rows.next() else { return Ok(Vec::new()) };

    let id_col = column(&headers, "id").ok_or(Error::MissingColumn("id"))?;
    let rank_col = column(&headers, "rank").ok_or(Error::MissingColumn("rank"))?;
    let voters_col = column(&headers, "usersrated").ok_or(Error::MissingColumn("usersrated"))?;

    let mut out = Vec::new();
    for row in rows {
        let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or_default();
        let (Ok(id), Ok(users_rated)) = (cell(id_col).parse::<u32>(), cell(voters_col).parse::<i64>()) else {
            logw!("Skipping ranks row with id '{}'", cell(id_col));
            continue;
        };
        out.push(RankRow { id, rank: cell(rank_col).parse().ok(), users_rated });
    }
    Ok(out)
}

/// Split into (not in DB yet, voter count changed). Order follows the CSV.
pub fn plan<'a>(rows: &'a [RankRow], db_voters: &HashMap<u32, Option<i64>>) -> (Vec<&'a RankRow>, Vec<&'a RankRow>) {
    let mut new = Vec::new();
    let mut changed = Vec::new();
    for r in rows {
        match db_voters.get(&r.id) {
            None => new.push(r),
            Some(n) if *n != Some(r.users_rated) => changed.push(r),
            Some(_) => {}
        }
    }
    (new, changed)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Insert,
    Update,
}

pub async fn refresh_games(
    client: &BggClient,
    csv: &Path,
    db_path: &Path,
    create: bool,
    progress: &mut dyn Progress,
) -> Result<EnrichSummary> {
    let started = Instant::now();
    logf!("Starting incremental BoardGame DB update");

    let rows = read_ranks_csv(csv)?;
    let db = GamesDb::open(db_path, create).await?;
    let voters = db.voter_counts().await?;
    let (new, changed) = plan(&rows, &voters);

    logf!("New games to insert: {}", new.len());
    logf!("Games to update (voters changed): {}", changed.len());

    let inserted = run_batches(client, &db, &new, Mode::Insert, progress).await?;
    let updated = run_batches(client, &db, &changed, Mode::Update, progress).await?;

    let summary = EnrichSummary { inserted, updated, duration: started.elapsed() };
    logf!(
        "Update complete! Inserted games: {}, updated games: {}, took {:.2}s ({:.2} min)",
        summary.inserted,
        summary.updated,
        summary.duration.as_secs_f64(),
        summary.duration.as_secs_f64() / 60.0
    );
    Ok(summary)
}

async fn run_batches(
    client: &BggClient,
    db: &GamesDb,
    rows: &[&RankRow],
    mode: Mode,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let by_id: HashMap<u32, &RankRow> = rows.iter().map(|r| (r.id, *r)).collect();
    let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
    let batches = ids.len().div_ceil(THING_BATCH_SIZE);
    let every = (PROGRESS_EVERY / THING_BATCH_SIZE).max(1);
    let label = if mode == Mode::Insert { "new-game" } else { "update" };

    progress.begin(ids.len());
    let mut stored = 0;

    for (b, batch) in ids.chunks(THING_BATCH_SIZE).enumerate() {
        let games = match fetch_things(client, batch, &RetryPolicy::thing()).await {
            Ok(g) => g,
            Err(e) => {
                logw!("Skipping {label} batch {:?} due to error: {e}", &batch[..batch.len().min(3)]);
                continue;
            }
        };

        let now = utc_stamp();
        for g in &games {
            let rank = by_id.get(&g.id).and_then(|r| r.rank);
            match mode {
                Mode::Insert => db.insert_game(rank, g, &now).await?,
                Mode::Update => db.update_game(rank, g, &now).await?,
            }
            stored += 1;
        }

        let done = ((b + 1) * THING_BATCH_SIZE).min(ids.len());
        progress.advance(done);
        if (b + 1) % every == 0 || (mode == Mode::Update && b + 1 == batches) {
            let verb = if mode == Mode::Insert { "Inserted" } else { "Processed" };
            progress.log(&format!("{verb} {done}/{} {label}s...", ids.len()));
        }
        tokio::time::sleep(BATCH_PAUSE).await;
    }

    progress.finish();
    Ok(stored)
}
