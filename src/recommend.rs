// src/recommend.rs
//
// User-based collaborative filtering over the guild ratings.
//
// Ratings are mean-centred per user, users are compared by cosine similarity
// of their centred vectors, and a game's predicted score is the
// similarity-weighted mean of what the nearest neighbours gave it.

use std::collections::{HashMap, HashSet};

use crate::bgg::xml::round2;
use crate::config::consts::{MIN_NEIGHBOUR_VOTES, MIN_OVERLAP, NEIGHBOURS};
use crate::db::{GamesDb, RatingRow, RatingsDb};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct Neighbour {
    pub username: String,
    pub similarity: f64,
    pub overlap: usize,
}

/// Every user's neighbours, most similar first.
#[derive(Clone, Debug, Default)]
pub struct SimilarityIndex {
    neighbours: HashMap<String, Vec<Neighbour>>,
}

impl SimilarityIndex {
    pub fn build(ratings: &[RatingRow]) -> Self {
        // Dense ids for users and games.
        let mut user_ix: HashMap<&str, usize> = HashMap::new();
        let mut users: Vec<&str> = Vec::new();
        let mut game_ix: HashMap<i64, usize> = HashMap::new();
        let mut by_user: Vec<Vec<(usize, f64)>> = Vec::new();

        for r in ratings {
            let u = *user_ix.entry(r.username.as_str()).or_insert_with(|| {
                users.push(r.username.as_str());
                by_user.push(Vec::new());
                users.len() - 1
            });
            let next = game_ix.len();
            let g = *game_ix.entry(r.game_id).or_insert(next);
            by_user[u].push((g, r.rating));
        }

        // Centre on each user's mean, then take the norm over all their items.
        let mut norms = vec![0.0f64; users.len()];
        for (u, items) in by_user.iter_mut().enumerate() {
            let mean = items.iter().map(|(_, r)| r).sum::<f64>() / items.len().max(1) as f64;
            for (_, r) in items.iter_mut() {
                *r -= mean;
            }
            norms[u] = items.iter().map(|(_, c)| c * c).sum::<f64>().sqrt();
        }

        // game -> raters, for walking co-rated pairs
        let mut by_game: Vec<Vec<(usize, f64)>> = vec![Vec::new(); game_ix.len()];
        for (u, items) in by_user.iter().enumerate() {
            for &(g, c) in items {
                by_game[g].push((u, c));
            }
        }

        let mut neighbours = HashMap::with_capacity(users.len());
        let mut dot = vec![0.0f64; users.len()];
        let mut overlap = vec![0usize; users.len()];

        for (u, items) in by_user.iter().enumerate() {
            dot.iter_mut().for_each(|d| *d = 0.0);
            overlap.iter_mut().for_each(|o| *o = 0);

            for &(g, cu) in items {
                for &(v, cv) in &by_game[g] {
                    dot[v] += cu * cv;
                    overlap[v] += 1;
                }
            }

            let mut list: Vec<Neighbour> = (0..users.len())
                .filter(|&v| v != u && overlap[v] >= MIN_OVERLAP)
                .map(|v| {
                    let denom = norms[u] * norms[v];
                    Neighbour {
                        username: users[v].to_string(),
                        similarity: if denom > 0.0 { dot[v] / denom } else { 0.0 },
                        overlap: overlap[v],
                    }
                })
                .collect();

            list.sort_by(|a, b| {
                b.similarity
                    .total_cmp(&a.similarity)
                    .then_with(|| a.username.cmp(&b.username))
            });
            neighbours.insert(users[u].to_string(), list);
        }

        Self { neighbours }
    }

    pub fn neighbours(&self, username: &str) -> &[Neighbour] {
        self.neighbours.get(username).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn user_count(&self) -> usize {
        self.neighbours.len()
    }
}

/// A prediction before titles and guild averages are attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Scored {
    pub game_id: u32,
    pub predicted: f64,
    pub votes: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub game_id: u32,
    pub title: Option<String>,
    pub predicted: f64,
    pub avg_guild: Option<f64>,
    pub reason: String,
}

/// Top `n` unseen games for `user`, plus the neighbours that drove them.
pub fn score(index: &SimilarityIndex, ratings: &[RatingRow], user: &str, n: usize) -> (Vec<Scored>, Vec<Neighbour>) {
    // Dissimilar neighbours stay in and pull the weighted mean the other way.
    let neighbours: Vec<Neighbour> = index.neighbours(user).iter().take(NEIGHBOURS).cloned().collect();
    if neighbours.is_empty() {
        return (Vec::new(), neighbours);
    }

    let sims: HashMap<&str, f64> = neighbours.iter().map(|nb| (nb.username.as_str(), nb.similarity)).collect();
    let seen: HashSet<i64> = ratings.iter().filter(|r| r.username == user).map(|r| r.game_id).collect();

    // game -> (Σ rating·sim, Σ sim, count)
    let mut acc: HashMap<i64, (f64, f64, usize)> = HashMap::new();
    for r in ratings {
        let Some(&sim) = sims.get(r.username.as_str()) else { continue };
        if seen.contains(&r.game_id) {
            continue;
        }
        let e = acc.entry(r.game_id).or_insert((0.0, 0.0, 0));
        e.0 += r.rating * sim;
        e.1 += sim;
        e.2 += 1;
    }

    // A non-positive Σ sim has no meaningful mean.
    let mut scored: Vec<Scored> = acc
        .into_iter()
        .filter(|(_, (_, sim_sum, count))| *count >= MIN_NEIGHBOUR_VOTES && *sim_sum > 0.0)
        .map(|(id, (w_sum, sim_sum, count))| Scored {
            game_id: id as u32,
            predicted: w_sum / sim_sum,
            votes: count,
        })
        .collect();

    scored.sort_by(|a, b| b.predicted.total_cmp(&a.predicted).then_with(|| a.game_id.cmp(&b.game_id)));
    scored.truncate(n);
    (scored, neighbours)
}

/// Attach titles, guild averages and the "why" line.
pub fn finish(
    scored: Vec<Scored>,
    neighbours: &[Neighbour],
    titles: &HashMap<u32, String>,
    averages: &HashMap<u32, f64>,
) -> Vec<Recommendation> {
    let reason = reason_line(scored.len(), neighbours);
    scored
        .into_iter()
        .map(|s| Recommendation {
            game_id: s.game_id,
            title: titles.get(&s.game_id).cloned(),
            predicted: s.predicted,
            avg_guild: averages.get(&s.game_id).copied().map(round2),
            reason: reason.clone(),
        })
        .collect()
}

fn reason_line(count: usize, neighbours: &[Neighbour]) -> String {
    let top: Vec<&str> = neighbours.iter().take(3).map(|n| n.username.as_str()).collect();
    format!(
        "Loved by {count} guild members most similar to you (top neighbours: {})",
        top.join(", ")
    )
}

/// Ratings snapshot plus its similarity index; build once, query per user.
pub struct Recommender {
    ratings: Vec<RatingRow>,
    index: SimilarityIndex,
}

impl Recommender {
    pub async fn load(ratings_db: &RatingsDb) -> Result<Self> {
        let ratings = ratings_db.all_ratings().await?;
        logf!("Building similarity index over {} ratings", ratings.len());
        let index = SimilarityIndex::build(&ratings);
        logd!("Similarity index covers {} users", index.user_count());
        Ok(Self { ratings, index })
    }

    pub async fn recommend(
        &self,
        games_db: &GamesDb,
        ratings_db: &RatingsDb,
        user: &str,
        n: usize,
    ) -> Result<Vec<Recommendation>> {
        let (scored, neighbours) = score(&self.index, &self.ratings, user.trim(), n);
        if scored.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<u32> = scored.iter().map(|s| s.game_id).collect();
        let titles = games_db.titles(&ids).await?;
        let averages = ratings_db.game_averages().await?;
        Ok(finish(scored, &neighbours, &titles, &averages))
    }
}
