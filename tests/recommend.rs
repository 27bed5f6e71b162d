// tests/recommend.rs
//
// User-based CF: neighbourhoods, scoring rules and the DB-backed path.

use std::collections::HashMap;

use scout::bgg::{GameRecord, UserRating};
use scout::db::{GamesDb, RatingRow, RatingsDb};
use scout::recommend::{Recommender, SimilarityIndex, finish, score};

const BASE: [(i64, f64); 6] = [(1, 9.0), (2, 8.0), (3, 7.0), (4, 3.0), (5, 2.0), (6, 1.0)];

fn rows(user: &str, items: &[(i64, f64)]) -> Vec<RatingRow> {
    items
        .iter()
        .map(|&(game_id, rating)| RatingRow { username: user.to_string(), game_id, rating })
        .collect()
}

fn guild() -> Vec<RatingRow> {
    let mut all = rows("me", &BASE);

    for name in ["n1", "n2"] {
        all.extend(rows(name, &BASE));
        all.extend(rows(name, &[(10, 9.0), (11, 8.0), (13, 5.0), (14, 9.0)]));
    }
    all.extend(rows("n3", &[(1, 8.0), (2, 8.0), (3, 6.0), (4, 3.0), (5, 3.0), (6, 1.0)]));
    all.extend(rows("n3", &[(10, 6.0), (13, 5.0)]));

    // opposite taste
    all.extend(rows("anti", &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 7.0), (5, 8.0), (6, 9.0)]));
    all.extend(rows("anti", &[(12, 10.0), (14, 1.0)]));

    // too little in common with anyone
    all.extend(rows("stranger", &[(1, 5.0), (99, 7.0)]));
    all
}

#[test]
fn neighbours_need_overlap_and_are_sorted() {
    let ratings = guild();
    let index = SimilarityIndex::build(&ratings);
    assert_eq!(index.user_count(), 6);

    let mine = index.neighbours("me");
    let names: Vec<&str> = mine.iter().map(|n| n.username.as_str()).collect();
    assert_eq!(names.len(), 4);
    assert!(!names.contains(&"stranger"));
    assert!(!names.contains(&"me"));
    assert_eq!(*names.last().unwrap(), "anti");
    assert!(mine.windows(2).all(|w| w[0].similarity >= w[1].similarity));

    let n1 = mine.iter().find(|n| n.username == "n1").unwrap();
    assert_eq!(n1.overlap, 6);
    assert!(n1.similarity > 0.0 && n1.similarity <= 1.0 + 1e-9);
    let anti = mine.iter().find(|n| n.username == "anti").unwrap();
    assert!(anti.similarity < 0.0);

    // symmetric
    assert!(index.neighbours("n1").iter().any(|n| n.username == "me"));
    assert!(index.neighbours("stranger").is_empty());
    assert!(index.neighbours("nobody").is_empty());
}

#[test]
fn scores_unseen_games_with_enough_votes() {
    let ratings = guild();
    let index = SimilarityIndex::build(&ratings);

    let (scored, neighbours) = score(&index, &ratings, "me", 20);
    let ids: Vec<u32> = scored.iter().map(|s| s.game_id).collect();
    // 11 has two votes, 12 only one
    assert_eq!(ids, vec![14, 10, 13]);
    assert_eq!(neighbours.len(), 4);
    assert!(neighbours.iter().any(|n| n.username == "anti" && n.similarity < 0.0));

    let ten = &scored[1];
    assert_eq!(ten.votes, 3);
    assert!(ten.predicted > 6.0 && ten.predicted < 9.0);
    assert!((scored[2].predicted - 5.0).abs() < 1e-9);

    let (top, _) = score(&index, &ratings, "me", 1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].game_id, 14);
}

#[test]
fn dissimilar_neighbour_counts_and_weighs_against() {
    let ratings = guild();
    let index = SimilarityIndex::build(&ratings);
    let (scored, _) = score(&index, &ratings, "me", 20);

    // n1 and n2 gave 14 a 9, "anti" gave it a 1
    let fourteen = scored.iter().find(|s| s.game_id == 14).unwrap();
    assert_eq!(fourteen.votes, 3);
    assert!(fourteen.predicted > 9.0, "a low rating from opposite taste lifts the prediction");

    // without "anti" the same game falls below the vote threshold
    let without: Vec<RatingRow> = ratings.iter().filter(|r| r.username != "anti").cloned().collect();
    let index = SimilarityIndex::build(&without);
    let (scored, _) = score(&index, &without, "me", 20);
    assert!(scored.iter().all(|s| s.game_id != 14));
}

#[test]
fn users_without_neighbours_get_nothing() {
    let ratings = guild();
    let index = SimilarityIndex::build(&ratings);
    assert!(score(&index, &ratings, "stranger", 20).0.is_empty());
    assert!(score(&index, &ratings, "unknown", 20).0.is_empty());
}

#[test]
fn finish_attaches_titles_averages_and_reason() {
    let ratings = guild();
    let index = SimilarityIndex::build(&ratings);
    let (scored, neighbours) = score(&index, &ratings, "me", 20);

    let titles = HashMap::from([(10u32, "Ten".to_string())]);
    let averages = HashMap::from([(10u32, 7.456), (13u32, 5.0)]);
    let recs = finish(scored, &neighbours, &titles, &averages);

    assert_eq!(recs.len(), 3);
    assert_eq!(recs[1].title.as_deref(), Some("Ten"));
    assert_eq!(recs[1].avg_guild, Some(7.46));
    assert_eq!(recs[0].title, None);
    assert_eq!(recs[0].avg_guild, None);
    assert!(recs[0].reason.starts_with("Loved by 3 guild members most similar to you"));
    assert!(recs[0].reason.contains("n1"));
    assert!(recs[0].reason.contains("n3"));
    assert!(!recs[0].reason.contains("anti"));
}

#[test]
fn reason_counts_recommendations_not_neighbours() {
    let ratings = guild();
    let index = SimilarityIndex::build(&ratings);
    let (scored, neighbours) = score(&index, &ratings, "me", 1);
    assert_eq!(neighbours.len(), 4);

    let recs = finish(scored, &neighbours, &HashMap::new(), &HashMap::new());
    assert_eq!(recs.len(), 1);
    assert!(recs[0].reason.starts_with("Loved by 1 guild members"));
}

#[tokio::test]
async fn recommender_reads_both_databases() {
    let dir = tempfile::tempdir().unwrap();
    let ratings_db = RatingsDb::open(&dir.path().join("ratings.db")).await.unwrap();
    let games_db = GamesDb::open(&dir.path().join("games.db"), true).await.unwrap();

    let mut by_user: HashMap<String, Vec<UserRating>> = HashMap::new();
    for r in guild() {
        by_user.entry(r.username.clone()).or_default().push(UserRating {
            game_id: r.game_id as u32,
            game_name: format!("Game {}", r.game_id),
            rating: r.rating,
        });
    }
    for (user, list) in &by_user {
        assert!(ratings_db.save_ratings(user, list).await);
    }
    let ten = GameRecord { id: 10, title: Some("Spirit Island".into()), ..GameRecord::default() };
    games_db.insert_game(Some(1), &ten, "2024-01-01T00:00:00Z").await.unwrap();

    let rec = Recommender::load(&ratings_db).await.unwrap();
    let recs = rec.recommend(&games_db, &ratings_db, "  me ", 20).await.unwrap();

    assert_eq!(recs.len(), 3);
    assert_eq!(recs[1].game_id, 10);
    assert_eq!(recs[1].title.as_deref(), Some("Spirit Island"));
    assert_eq!(recs[1].avg_guild, Some(8.0));

    assert!(rec.recommend(&games_db, &ratings_db, "stranger", 20).await.unwrap().is_empty());
}
