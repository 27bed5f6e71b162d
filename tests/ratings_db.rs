// tests/ratings_db.rs
//
// Ratings DB: user seeding, rotation order, saving and stats.

use scout::bgg::UserRating;
use scout::db::RatingsDb;

fn rating(game_id: u32, rating: f64) -> UserRating {
    UserRating { game_id, game_name: format!("Game {game_id}"), rating }
}

async fn open(dir: &tempfile::TempDir) -> RatingsDb {
    RatingsDb::open(&dir.path().join("ratings.db")).await.unwrap()
}

#[tokio::test]
async fn seeding_is_idempotent_and_never_updated_users_come_first() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;

    db.seed_users(&["alice".into(), "bob".into(), "carol".into()]).await.unwrap();
    assert!(db.save_ratings("alice", &[rating(1, 8.0)]).await);
    db.mark_no_ratings("bob").await.unwrap();

    // re-seeding keeps alice's and bob's stamps
    db.seed_users(&["alice".into(), "bob".into(), "carol".into(), "dave".into()]).await.unwrap();

    let order = db.users_to_update(10).await.unwrap();
    assert_eq!(order.len(), 4);
    let (never, stamped) = order.split_at(2);
    let mut never = never.to_vec();
    never.sort();
    assert_eq!(never, vec!["carol", "dave"]);
    // alice was stamped before bob
    assert_eq!(stamped, ["alice", "bob"]);

    assert_eq!(db.users_to_update(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn save_replaces_a_users_previous_ratings() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;

    assert!(db.save_ratings("alice", &[rating(1, 8.0), rating(2, 6.5)]).await);
    assert!(db.save_ratings("alice", &[rating(2, 7.0), rating(3, 9.0)]).await);

    let mut mine = db.user_ratings("alice").await.unwrap();
    mine.sort_by_key(|(id, _)| *id);
    assert_eq!(mine, vec![(2, 7.0), (3, 9.0)]);
}

#[tokio::test]
async fn stats_and_averages() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;

    let empty = db.stats().await.unwrap();
    assert_eq!(empty.total_users, 0);
    assert!(empty.oldest_update.is_none());

    db.seed_users(&["alice".into(), "bob".into(), "carol".into()]).await.unwrap();
    db.save_ratings("alice", &[rating(1, 8.0), rating(2, 6.0)]).await;
    db.save_ratings("bob", &[rating(1, 6.0)]).await;

    let s = db.stats().await.unwrap();
    assert_eq!(s.total_users, 3);
    assert_eq!(s.updated_users, 2);
    assert_eq!(s.never_updated, 1);
    assert_eq!(s.users_with_ratings, 2);
    assert_eq!(s.total_ratings, 3);
    assert!(s.oldest_update.is_some());
    assert!(s.oldest_update <= s.newest_update);

    let avg = db.game_averages().await.unwrap();
    assert_eq!(avg[&1], 7.0);
    assert_eq!(avg[&2], 6.0);

    let all = db.all_ratings().await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|r| r.username == "bob" && r.game_id == 1 && r.rating == 6.0));
}
