// tests/bundle_zip.rs
//
// Bundled archive handling and the in-memory hot cache.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use scout::Error;
use scout::bgg::GameRecord;
use scout::bundle::{ensure_games_db, extract_all, extract_file, file_name_from_url};
use scout::config::consts::HOT_CACHE_TTL;
use scout::hot::HotCache;

fn make_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, body) in entries {
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(*name, opts).unwrap();
        zip.write_all(body).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn extracts_the_db_only_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("boardgames.db");
    let zip = dir.path().join("boardgames_db.zip");

    match ensure_games_db(&db, &zip) {
        Err(Error::MissingDatabase(p)) => assert_eq!(p, db),
        other => panic!("expected MissingDatabase, got {other:?}"),
    }

    make_zip(&zip, &[("README.txt", b"hello"), ("bundle/boardgames.db", b"SQLite format 3\0")]);
    assert!(ensure_games_db(&db, &zip).unwrap());
    assert_eq!(fs::read(&db).unwrap(), b"SQLite format 3\0");
    assert!(!dir.path().join("boardgames.db.part").exists());

    // present now: left alone
    fs::write(&db, b"changed").unwrap();
    assert!(!ensure_games_db(&db, &zip).unwrap());
    assert_eq!(fs::read(&db).unwrap(), b"changed");
}

#[test]
fn extract_file_and_extract_all() {
    let dir = tempfile::tempdir().unwrap();
    let zip = dir.path().join("ranks.zip");
    make_zip(&zip, &[("boardgames_ranks.csv", b"id,rank\n1,1\n"), ("notes/x.txt", b"x")]);

    let csv = dir.path().join("out/ranks.csv");
    extract_file(&zip, |n| n.ends_with(".csv"), &csv).unwrap();
    assert_eq!(fs::read_to_string(&csv).unwrap(), "id,rank\n1,1\n");

    assert!(matches!(
        extract_file(&zip, |n| n.ends_with(".db"), &dir.path().join("none.db")),
        Err(Error::MissingFile(_))
    ));

    let all = dir.path().join("all");
    extract_all(&zip, &all).unwrap();
    assert!(all.join("boardgames_ranks.csv").is_file());
    assert_eq!(fs::read_to_string(all.join("notes/x.txt")).unwrap(), "x");
}

#[test]
fn url_file_names() {
    assert_eq!(file_name_from_url("https://h/r/download/v1/boardgames_db.zip?x=1"), Some("boardgames_db.zip"));
    assert_eq!(file_name_from_url("https://h/r/ratings.db#frag"), Some("ratings.db"));
    assert_eq!(file_name_from_url("https://h/r/"), None);
}

#[test]
fn hot_cache_expires() {
    let mut cache = HotCache::default();
    let t0 = Instant::now();
    assert!(cache.get_at(t0).is_none());
    assert!(cache.age().is_none());

    let game = GameRecord { id: 1, title: Some("Ark Nova".into()), ..GameRecord::default() };
    cache.put_at(t0, vec![game]);
    assert_eq!(cache.get_at(t0 + Duration::from_secs(5)).map(|g| g.len()), Some(1));
    assert!(cache.get_at(t0 + HOT_CACHE_TTL).is_none());
    assert!(cache.age().is_some());
}
