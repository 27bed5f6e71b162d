// tests/net_client.rs
//
// The API client, fetchers and jobs against a canned HTTP server on
// localhost.

use std::sync::{Arc, Mutex, Once};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use scout::Error;
use scout::bundle::download_to;
use scout::collection::fetch_collection;
use scout::config::options::CollectionKind;
use scout::core::{BggClient, RetryPolicy};
use scout::db::{GamesDb, RatingsDb};
use scout::hot::fetch_hot_games;
use scout::jobs::{AdaptiveDelay, refresh_games};
use scout::progress::Progress;

#[derive(Clone, Debug)]
struct Seen {
    target: String,
    head: String,
}

struct Canned {
    root: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Canned {
    fn api(&self) -> String {
        format!("{}xmlapi2/", self.root)
    }

    fn client(&self) -> BggClient {
        BggClient::with_base(&self.api(), Some("t0ken".into())).unwrap()
    }

    fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

static NO_PROXY: Once = Once::new();

/// Answer every request with `reply(target, n)`, `n` counting requests from 0.
/// Commas in the query come back decoded.
async fn serve<F>(reply: F) -> Canned
where
    F: Fn(&str, usize) -> (u16, String) + Send + Sync + 'static,
{
    // keep a proxy from the environment out of loopback traffic
    NO_PROXY.call_once(|| unsafe { std::env::set_var("NO_PROXY", "127.0.0.1,localhost") });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let log = seen.clone();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let reply = reply.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf).to_string();
                let target = head.split_whitespace().nth(1).unwrap_or("/").replace("%2C", ",");
                let n = {
                    let mut log = log.lock().unwrap();
                    log.push(Seen { target: target.clone(), head });
                    log.len() - 1
                };

                let (status, body) = reply(&target, n);
                let resp = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    Canned { root: format!("http://{addr}/"), seen }
}

#[derive(Default)]
struct Recorder {
    lines: Vec<String>,
    advanced: Vec<usize>,
}

impl Progress for Recorder {
    fn log(&mut self, msg: &str) {
        self.lines.push(msg.to_string());
    }
    fn advance(&mut self, done: usize) {
        self.advanced.push(done);
    }
}

/// Retries without sleeping.
fn quick(attempts: u32) -> RetryPolicy {
    RetryPolicy { attempts, retry_status: true, ..RetryPolicy::once() }
}

/// `id=1,2,3` out of a request target.
fn ids_in(target: &str) -> Vec<u32> {
    target
        .split(['?', '&'])
        .find_map(|kv| kv.strip_prefix("id="))
        .map(|v| v.split(',').filter_map(|id| id.parse().ok()).collect())
        .unwrap_or_default()
}

fn thing_item(id: u32, voters: i64) -> String {
    format!(
        r#"<item type="boardgame" id="{id}">
            <name type="primary" sortindex="1" value="Game {id}"/>
            <minplayers value="2"/>
            <statistics page="1"><ratings>
                <usersrated value="{voters}"/>
                <average value="7.456"/>
                <bayesaverage value="6.999"/>
                <averageweight value="2.3333"/>
            </ratings></statistics>
        </item>"#
    )
}

fn things(ids: &[u32], voters: impl Fn(u32) -> i64) -> String {
    let items: String = ids.iter().map(|&id| thing_item(id, voters(id))).collect();
    format!("<items>{items}</items>")
}

#[tokio::test]
async fn unauthorized_stops_at_once() {
    let srv = serve(|_, _| (401, String::new())).await;
    let err = srv.client().get_xml("thing", &[("id", "1".into())], &RetryPolicy::thing()).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized), "{err:?}");
    assert_eq!(srv.hits(), 1);
}

#[tokio::test]
async fn token_goes_out_as_bearer() {
    let srv = serve(|_, _| (200, "<items/>".into())).await;
    let xml = srv.client().get_xml("hot", &[("type", "boardgame".into())], &RetryPolicy::once()).await.unwrap();
    assert_eq!(xml, "<items/>");

    let seen = srv.seen();
    assert_eq!(seen[0].target, "/xmlapi2/hot?type=boardgame");
    assert!(seen[0].head.to_ascii_lowercase().contains("authorization: bearer t0ken"));
}

#[tokio::test]
async fn queued_until_attempts_run_out() {
    let srv = serve(|_, _| (202, String::new())).await;
    let err = srv.client().get_xml("collection", &[], &quick(3)).await.unwrap_err();
    assert!(matches!(err, Error::StillQueued), "{err:?}");
    assert_eq!(srv.hits(), 3);
}

#[tokio::test]
async fn queued_then_ready() {
    let srv = serve(|_, n| if n < 2 { (202, String::new()) } else { (200, "<items/>".into()) }).await;
    let xml = srv.client().get_xml("collection", &[], &quick(5)).await.unwrap();
    assert_eq!(xml, "<items/>");
    assert_eq!(srv.hits(), 3);
}

#[tokio::test]
async fn server_error_keeps_a_snippet() {
    let body = format!("boom{}", "x".repeat(300));
    let srv = serve(move |_, _| (500, body.clone())).await;
    let err = srv.client().get_xml("thing", &[], &RetryPolicy::once()).await.unwrap_err();
    match &err {
        Error::Http { status, snippet } => {
            assert_eq!(*status, 500);
            assert!(snippet.starts_with("boom"));
            assert_eq!(snippet.chars().count(), 100);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.to_string().starts_with("BGG API error: HTTP 500 boom"));
    assert_eq!(srv.hits(), 1);

    // retried statuses end in exhaustion
    let err = srv.client().get_xml("thing", &[], &quick(2)).await.unwrap_err();
    assert!(matches!(err, Error::RetriesExhausted(ref e) if e == "thing"), "{err:?}");
}

#[tokio::test]
async fn rate_limits_reach_the_hook() {
    let srv = serve(|_, n| if n == 0 { (429, String::new()) } else { (200, "<items/>".into()) }).await;
    let mut delay = AdaptiveDelay::default();
    let before = delay.secs();

    srv.client().get_xml_with("collection", &[], &quick(2), &mut delay).await.unwrap();
    assert_eq!(delay.consecutive_429(), 0);
    assert!(delay.secs() > before, "one 429 grows the pause more than one success shrinks it");
}

#[tokio::test]
async fn empty_collection_names_the_user() {
    let srv = serve(|_, _| (200, "<items totalitems=\"0\"/>".into())).await;
    let err = fetch_collection(&srv.client(), "  alice ", CollectionKind::Wishlist).await.unwrap_err();
    assert!(matches!(err, Error::EmptyCollection { kind: "wishlist", ref username } if username == "alice"));
    assert_eq!(err.to_string(), "No wishlist games found for user 'alice'");

    let target = &srv.seen()[0].target;
    assert!(target.contains("username=alice"));
    assert!(target.contains("wishlist=1"));
}

#[tokio::test]
async fn collection_needs_a_token() {
    let srv = serve(|_, _| (200, "<items/>".into())).await;
    let client = BggClient::with_base(&srv.api(), None).unwrap();
    let err = fetch_collection(&client, "alice", CollectionKind::Owned).await.unwrap_err();
    assert!(matches!(err, Error::MissingToken));
    assert_eq!(srv.hits(), 0);
}

#[tokio::test]
async fn hot_list_skips_a_failed_batch() {
    let hot: Vec<u32> = (101..=125).collect();
    let list: String = hot.iter().map(|id| format!("<item id=\"{id}\" rank=\"1\"/>")).collect();
    let list = format!("<items>{list}</items>");

    let srv = serve(move |target, _| {
        if target.starts_with("/xmlapi2/hot") {
            return (200, list.clone());
        }
        let mut ids = ids_in(target);
        if ids.contains(&101) {
            return (503, "busy".into());
        }
        // BGG answers in id order, not hot order
        ids.reverse();
        (200, things(&ids, |_| 10))
    })
    .await;

    let mut progress = Recorder::default();
    let games = fetch_hot_games(&srv.client(), &mut progress).await.unwrap();

    let ids: Vec<u32> = games.iter().map(|g| g.id).collect();
    assert_eq!(ids, (121..=125).collect::<Vec<_>>());
    assert_eq!(games[0].avg_rating, Some(7.46));
    assert_eq!(games[0].geek_rating, Some(7.0));
    assert_eq!(games[0].complexity, Some(2.33));
    assert_eq!(progress.advanced, [1, 2]);
    assert_eq!(srv.hits(), 3);
}

#[tokio::test]
async fn refresh_inserts_then_updates_changed_voters() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("ranks.csv");
    let db_path = dir.path().join("games.db");

    let srv = serve(|target, _| (200, things(&ids_in(target), |id| id as i64 * 100))).await;
    let client = srv.client();

    std::fs::write(&csv, "id,name,yearpublished,rank,bayesaverage,usersrated\n1,A,2000,3,7,100\n2,B,2001,1,8,200\n3,C,2002,2,7.5,300\n")
        .unwrap();
    let first = refresh_games(&client, &csv, &db_path, true, &mut Recorder::default()).await.unwrap();
    assert_eq!((first.inserted, first.updated), (3, 0));

    let db = GamesDb::open(&db_path, false).await.unwrap();
    let voters = db.voter_counts().await.unwrap();
    assert_eq!(voters[&2], Some(200));
    let (title, rank): (Option<String>, Option<i64>) = sqlx::query_as("SELECT title, rank FROM games WHERE id = 2")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!((title.as_deref(), rank), (Some("Game 2"), Some(1)));

    // game 2 gained voters and moved down; the rest are unchanged
    std::fs::write(&csv, "id,name,yearpublished,rank,bayesaverage,usersrated\n1,A,2000,3,7,100\n2,B,2001,9,8,250\n3,C,2002,2,7.5,300\n")
        .unwrap();
    let before = srv.hits();
    let second = refresh_games(&client, &csv, &db_path, false, &mut Recorder::default()).await.unwrap();
    assert_eq!((second.inserted, second.updated), (0, 1));
    assert_eq!(srv.hits(), before + 1);
    assert_eq!(ids_in(&srv.seen().last().unwrap().target), [2]);

    let (rank,): (Option<i64>,) = sqlx::query_as("SELECT rank FROM games WHERE id = 2")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rank, Some(9));
}

#[tokio::test]
async fn refresh_without_database_or_csv_fails() {
    let dir = tempfile::tempdir().unwrap();
    let srv = serve(|_, _| (200, "<items/>".into())).await;
    let client = srv.client();

    let csv = dir.path().join("ranks.csv");
    let err = refresh_games(&client, &csv, &dir.path().join("games.db"), true, &mut Recorder::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingFile(_)));

    std::fs::write(&csv, "id,rank,usersrated\n1,1,10\n").unwrap();
    let err = refresh_games(&client, &csv, &dir.path().join("none.db"), false, &mut Recorder::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingDatabase(_)));
    assert_eq!(srv.hits(), 0);
}

const GUILD_PAGE: &str = r#"<guild id="119" name="Greek Guild">
    <members count="1" page="1"><member name="alice" date="2020-01-01"/></members>
</guild>"#;

const RATED: &str = r#"<items totalitems="2">
    <item objecttype="thing" objectid="13" subtype="boardgame">
        <name sortindex="1">CATAN</name>
        <stats><rating value="7"/></stats>
    </item>
    <item objecttype="thing" objectid="822" subtype="boardgame">
        <name sortindex="1">Carcassonne</name>
        <stats><rating value="8.5"/></stats>
    </item>
</items>"#;

#[tokio::test]
async fn ratings_cycle_counts_unsaved_users_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    let db = RatingsDb::open(&dir.path().join("ratings.db")).await.unwrap();

    let srv = serve(|target, _| {
        if target.starts_with("/xmlapi2/guild") {
            let body = if target.contains("page=1") { GUILD_PAGE } else { "<guild id=\"119\"><members/></guild>" };
            (200, body.to_string())
        } else {
            (200, RATED.to_string())
        }
    })
    .await;
    let client = srv.client();

    sqlx::query("CREATE TRIGGER refuse_ratings BEFORE INSERT ON ratings BEGIN SELECT RAISE(ABORT, 'read only'); END")
        .execute(db.pool())
        .await
        .unwrap();
    let summary = scout::jobs::ratings::run(&client, &db, 119, 10, &mut Recorder::default()).await.unwrap();
    assert_eq!((summary.successful, summary.failed, summary.no_ratings), (0, 1, 0));
    assert_eq!(summary.stats.total_ratings, 0);
    assert_eq!(db.users_to_update(10).await.unwrap(), ["alice"]);

    sqlx::query("DROP TRIGGER refuse_ratings").execute(db.pool()).await.unwrap();
    let summary = scout::jobs::ratings::run(&client, &db, 119, 10, &mut Recorder::default()).await.unwrap();
    assert_eq!((summary.successful, summary.failed), (1, 0));
    assert_eq!(summary.stats.total_ratings, 2);
    assert_eq!(summary.stats.updated_users, 1);
}

#[tokio::test]
async fn download_streams_to_the_destination() {
    let payload = "PK fake zip bytes ".repeat(500);
    let expected = payload.clone();
    let srv = serve(move |target, _| {
        if target == "/dump.zip" { (200, payload.clone()) } else { (404, String::new()) }
    })
    .await;
    let client = srv.client();
    let dir = tempfile::tempdir().unwrap();

    let dest = dir.path().join("nested").join("ranks.zip");
    let mut progress = Recorder::default();
    let n = download_to(client.http().get(format!("{}dump.zip", srv.root)), &dest, &mut progress).await.unwrap();
    assert_eq!(n, expected.len() as u64);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), expected);
    assert_eq!(progress.advanced.last(), Some(&100));

    let missing = dir.path().join("missing.zip");
    let err = download_to(client.http().get(format!("{}gone.zip", srv.root)), &missing, &mut progress)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http { status: 404, .. }));
    assert!(!missing.exists());
}
