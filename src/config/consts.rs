// src/config/consts.rs
use std::time::Duration;

// Net config
pub const API_BASE: &str = "https://boardgamegeek.com/xmlapi2/";
pub const SITE_BASE: &str = "https://boardgamegeek.com";
pub const USER_AGENT: &str = "BoardGame Scout/1.0";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Local files
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const CONFIG_FILE: &str = "scout.toml";
pub const GAMES_DB: &str = "boardgames.db";
pub const GAMES_ZIP: &str = "boardgames_db.zip";
pub const RATINGS_DB: &str = "greek_user_ratings.db";
pub const RANKS_CSV: &str = "boardgames_ranks.csv";
pub const RANKS_ZIP: &str = "boardgames_ranks.zip";
pub const DEBUG_PAGE: &str = "download_page_debug.html";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

// Thing endpoint batching (enrich + hot)
pub const THING_BATCH_SIZE: usize = 20;
pub const THING_MAX_RETRIES: u32 = 5;
pub const THING_RETRY_WAIT: Duration = Duration::from_secs(2); // doubles per retry
pub const BATCH_PAUSE: Duration = Duration::from_secs(2);
pub const PROGRESS_EVERY: usize = 200;

// Guild ratings cycle
pub const GUILD_ID: u32 = 119;
pub const USERS_PER_RUN: usize = 850;
pub const GUILD_PAGE_PAUSE: Duration = Duration::from_secs(3);
pub const MIN_DELAY: f64 = 10.0; // seconds
pub const MAX_DELAY: f64 = 15.0;
pub const RATINGS_PROGRESS_EVERY: usize = 100;

// Collaborative filtering
pub const MIN_OVERLAP: usize = 5; // co-rated games to trust a similarity
pub const NEIGHBOURS: usize = 25; // top-k users whose taste we trust
pub const RECOMMEND_COUNT: usize = 20;
pub const MIN_NEIGHBOUR_VOTES: usize = 3; // neighbours that rated a candidate

// GUI
pub const PAGE_SIZE: usize = 50;
pub const HOT_CACHE_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_MAX_COMPLEXITY: f64 = 5.0;
pub const COMPLEXITY_STEP: f64 = 0.01;

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE: &str = "games";
