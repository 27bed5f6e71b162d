// src/cli.rs
//
// `scout-cli`: headless access to search / hot / collection / recommend,
// plus the scheduled data jobs. Tables go to stdout (or `--out`), logs to
// stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr, eyre};

use crate::{
    bundle,
    collection::fetch_collection,
    config::{
        Settings,
        consts::{DEFAULT_MAX_COMPLEXITY, PAGE_SIZE, RANKS_ZIP, RECOMMEND_COUNT},
        options::{CollectionKind, ExportFormat, ExportOptions},
    },
    core::BggClient,
    data::DataSet,
    db::{GamesDb, RatingsDb, RatingsStats},
    error::Error,
    file,
    hot::fetch_hot_games,
    jobs::{self, Credentials},
    progress::LogProgress,
    recommend::Recommender,
    search::SearchFilters,
};

#[derive(Parser, Debug)]
#[command(
    name = "scout-cli",
    version,
    about = "BoardGameGeek search, hot list, collections, recommendations and data jobs"
)]
pub struct Cli {
    /// Settings file (default: ./scout.toml when present)
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Table format
    #[arg(long, global = true, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Write a header row
    #[arg(long, global = true)]
    pub include_headers: bool,

    /// Write tables to this file instead of stdout. For download-ranks: the CSV destination.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the local games database
    Search {
        #[command(flatten)]
        filters: FilterArgs,
        /// 1-based result page
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = PAGE_SIZE)]
        page_size: usize,
    },
    /// BGG's current hot list with full details
    Hot,
    /// One list of a user's collection
    Collection {
        user: String,
        /// own | rated | wishlist
        #[arg(long, value_parser = parse_list, default_value = "own")]
        list: CollectionKind,
    },
    /// Games the user's closest guild neighbours loved
    Recommend {
        user: String,
        #[arg(short, default_value_t = RECOMMEND_COUNT)]
        n: usize,
    },
    /// Incremental games DB update from the ranks CSV
    RefreshGames {
        #[arg(long, value_name = "CSV")]
        csv: Option<PathBuf>,
        /// Create the games DB if it doesn't exist
        #[arg(long)]
        create: bool,
    },
    /// Log in to BGG and download the latest ranks dump
    DownloadRanks,
    /// Rotating guild ratings fetch
    FetchRatings {
        #[arg(long)]
        guild: Option<u32>,
        /// Users to refresh this run
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Ratings DB statistics
    Stats,
    /// Download a published release artifact (zips are extracted)
    FetchRelease {
        /// Defaults to `games_release_url` from the settings
        url: Option<String>,
        /// Default to `ratings_release_url` instead
        #[arg(long, conflicts_with = "url")]
        ratings: bool,
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Unpack the bundled games DB if it's missing
    ExtractDb,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Title contains
    #[arg(long, short)]
    pub query: Option<String>,
    /// Required category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
    /// Required mechanic (repeatable)
    #[arg(long = "mechanic", value_name = "NAME")]
    pub mechanics: Vec<String>,
    #[arg(long)]
    pub designer: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub publisher: Option<String>,
    #[arg(long)]
    pub min_players: Option<i64>,
    #[arg(long)]
    pub max_players: Option<i64>,
    /// Minutes
    #[arg(long)]
    pub min_duration: Option<i64>,
    /// Minutes
    #[arg(long)]
    pub max_duration: Option<i64>,
    #[arg(long)]
    pub min_year: Option<i64>,
    #[arg(long)]
    pub max_year: Option<i64>,
    #[arg(long, default_value_t = DEFAULT_MAX_COMPLEXITY)]
    pub max_complexity: f64,
    #[arg(long)]
    pub min_age: Option<i64>,
    /// 0 = unlimited
    #[arg(long, default_value_t = 0)]
    pub max_results: usize,
}

impl From<FilterArgs> for SearchFilters {
    fn from(a: FilterArgs) -> Self {
        SearchFilters {
            query: a.query.unwrap_or_default(),
            categories: a.categories,
            mechanics: a.mechanics,
            designers: a.designer.unwrap_or_default(),
            artists: a.artist.unwrap_or_default(),
            publishers: a.publisher.unwrap_or_default(),
            min_players: a.min_players,
            max_players: a.max_players,
            min_duration: a.min_duration,
            max_duration: a.max_duration,
            min_year: a.min_year,
            max_year: a.max_year,
            max_complexity: a.max_complexity,
            min_age: a.min_age,
            max_results: a.max_results,
            ..SearchFilters::default()
        }
    }
}

fn parse_list(s: &str) -> std::result::Result<CollectionKind, String> {
    CollectionKind::from_flag(s).ok_or_else(|| format!("unknown list '{s}' (own, rated, wishlist)"))
}

impl Cli {
    fn export_options(&self) -> ExportOptions {
        let mut export = ExportOptions::default();
        export.format = match self.format {
            Format::Csv => ExportFormat::Csv,
            Format::Tsv => ExportFormat::Tsv,
        };
        export.include_headers = self.include_headers;
        if let Some(out) = &self.out {
            export.set_path(&out.to_string_lossy());
        }
        export
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from(cli.config.as_deref()).wrap_err("Could not load settings")?;

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(dispatch(cli, settings))
}

async fn dispatch(cli: Cli, settings: Settings) -> Result<()> {
    let export = cli.export_options();
    let out = cli.out.clone();
    let client = BggClient::new(settings.bgg_token.clone())?;
    let mut progress = LogProgress::default();

    match cli.command {
        Command::Search { filters, page, page_size } => {
            let db = open_games(&settings).await?;
            let res = db.search(&filters.into(), page.saturating_sub(1), page_size).await?;
            if res.rows.is_empty() {
                logf!("No games match these filters ({} total)", res.total);
            } else {
                let first = res.first_number();
                logf!("Results: {}–{} from {}", first, first + res.rows.len() - 1, res.total);
            }
            emit(&export, out.is_some(), &DataSet::from_search(&res))
        }

        Command::Hot => {
            let games = fetch_hot_games(&client, &mut progress).await?;
            emit(&export, out.is_some(), &DataSet::from_hot(&games))
        }

        Command::Collection { user, list } => {
            let entries = fetch_collection(&client, &user, list).await?;
            emit(&export, out.is_some(), &DataSet::from_collection(&entries, 1))
        }

        Command::Recommend { user, n } => {
            let games = open_games(&settings).await?;
            let ratings = open_ratings(&settings).await?;
            let recommender = Recommender::load(&ratings).await?;
            let recs = recommender.recommend(&games, &ratings, &user, n).await?;
            if recs.is_empty() {
                logw!("No recommendations for '{}'", user.trim());
                return Ok(());
            }
            emit(&export, out.is_some(), &DataSet::from_recommendations(&recs))
        }

        Command::RefreshGames { csv, create } => {
            let csv = csv.unwrap_or_else(|| settings.ranks_csv.clone());
            let summary = jobs::refresh_games(&client, &csv, &settings.games_db, create, &mut progress).await?;
            println!("Inserted: {}  Updated: {}", summary.inserted, summary.updated);
            Ok(())
        }

        Command::DownloadRanks => {
            let creds = credentials(&settings)?;
            let csv = out.unwrap_or_else(|| settings.ranks_csv.clone());
            let zip = file::sibling(&csv, RANKS_ZIP);
            let path = jobs::download_ranks(&client, &creds, &zip, &csv, &mut progress).await?;
            println!("{}", path.display());
            Ok(())
        }

        Command::FetchRatings { guild, limit } => {
            let db = RatingsDb::open(&settings.ratings_db).await?;
            let guild = guild.unwrap_or(settings.guild_id);
            let limit = limit.unwrap_or(settings.users_per_run);
            let summary = jobs::ratings::run(&client, &db, guild, limit, &mut progress).await?;
            println!(
                "Updated {} users ({} without ratings, {} not saved) in {:.1} min",
                summary.successful + summary.no_ratings,
                summary.no_ratings,
                summary.failed,
                summary.elapsed.as_secs_f64() / 60.0
            );
            print_stats(&summary.stats);
            Ok(())
        }

        Command::Stats => {
            let db = open_ratings(&settings).await?;
            print_stats(&db.stats().await?);
            Ok(())
        }

        Command::FetchRelease { url, ratings, dest } => {
            let configured = if ratings { &settings.ratings_release_url } else { &settings.games_release_url };
            let url = url
                .or_else(|| configured.clone())
                .ok_or_else(|| eyre!("No URL given and no release URL configured"))?;
            let dest = match dest {
                Some(d) => d,
                None => PathBuf::from(
                    bundle::file_name_from_url(&url).ok_or_else(|| eyre!("Can't name a file after {url}"))?,
                ),
            };
            let path = bundle::fetch_release_asset(client.http(), &url, &dest, &mut progress).await?;
            println!("{}", path.display());
            Ok(())
        }

        Command::ExtractDb => {
            if bundle::ensure_games_db(&settings.games_db, &settings.games_zip)? {
                println!("Extracted {}", settings.games_db.display());
            } else {
                println!("{} already present", settings.games_db.display());
            }
            Ok(())
        }
    }
}

async fn open_games(settings: &Settings) -> Result<GamesDb> {
    bundle::ensure_games_db(&settings.games_db, &settings.games_zip)?;
    Ok(GamesDb::open(&settings.games_db, false).await?)
}

async fn open_ratings(settings: &Settings) -> Result<RatingsDb> {
    if !settings.ratings_db.exists() {
        return Err(Error::MissingDatabase(settings.ratings_db.clone()).into());
    }
    Ok(RatingsDb::open(&settings.ratings_db).await?)
}

/// Print to stdout, or write the export file when `--out` was given.
fn emit(export: &ExportOptions, to_file: bool, data: &DataSet) -> Result<()> {
    if to_file {
        let path = file::write_export(export, data)?;
        logf!("Wrote {} rows to {}", data.rows.len(), path.display());
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(file::export_text(export, data).as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_stats(s: &RatingsStats) {
    println!("Total users:        {}", s.total_users);
    println!("Updated users:      {}", s.updated_users);
    println!("Never updated:      {}", s.never_updated);
    println!("Users with ratings: {}", s.users_with_ratings);
    println!("Total ratings:      {}", s.total_ratings);
    if let Some(d) = &s.oldest_update {
        println!("Oldest update:      {d}");
    }
    if let Some(d) = &s.newest_update {
        println!("Newest update:      {d}");
    }
}

/// Settings/env first; prompt on the terminal for whatever is missing.
fn credentials(settings: &Settings) -> Result<Credentials> {
    let username = match settings.bgg_username.clone().filter(|s| !s.is_empty()) {
        Some(u) => u,
        None => prompt("BGG username")?,
    };
    let password = match settings.bgg_password.clone().filter(|s| !s.is_empty()) {
        Some(p) => p,
        None => prompt("BGG password")?,
    };
    if username.is_empty() || password.is_empty() {
        return Err(eyre!("BGG_USERNAME and BGG_PASSWORD are required for download-ranks"));
    }
    Ok(Credentials { username, password })
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(s!(line.trim()))
}
