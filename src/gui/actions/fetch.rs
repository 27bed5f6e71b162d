// src/gui/actions/fetch.rs
//
// Buttons that start background work. Each checks its inputs on the UI
// thread, clones what the task needs and hands the future to `Tasks`.

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::{
    collection::fetch_collection,
    config::{
        consts::{PAGE_SIZE, RECOMMEND_COUNT},
        options::PageKind,
    },
    data::DataSet,
    db::{GamesDb, RatingsDb},
    error::{Error, Result},
    gui::{app::App, progress::GuiProgress, task::Done},
    hot::fetch_hot_games,
    recommend::{Recommendation, Recommender},
};

pub fn search(app: &mut App, ctx: &egui::Context) {
    let Some(db) = app.games.clone() else {
        app.status("Games database not loaded (see .store/debug.log)");
        return;
    };
    let filters = app.state.options.search.clone();
    let page = app.state.gui.search_page;

    logf!("Search: Begin page={page} filters={filters:?}");
    app.begin("Searching…");
    app.tasks.spawn(ctx, async move {
        Done::Search(db.search(&filters, page, PAGE_SIZE).await)
    });
}

/// Show the hot list, from the cache when it's fresh unless `force`.
pub fn hot(app: &mut App, ctx: &egui::Context, force: bool) {
    if !force {
        if let Some(games) = app.hot_cache.get() {
            let ds = DataSet::from_hot(games);
            logd!("Hot: served {} games from cache", ds.rows.len());
            app.status(format!("Loaded {} hot games (cached)", ds.rows.len()));
            app.views.insert(PageKind::HotGames, ds);
            return;
        }
    }
    let Some(client) = app.client.clone() else {
        app.status("BGG client unavailable (see .store/debug.log)");
        return;
    };

    let mut progress = GuiProgress::new(app.status.clone());
    app.begin("Fetching hot games…");
    app.tasks.spawn(ctx, async move {
        Done::Hot(fetch_hot_games(&client, &mut progress).await)
    });
}

fn username(app: &App) -> Option<String> {
    let name = app.state.gui.username.trim();
    if name.is_empty() {
        app.status("Please enter a username.");
        return None;
    }
    Some(s!(name))
}

pub fn reveal(app: &mut App, ctx: &egui::Context) {
    let Some(username) = username(app) else { return };
    let Some(client) = app.client.clone() else {
        app.status("BGG client unavailable (see .store/debug.log)");
        return;
    };
    let kind = app.state.options.collection;

    app.begin(format!("Loading {} for {username}…", kind.label()));
    app.tasks.spawn(ctx, async move {
        let result = fetch_collection(&client, &username, kind).await;
        Done::Collection { username, kind, result }
    });
}

pub fn recommend(app: &mut App, ctx: &egui::Context) {
    let Some(username) = username(app) else { return };
    let Some(games) = app.games.clone() else {
        app.status("Games database not loaded (see .store/debug.log)");
        return;
    };
    let ratings_path = app.settings.ratings_db.clone();
    let cached = app.recommender.clone();

    app.begin(format!("Finding recommendations for {username}…"));
    app.tasks.spawn(ctx, async move {
        match recommendations(&games, ratings_path, cached, &username).await {
            Ok((rec, recs)) => Done::Recommend { username, recommender: Some(rec), result: Ok(recs) },
            Err(e) => Done::Recommend { username, recommender: None, result: Err(e) },
        }
    });
}

async fn recommendations(
    games: &GamesDb,
    ratings_path: PathBuf,
    cached: Option<Arc<Recommender>>,
    username: &str,
) -> Result<(Arc<Recommender>, Vec<Recommendation>)> {
    if !ratings_path.exists() {
        return Err(Error::MissingDatabase(ratings_path));
    }
    let ratings = RatingsDb::open(&ratings_path).await?;
    let rec = match cached {
        Some(r) => r,
        None => Arc::new(Recommender::load(&ratings).await?),
    };
    let recs = rec.recommend(games, &ratings, username, RECOMMEND_COUNT).await?;
    Ok((rec, recs))
}
