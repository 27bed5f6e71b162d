// src/gui/app.rs
use std::{
    collections::HashMap,
    error::Error,
    sync::{Arc, Mutex},
};

use eframe::egui;

use crate::{
    bgg::CollectionEntry,
    bundle,
    config::{
        Settings,
        consts::PAGE_SIZE,
        options::PageKind::{self, *},
        state::AppState,
    },
    core::BggClient,
    data::DataSet,
    db::GamesDb,
    hot::HotCache,
    recommend::Recommender,
    search::SearchPage,
};

use super::{
    components,
    pages::Page,
    router,
    task::{Done, Tasks},
};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load()?;
    let app = App::new(AppState::default(), settings)?;
    eframe::run_native(
        "BoardGame Scout",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}

pub struct App {
    // UI thread only
    pub state: AppState,
    pub settings: Settings,

    // backends (None when startup couldn't open them; the status says why)
    pub client: Option<BggClient>,
    pub games: Option<GamesDb>,
    pub recommender: Option<Arc<Recommender>>,
    pub hot_cache: HotCache,

    // Search filter choices, read once from the games DB
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,

    pub search_result: Option<SearchPage>,
    // whole list; the table shows one page of it
    pub collection: Vec<CollectionEntry>,
    pub showing_collection: bool,

    // what each tab's table shows right now
    pub views: HashMap<PageKind, DataSet>,

    // output text field UX (we map this <-> ExportOptions)
    pub out_path_text: String,
    pub out_path_dirty: bool,

    // status/progress (workers write here)
    pub status: Arc<Mutex<String>>,
    pub running: bool,
    pub tasks: Tasks,
}

impl App {
    pub fn new(mut state: AppState, settings: Settings) -> crate::Result<Self> {
        let tasks = Tasks::new()?;
        let mut status = s!("Ready");

        let client = match BggClient::new(settings.bgg_token.clone()) {
            Ok(c) => Some(c),
            Err(e) => {
                loge!("Init: HTTP client failed: {e}");
                status = format!("Error: {e}");
                None
            }
        };
        if !settings.bgg_token.as_deref().is_some_and(|t| !t.is_empty()) {
            logw!("Init: no BGG token; Hot Games and Your Games will fail");
        }

        let games = match tasks.block_on(open_games(&settings)) {
            Ok(db) => Some(db),
            Err(e) => {
                loge!("Init: games database unavailable: {e}");
                status = format!("Games database unavailable: {e}");
                None
            }
        };

        let (categories, mechanics) = match &games {
            Some(db) => tasks.block_on(async {
                let cats = db.distinct_categories().await.unwrap_or_else(|e| {
                    logw!("Init: categories unavailable: {e}");
                    Vec::new()
                });
                let mechs = db.distinct_mechanics().await.unwrap_or_else(|e| {
                    logw!("Init: mechanics unavailable: {e}");
                    Vec::new()
                });
                (cats, mechs)
            }),
            None => (Vec::new(), Vec::new()),
        };

        logf!(
            "Init: categories={}, mechanics={}, default page={:?}",
            categories.len(),
            mechanics.len(),
            Search
        );

        state.options.export.set_default_stem_for(Search);
        let out_path_text = state.options.export.out_path().to_string_lossy().into();

        Ok(Self {
            state,
            settings,
            client,
            games,
            recommender: None,
            hot_cache: HotCache::default(),
            categories,
            mechanics,
            search_result: None,
            collection: Vec::new(),
            showing_collection: false,
            views: HashMap::new(),
            out_path_text,
            out_path_dirty: false,
            status: Arc::new(Mutex::new(status)),
            running: false,
            tasks,
        })
    }

    /* ---------- tiny helpers ---------- */

    #[inline]
    pub fn current_index(&self) -> usize { self.state.gui.current_page_index }

    #[inline]
    pub fn set_current_index(&mut self, idx: usize) { self.state.gui.current_page_index = idx; }

    #[inline]
    pub fn current_page_kind(&self) -> PageKind { self.current_page().kind() }

    #[inline]
    pub fn current_page(&self) -> &'static dyn Page {
        let pages = router::all_pages();
        pages[self.current_index().min(pages.len() - 1)]
    }

    #[inline]
    pub fn current_view(&self) -> Option<&DataSet> { self.views.get(&self.current_page_kind()) }

    pub fn status<T: Into<String>>(&self, msg: T) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }

    pub fn status_text(&self) -> String {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Mark a background task as started.
    pub fn begin<T: Into<String>>(&mut self, msg: T) {
        self.running = true;
        self.status(msg);
    }

    /// Put the current slice of `collection` into the Your Games table.
    pub fn show_collection_page(&mut self) {
        let start = (self.state.gui.collection_page * PAGE_SIZE).min(self.collection.len());
        let end = (start + PAGE_SIZE).min(self.collection.len());
        self.views
            .insert(YourGames, DataSet::from_collection(&self.collection[start..end], start + 1));
        self.showing_collection = true;
    }

    pub fn collection_has_next(&self) -> bool {
        (self.state.gui.collection_page + 1) * PAGE_SIZE < self.collection.len()
    }

    fn fail(&self, what: &str, e: crate::Error) {
        loge!("{what}: Error: {e}");
        self.status(format!("Error: {e}"));
    }

    /// Apply finished background work.
    fn poll(&mut self) {
        while let Some(done) = self.tasks.try_recv() {
            self.running = false;
            match done {
                Done::Search(Ok(page)) => {
                    let msg = if page.total == 0 {
                        s!("No games match these filters.")
                    } else if page.rows.is_empty() {
                        format!("No results on page {} ({} matches)", page.page + 1, page.total)
                    } else {
                        let first = page.first_number();
                        format!("Results: {}–{} from {}", first, first + page.rows.len() - 1, page.total)
                    };
                    logf!("Search: OK page={} rows={} total={}", page.page, page.rows.len(), page.total);
                    self.views.insert(Search, DataSet::from_search(&page));
                    self.search_result = Some(page);
                    self.status(msg);
                }
                Done::Search(Err(e)) => self.fail("Search", e),

                Done::Hot(Ok(games)) => {
                    self.views.insert(HotGames, DataSet::from_hot(&games));
                    self.status(format!("Loaded {} hot games", games.len()));
                    self.hot_cache.put(games);
                }
                Done::Hot(Err(e)) => self.fail("Hot", e),

                Done::Collection { username, kind, result: Ok(entries) } => {
                    let msg = format!("Found {} {} games for {}", entries.len(), kind.flag(), username);
                    self.collection = entries;
                    self.state.gui.collection_page = 0;
                    self.show_collection_page();
                    self.status(msg);
                }
                Done::Collection { result: Err(e), .. } => self.fail("Collection", e),

                Done::Recommend { username, recommender, result } => {
                    if recommender.is_some() {
                        self.recommender = recommender;
                    }
                    match result {
                        Ok(recs) if recs.is_empty() => {
                            logw!("Recommend: nothing for {username}");
                            self.views.remove(&YourGames);
                            self.showing_collection = false;
                            self.status(format!(
                                "No recommendations for '{username}'. They may have too few ratings overlapping other guild members."
                            ));
                        }
                        Ok(recs) => {
                            self.views.insert(YourGames, DataSet::from_recommendations(&recs));
                            self.showing_collection = false;
                            self.status(format!("Top {} recommendations for {username}", recs.len()));
                        }
                        Err(e) => self.fail("Recommend", e),
                    }
                }
            }
        }
    }
}

async fn open_games(settings: &Settings) -> crate::Result<GamesDb> {
    if bundle::ensure_games_db(&settings.games_db, &settings.games_zip)? {
        logf!("Init: extracted {}", settings.games_db.display());
    }
    GamesDb::open(&settings.games_db, false).await
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll();

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.running {
                    ui.spinner();
                }
                ui.label(self.status_text());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            components::tabs::draw(ui, self);

            ui.separator();

            let page = self.current_page();
            page.draw_controls(ui, self);

            ui.separator();

            components::export_bar::draw(ui, self);

            ui.separator();

            components::data_table::draw(ui, self);
        });
    }
}
