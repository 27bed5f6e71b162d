// src/gui/task.rs
//
// Network and DB calls run on a tokio runtime owned by the app. Each task
// posts one `Done` back; the UI thread drains the channel every frame.

use std::future::Future;
use std::sync::Arc;

use eframe::egui;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::bgg::{CollectionEntry, GameRecord};
use crate::config::options::CollectionKind;
use crate::error::Result;
use crate::recommend::{Recommendation, Recommender};
use crate::search::SearchPage;

pub enum Done {
    Search(Result<SearchPage>),
    Hot(Result<Vec<GameRecord>>),
    Collection {
        username: String,
        kind: CollectionKind,
        result: Result<Vec<CollectionEntry>>,
    },
    Recommend {
        username: String,
        /// Index built (or reused) for this request, kept for the next one.
        recommender: Option<Arc<Recommender>>,
        result: Result<Vec<Recommendation>>,
    },
}

pub struct Tasks {
    rt: Runtime,
    tx: UnboundedSender<Done>,
    rx: UnboundedReceiver<Done>,
}

impl Tasks {
    pub fn new() -> Result<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("scout-worker")
            .enable_all()
            .build()?;
        let (tx, rx) = unbounded_channel();
        Ok(Self { rt, tx, rx })
    }

    /// Startup work only (opening the DB); never call from a running frame.
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.rt.block_on(fut)
    }

    pub fn spawn<F>(&self, ctx: &egui::Context, fut: F)
    where
        F: Future<Output = Done> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.rt.spawn(async move {
            let done = fut.await;
            if tx.send(done).is_err() {
                logd!("Task finished after the window closed");
            }
            ctx.request_repaint();
        });
    }

    pub fn try_recv(&mut self) -> Option<Done> {
        self.rx.try_recv().ok()
    }
}
