// src/config/settings.rs
//
// Layering, lowest to highest: built-in defaults → scout.toml → .env / process env.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::consts::*;
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub bgg_token: Option<String>,
    pub bgg_username: Option<String>,
    pub bgg_password: Option<String>,
    pub games_db: PathBuf,
    pub games_zip: PathBuf,
    pub ratings_db: PathBuf,
    pub ranks_csv: PathBuf,
    pub guild_id: u32,
    pub users_per_run: usize,
    /// Release artifacts the app can pull (games DB zip, ratings DB).
    pub games_release_url: Option<String>,
    pub ratings_release_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bgg_token: None,
            bgg_username: None,
            bgg_password: None,
            games_db: PathBuf::from(GAMES_DB),
            games_zip: PathBuf::from(GAMES_ZIP),
            ratings_db: PathBuf::from(RATINGS_DB),
            ranks_csv: PathBuf::from(RANKS_CSV),
            guild_id: GUILD_ID,
            users_per_run: USERS_PER_RUN,
            games_release_url: None,
            ratings_release_url: None,
        }
    }
}

/// On-disk shape of `scout.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    bgg_token: Option<String>,
    games_db: Option<PathBuf>,
    games_zip: Option<PathBuf>,
    ratings_db: Option<PathBuf>,
    ranks_csv: Option<PathBuf>,
    guild_id: Option<u32>,
    users_per_run: Option<usize>,
    games_release_url: Option<String>,
    ratings_release_url: Option<String>,
}

impl Settings {
    /// Load with the default `scout.toml` (if present) plus environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// An explicit config path must exist; the default one is optional.
    pub fn load_from(config: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut settings = Self::default();

        match config {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::MissingFile(p.to_path_buf()));
                }
                settings.apply_file(&fs::read_to_string(p)?)?;
            }
            None => {
                let p = Path::new(CONFIG_FILE);
                if p.exists() {
                    settings.apply_file(&fs::read_to_string(p)?)?;
                }
            }
        }

        settings.apply_env(|k| std::env::var(k).ok());
        Ok(settings)
    }

    pub fn apply_file(&mut self, text: &str) -> Result<()> {
        let f: FileSettings = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;

        if let Some(v) = f.bgg_token { self.bgg_token = non_empty(v); }
        if let Some(v) = f.games_db { self.games_db = v; }
        if let Some(v) = f.games_zip { self.games_zip = v; }
        if let Some(v) = f.ratings_db { self.ratings_db = v; }
        if let Some(v) = f.ranks_csv { self.ranks_csv = v; }
        if let Some(v) = f.guild_id { self.guild_id = v; }
        if let Some(v) = f.users_per_run { self.users_per_run = v; }
        if f.games_release_url.is_some() { self.games_release_url = f.games_release_url; }
        if f.ratings_release_url.is_some() { self.ratings_release_url = f.ratings_release_url; }
        Ok(())
    }

    /// `lookup` is injectable so tests don't have to touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BGG_TOKEN").and_then(non_empty) { self.bgg_token = Some(v); }
        if let Some(v) = lookup("BGG_USERNAME").and_then(non_empty) { self.bgg_username = Some(v); }
        if let Some(v) = lookup("BGG_PASSWORD").and_then(non_empty) { self.bgg_password = Some(v); }
        if let Some(v) = lookup("SCOUT_GAMES_DB").and_then(non_empty) { self.games_db = PathBuf::from(v); }
        if let Some(v) = lookup("SCOUT_RATINGS_DB").and_then(non_empty) { self.ratings_db = PathBuf::from(v); }
    }
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}
