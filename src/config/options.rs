// src/config/options.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::consts::*;
use crate::search::SearchFilters;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppOptions {
    pub search: SearchFilters,
    pub collection: CollectionKind,
    pub export: ExportOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    Search,
    HotGames,
    YourGames,
}

impl PageKind {
    /// Default export file stem for the page.
    pub fn file_stem(self) -> &'static str {
        match self {
            PageKind::Search => DEFAULT_FILE,
            PageKind::HotGames => "hot_games",
            PageKind::YourGames => "your_games",
        }
    }
}

/// Which list of a user's BGG collection to pull.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollectionKind {
    #[default]
    Owned,
    Rated,
    Wishlist,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [CollectionKind::Owned, CollectionKind::Rated, CollectionKind::Wishlist];

    /// Query flag understood by the collection endpoint.
    pub fn flag(self) -> &'static str {
        match self {
            CollectionKind::Owned => "own",
            CollectionKind::Rated => "rated",
            CollectionKind::Wishlist => "wishlist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Owned => "Owned Games",
            CollectionKind::Rated => "Rated Games",
            CollectionKind::Wishlist => "Wishlist",
        }
    }

    pub fn from_flag(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "own" | "owned" => Some(CollectionKind::Owned),
            "rated" => Some(CollectionKind::Rated),
            "wishlist" => Some(CollectionKind::Wishlist),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub include_headers: bool,
    out_path: OutputPath,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            include_headers: true,
            out_path: OutputPath::default(),
        }
    }
}

impl ExportOptions {
    /// `<dir>/<stem>.<ext>`; a user-typed extension wins over the format's.
    pub fn out_path(&self) -> PathBuf {
        let ext = self
            .out_path
            .user_ext
            .clone()
            .unwrap_or_else(|| OsString::from(self.format.ext()));
        let mut name = self.out_path.file_stem.clone();
        name.push(".");
        name.push(ext);
        self.out_path.dir.join(name)
    }

    /// Parse GUI/CLI text into dir + stem (+ explicit extension, if typed).
    pub fn set_path(&mut self, text: &str) {
        let p = Path::new(text.trim());
        if let Some(parent) = p.parent() {
            self.out_path.dir = parent.to_path_buf();
        }
        if let Some(stem) = p.file_stem() {
            self.out_path.file_stem = stem.to_os_string();
        }
        self.out_path.user_ext = p.extension().map(|e| e.to_os_string());
    }

    /// Point the default path at a page's stem, unless the user customised it.
    pub fn set_default_stem_for(&mut self, kind: PageKind) {
        if self.is_default_path() {
            self.out_path.file_stem = OsString::from(kind.file_stem());
        }
    }

    /// Still the built-in dir, a built-in stem and no typed extension?
    pub fn is_default_path(&self) -> bool {
        let stems = [PageKind::Search, PageKind::HotGames, PageKind::YourGames];
        self.out_path.dir == Path::new(DEFAULT_OUT_DIR)
            && self.out_path.user_ext.is_none()
            && stems.iter().any(|k| self.out_path.file_stem == OsString::from(k.file_stem()))
    }

    pub fn delimiter(&self) -> char {
        self.format.delim()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OutputPath {
    dir: PathBuf,
    file_stem: OsString, // without extension
    user_ext: Option<OsString>,
}

impl Default for OutputPath {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUT_DIR),
            file_stem: OsString::from(DEFAULT_FILE),
            user_ext: None,
        }
    }
}
