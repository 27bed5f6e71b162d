// src/config/state.rs
use super::options::AppOptions;

#[derive(Clone, Debug)]
pub struct GuiState {
    pub window_w: u32,
    pub window_h: u32,

    /// Active tab index into router::PAGES
    pub current_page_index: usize,

    /// Zero-based result pages
    pub search_page: usize,
    pub collection_page: usize,

    /// Filters panel open?
    pub filters_open: bool,

    /// "Your Games" input
    pub username: String,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            window_w: 1280,
            window_h: 760,
            current_page_index: 0,
            search_page: 0,
            collection_page: 0,
            filters_open: false,
            username: s!(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}
