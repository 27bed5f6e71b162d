// src/gui/router.rs
use super::pages::{self, Page};

pub static PAGES: &[&'static dyn Page] = &[
    &pages::search::PAGE,
    &pages::hot::PAGE,
    &pages::user::PAGE,
];

pub fn all_pages() -> &'static [&'static dyn Page] {
    PAGES
}
