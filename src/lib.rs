// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod log;

pub mod bgg;
pub mod db;
pub mod search;

pub mod bundle;
pub mod collection;
pub mod hot;
pub mod jobs;
pub mod recommend;

pub mod csv;
pub mod data;
pub mod file;
pub mod gui;
pub mod progress;

pub use error::{Error, Result};
