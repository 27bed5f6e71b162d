// src/log.rs
//
// Subscriber setup. Call sites use the logf!/logd!/logw!/loge! macros.
// GUI: append to .store/debug.log (no console on Windows).
// CLI: stderr, so stdout stays clean for exported tables.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::consts::{DEFAULT_LOG_FILTER, LOG_FILE, STORE_DIR};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log to `.store/debug.log`. Falls back to stderr if the file can't be opened.
pub fn init_file() {
    let _ = fs::create_dir_all(STORE_DIR);
    let path = Path::new(STORE_DIR).join(LOG_FILE);

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let _ = fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(_) => init_stderr(),
    }
}

pub fn init_stderr() {
    let _ = fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .try_init();
}
