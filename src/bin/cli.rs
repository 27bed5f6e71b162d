// src/bin/cli.rs
use scout::{cli, log};

fn main() {
    log::init_stderr();
    let _ = color_eyre::install();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
