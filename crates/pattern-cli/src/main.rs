//! `palvalidator`: the forward-stepwise pattern discovery and permutation
//! validation driver (spec.md §6 "CLI surface").

mod args;
mod artifacts;
mod config_io;
mod ingest_csv;
mod run;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "pattern_cli=info,pattern_search=info".into()),
        )
        .init();

    let args = args::Args::parse();
    let out_dir = std::env::current_dir().expect("current directory must be readable");

    match run::execute(&args, &out_dir) {
        Ok(summary) => {
            for path in &summary.selected_files {
                tracing::info!(path = %path.display(), "wrote selected-survivors file");
            }
            for path in &summary.validated_files {
                tracing::info!(path = %path.display(), "wrote validated-survivors file");
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
