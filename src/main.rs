//! Entry point for the Benefits Engine binary.
//!
//! Running this binary will start an HTTP server that exposes the
//! benefit calculations.  The directory containing the statutory
//! tables may be specified via the `BENEFITS_TABLES_DIR` environment
//! variable; if unset the server looks for a `statutory_tables` folder
//! relative to the current working directory.  Log verbosity follows
//! `RUST_LOG` and defaults to `info`.

use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Determine where statutory tables are located
    let tables_dir = std::env::var("BENEFITS_TABLES_DIR").unwrap_or_else(|_| "statutory_tables".to_string());
    let tables_dir_path = PathBuf::from(tables_dir);
    // Determine bind address
    let addr = std::env::var("BENEFITS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    if let Err(err) = benefits_engine::api::serve(&addr, tables_dir_path).await {
        error!("error running server: {err:#}");
        std::process::exit(1);
    }
}
