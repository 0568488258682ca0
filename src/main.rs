// This is the entry point for the server binary.
// It parses command-line arguments, sets up logging, then either serves requests or renders a single document.

use std::process;

use clap::Parser;
use swagger_summary::cli::Args;
use swagger_summary::server::{self, AppState};
use swagger_summary::{summarize_uri, SpecLoader};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Logs go to stderr so rendered summaries on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let loader = match SpecLoader::new(args.loader_config()) {
        Ok(loader) => loader,
        Err(err) => {
            eprintln!("Error creating loader: {}", err);
            process::exit(1);
        }
    };

    if let Some(uri) = &args.render {
        match summarize_uri(&loader, uri).await {
            Ok(summary) => print!("{}", summary),
            Err(err) => {
                println!("err: {}", err);
                process::exit(1);
            }
        }
        return;
    }

    if !args.static_dir.is_dir() {
        warn!(dir = %args.static_dir.display(), "static directory does not exist");
    }

    let app = server::router(AppState::new(loader), &args.static_dir);
    if let Err(err) = server::serve(app, args.addr).await {
        error!(error = %err, "server stopped");
        process::exit(1);
    }
}
