use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shoptext_core::load_app_config;
use shoptext_store::{ChatLog, FileStore, LogObserver, Scope};

mod pipeline;

#[derive(Debug, Parser)]
#[command(name = "shoptext")]
#[command(about = "Extract shop/package data from chat text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a file (or stdin) and print the catalog as JSON
    Parse {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Do not serve the cached catalog when parsing yields nothing
        #[arg(long)]
        no_cache_fallback: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parse {
            file,
            pretty,
            no_cache_fallback,
        } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let store = Arc::new(FileStore::new(config.state_path.clone()));
            let source = ChatLog::single(text);
            let options = pipeline::PipelineOptions {
                cache_fallback: !no_cache_fallback,
                scope: Scope::script("shoptext-cli"),
            };

            let data = pipeline::run(&source, store.as_ref(), &LogObserver, &options);

            // Cache write is spawned so rendering never waits on disk; the
            // handle is joined after printing so a short-lived process
            // still lands the write.
            let write_handle = if data.is_empty() {
                None
            } else {
                let store = Arc::clone(&store);
                let scope = options.scope.clone();
                let snapshot = data.clone();
                Some(tokio::spawn(async move {
                    pipeline::persist(store.as_ref(), &scope, &snapshot);
                }))
            };

            let rendered = if pretty {
                serde_json::to_string_pretty(&data)?
            } else {
                serde_json::to_string(&data)?
            };
            println!("{rendered}");

            if let Some(handle) = write_handle {
                let _ = handle.await;
            }
        }
    }

    Ok(())
}
