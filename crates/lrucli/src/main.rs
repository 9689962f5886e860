//! lrucli - command shell over an in-memory LRU cache

mod demo;
mod handler;
mod session;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use lrucache::SharedLruCache;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::handler::CommandHandler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of entries)
    #[arg(short, long, env = "LRUCLI_CAPACITY", default_value_t = 4)]
    capacity: usize,

    /// Read commands from a file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Replay a sample put/get sequence and exit
    #[arg(long)]
    demo: bool,

    /// Render replies as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so replies on stdout stay machine-readable
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting lrucli v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", args.capacity);

    if args.demo {
        for line in demo::run(args.capacity) {
            println!("{}", line);
        }
        return Ok(());
    }

    let cache = Arc::new(SharedLruCache::new(args.capacity));
    let handler = CommandHandler::new(Arc::clone(&cache));
    let stdout = io::stdout();

    let handled = match &args.script {
        Some(path) => {
            info!("Reading commands from {}", path.display());
            let reader = session::open_script(path)?;
            session::run(&handler, reader, stdout.lock(), args.json)?
        }
        None => session::run(&handler, io::stdin().lock(), stdout.lock(), args.json)?,
    };

    let stats = cache.stats();
    info!(
        commands = handled,
        entries = cache.len(),
        hits = stats.hits(),
        misses = stats.misses(),
        evictions = stats.evictions(),
        "Session finished"
    );

    Ok(())
}
