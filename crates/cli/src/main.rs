use anyhow::Context;
use clap::Parser;
use rankset_cli::{run, OutputFormat};
use rankset_core::config;
use rankset_core::{Registry, SkipListConfig};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rankset", about = "In-memory sorted-set shell")]
struct Args {
    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Print replies as one JSON value per line
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Seed for skip-list level generation (reproducible layouts)
    #[arg(long)]
    seed: Option<u64>,

    /// Upper bound on skip-list node height
    #[arg(long, default_value_t = config::SKIPLIST_MAX_LEVEL)]
    max_level: usize,

    /// Probability of promoting a node one more level
    #[arg(long, default_value_t = config::SKIPLIST_P)]
    probability: f64,

    /// Emit logs as JSON on stderr
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let registry = Registry::with_config(SkipListConfig {
        max_level: args.max_level,
        probability: args.probability,
        seed: args.seed,
    })
    .context("invalid skip-list configuration")?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let stdout = io::stdout().lock();
    let stats = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script '{}'", path.display()))?;
            run(&registry, BufReader::new(file), stdout, format)?
        }
        None => run(&registry, io::stdin().lock(), stdout, format)?,
    };

    tracing::info!(
        commands = stats.commands,
        errors = stats.errors,
        sets = registry.len(),
        memory_bytes = registry.total_memory_bytes(),
        "session finished"
    );
    Ok(())
}
