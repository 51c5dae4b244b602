mod simulate;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rift_core::{InstallationConfig, Item, MemoryPersistence, Persistence, SimilarityProjector};
use rift_store::Store;

#[derive(Parser)]
#[command(name = "rift", about = "Attention-rupture installation tooling")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the 3D similarity layout for an items JSON file
    Layout {
        /// Items JSON file
        input: PathBuf,

        /// Write here instead of rewriting the input in place
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run a scripted headless visitor session
    Simulate {
        /// Items JSON file
        input: PathBuf,

        /// Session length in simulated seconds
        #[arg(long, default_value_t = 120)]
        seconds: u64,

        /// Seed for the scripted visitor
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Persist the attention ledger to this SQLite file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show attention ledger statistics
    Stats {
        /// SQLite ledger file
        db: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Layout { input, output } => cmd_layout(&cli, input, output.as_deref()),
        Commands::Simulate {
            input,
            seconds,
            seed,
            db,
        } => cmd_simulate(&cli, input, *seconds, *seed, db.as_deref()),
        Commands::Stats { db } => cmd_stats(db),
    }
}

fn load_config(cli: &Cli) -> Result<InstallationConfig> {
    match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))
        }
        None => Ok(InstallationConfig::default()),
    }
}

fn load_items(path: &Path) -> Result<Vec<Item>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read items {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse items {}", path.display()))
}

fn cmd_layout(cli: &Cli, input: &Path, output: Option<&Path>) -> Result<()> {
    let config = load_config(cli)?;
    let mut items = load_items(input)?;

    let projector = SimilarityProjector::new(config.projector);
    match projector.project(&items) {
        Some(positions) => {
            for (item, position) in items.iter_mut().zip(&positions) {
                item.position = *position;
            }
            let target = output.unwrap_or(input);
            let json = serde_json::to_string_pretty(&items)?;
            fs::write(target, json)
                .with_context(|| format!("failed to write {}", target.display()))?;
            println!("laid out {} items -> {}", items.len(), target.display());
        }
        None => {
            println!(
                "{} items is too few to project; positions left unchanged",
                items.len()
            );
        }
    }
    Ok(())
}

fn cmd_simulate(
    cli: &Cli,
    input: &Path,
    seconds: u64,
    seed: u64,
    db: Option<&Path>,
) -> Result<()> {
    let config = load_config(cli)?;
    let items = load_items(input)?;

    let store: Box<dyn Persistence> = match db {
        Some(path) => Box::new(Store::open(path)?),
        None => Box::new(MemoryPersistence::new()),
    };

    let summary = simulate::run(items, config, seconds, seed, store);

    println!(
        "{} frames over {seconds}s, {} ruptures",
        summary.frames,
        summary.ruptures.len()
    );
    for (at_ms, rupture) in &summary.ruptures {
        println!("{at_ms:>8}ms  {}", rupture.as_str());
    }
    println!(
        "tracked {} items, {:.1}s total dwell, engagement {:.2}",
        summary.items_tracked,
        summary.total_dwell_ms as f64 / 1000.0,
        summary.engagement
    );
    Ok(())
}

fn cmd_stats(db: &Path) -> Result<()> {
    let store = Store::open(db)?;
    let Some(state) = store.load_state()? else {
        println!("no attention data in {}", db.display());
        return Ok(());
    };

    println!("visits:        {} ({:?})", state.visits.count, state.experience_level());
    println!("total gaze:    {:.1}s", state.total_gaze_ms as f64 / 1000.0);
    println!("total dwell:   {:.1}s", state.total_dwell_ms as f64 / 1000.0);
    println!(
        "patterns:      {} scanning, {} dwelling, {} returning",
        state.patterns.scanning, state.patterns.dwelling, state.patterns.returning
    );
    println!("tracked items: {}", state.items.len());

    let mut by_views: Vec<_> = state.items.iter().collect();
    by_views.sort_by(|a, b| b.1.view_count.cmp(&a.1.view_count));
    for (id, record) in by_views.iter().take(5) {
        println!(
            "  {:>4} views  {:>7.1}s dwell  {id}",
            record.view_count,
            record.total_dwell_ms as f64 / 1000.0
        );
    }
    Ok(())
}
