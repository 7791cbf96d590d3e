#![forbid(unsafe_code)]

mod cmd;
mod output;
mod seed;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use marquee_core::EngineConfig;
use output::OutputMode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "mq: in-memory event/user interest matcher",
    long_about = None
)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Seed for the random catalog; the same seed always builds the same
    /// world.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Path to a toml engine config (grid_size, num_days, birthday_window).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Seed a catalog, show it, and dispatch pending matches",
        after_help = "EXAMPLES:\n    # Default catalog of 8 events and 8 users\n    mq demo\n\n    # Bigger world, machine-readable\n    mq demo --events 50 --users 50 --json"
    )]
    Demo(cmd::demo::DemoArgs),

    #[command(about = "List the seeded events")]
    Events(cmd::list::CatalogArgs),

    #[command(about = "List the seeded users")]
    Users(cmd::list::CatalogArgs),

    #[command(about = "List every (event, user) pair sharing a category")]
    Matches(cmd::list::CatalogArgs),

    #[command(
        about = "Events within one grid cell of a point",
        after_help = "EXAMPLES:\n    mq nearby -x 4 -y 5\n    mq nearby -x 0 -y 0 --events 100 --json"
    )]
    Nearby(cmd::nearby::NearbyArgs),

    #[command(
        about = "Events scheduled near a seeded user's birthday",
        after_help = "EXAMPLES:\n    # Default window from config\n    mq birthday --user 0\n\n    # Explicit two-week window\n    mq birthday --user 3 --window 14"
    )]
    Birthday(cmd::birthday::BirthdayArgs),

    #[command(
        about = "Drain pending recommendations and dispatch notifications",
        long_about = "Drain pending recommendations and dispatch notifications.\n\
                      The catalog is rebuilt from --seed on every run, so the\n\
                      at-most-once guarantee holds within a single process."
    )]
    Notify(cmd::notify::NotifyArgs),

    #[command(
        about = "Run a deterministic invariant campaign",
        after_help = "EXAMPLES:\n    mq sim\n    mq sim --seeds 200 --steps 60 --json"
    )]
    Sim(cmd::sim::SimArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MARQUEE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "marquee_core=debug,marquee_cli=debug,info"
        } else {
            "marquee_core=info,marquee_cli=info,warn"
        })
    });

    let format = env::var("MARQUEE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = OutputMode::from_json_flag(cli.json);
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Demo(args) => cmd::demo::run_demo(args, config, cli.seed, output),
        Commands::Events(args) => cmd::list::run_events(args, config, cli.seed, output),
        Commands::Users(args) => cmd::list::run_users(args, config, cli.seed, output),
        Commands::Matches(args) => cmd::list::run_matches(args, config, cli.seed, output),
        Commands::Nearby(args) => cmd::nearby::run_nearby(args, config, cli.seed, output),
        Commands::Birthday(args) => cmd::birthday::run_birthday(args, config, cli.seed, output),
        Commands::Notify(args) => cmd::notify::run_notify(args, config, cli.seed, output),
        Commands::Sim(args) => cmd::sim::run_sim(args, config, output),
    }
}
