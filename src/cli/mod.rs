pub mod args;
pub mod color;
pub mod commands;
pub mod export;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ranno::config::PlannerConfig;

pub fn run() -> Result<()> {
    let cli = args::Cli::parse();
    init_logging(cli.verbose);

    let config_path = resolve_config_path(cli.config.clone())?;
    let mut config = PlannerConfig::load(&config_path)
        .with_context(|| format!("Unable to load config: {}", config_path.display()))?;

    match &cli.cmd {
        args::Commands::Plan {
            prompt,
            max_questions,
            cached,
            json,
            out,
        } => {
            if max_questions.is_some() {
                config.dialogue.max_follow_up = *max_questions;
            }
            let opts = commands::plan::PlanOptions {
                prompt: prompt.clone(),
                cached: *cached,
                json: *json,
                out: out.clone(),
                db_path: resolve_db_path(cli.db.clone())?,
            };
            block_on(commands::plan::run(config, opts))
        }

        args::Commands::Loop {
            lat,
            lng,
            km,
            count,
        } => {
            validate::validate_loop(*lat, *lng, *km, *count)?;
            commands::loop_points::run(*lat, *lng, *km, *count)
        }

        args::Commands::Risk {
            south,
            west,
            north,
            east,
            cached,
        } => {
            validate::validate_bounds(*south, *west, *north, *east)?;
            let bounds = ranno::routing::Bounds::new(*south, *west, *north, *east);
            let db_path = resolve_db_path(cli.db.clone())?;
            block_on(commands::risk::run(&config, bounds, *cached, &db_path))
        }

        args::Commands::Data { cmd } => {
            let db_path = resolve_db_path(cli.db.clone())?;
            match cmd {
                args::DataCommands::Sync => block_on(commands::data::sync(&config, &db_path)),
                args::DataCommands::Status => ranno::db::status::run(&db_path),
            }
        }

        args::Commands::Config { cmd } => match cmd {
            args::ConfigCommands::Path => commands::config::path(&config_path),
            args::ConfigCommands::Show => commands::config::show(&config),
        },
    }
}

/// `warn` by default, `-v` info, `-vv` debug. RUST_LOG wins when set.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(default);
    // A second init (e.g. in tests) is harmless.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn block_on<F: std::future::Future<Output = Result<()>>>(fut: F) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    rt.block_on(fut)
}

pub fn resolve_config_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(p) => Ok(p),
        None => ranno::paths::default_config_path(),
    }
}

pub fn resolve_db_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(p) => Ok(p),
        None => ranno::paths::default_db_path(),
    }
}
