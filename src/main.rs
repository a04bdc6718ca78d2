//! swcache - Offline caching controller
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use swcache::cli::{commands, Cli, Commands, HostEnv};
use swcache::config::ConfigManager;
use swcache::error::SwcacheResult;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SwcacheResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions { shell } = cli.command {
        commands::completions(shell);
        return Ok(());
    }

    let config_manager = ConfigManager::resolve(cli.config.clone());
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    swcache::ui::init_theme();
    debug!("Loaded configuration from {}", config_manager.path().display());

    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(ConfigManager::default_state_dir);
    let env = HostEnv::new(config, config_manager.path().to_path_buf(), state_dir);

    match cli.command {
        Commands::Completions { .. } => Ok(()),
        Commands::Install(args) => commands::install(args, &env).await,
        Commands::Fetch(args) => commands::fetch(args, &env).await,
        Commands::Status => commands::status(&env).await,
        Commands::Cache(args) => commands::cache(args, &env).await,
        Commands::Config(args) => commands::config(args, &env).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `RUST_LOG` is ignored
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("swcache=warn"),
        1 => EnvFilter::new("swcache=info"),
        _ => EnvFilter::new("swcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.with_target(false).without_time().init();
    }
}
