//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// swcache - Offline caching controller for a web origin
///
/// Installs versioned cache partitions for an origin and serves requests
/// through them with cache-first and network-first strategies.
#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SWCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// State directory (registration record and default cache storage)
    #[arg(long, global = true, env = "SWCACHE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install and activate a controller version for the origin
    Install(InstallArgs),

    /// Route one request through the active controller
    Fetch(FetchArgs),

    /// Show the registration and its cache partitions
    Status,

    /// Inspect or clear cache partitions
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Cache version to install
    #[arg(long)]
    pub cache_version: Option<String>,

    /// Registration URL; the cache version is read from its `v` parameter
    #[arg(long, conflicts_with = "cache_version")]
    pub registration_url: Option<String>,

    /// Origin to serve (overrides [controller] origin)
    #[arg(long)]
    pub origin: Option<String>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Path on the origin (e.g. /about) or absolute URL
    pub target: String,

    /// Send the request as a page navigation
    #[arg(short, long)]
    pub navigate: bool,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Simulate a host with no network
    #[arg(long)]
    pub offline: bool,

    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print status and headers before the body
    #[arg(short, long)]
    pub include: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List partitions and their entries
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete every partition and the registration
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_install() {
        let cli = Cli::parse_from([
            "swcache",
            "install",
            "--registration-url",
            "/sw.js?v=7",
            "--origin",
            "https://example.com",
        ]);
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.registration_url.as_deref(), Some("/sw.js?v=7"));
                assert_eq!(args.origin.as_deref(), Some("https://example.com"));
                assert!(args.cache_version.is_none());
            }
            _ => panic!("expected Install command"),
        }
    }

    #[test]
    fn install_version_conflicts_with_url() {
        let result = Cli::try_parse_from([
            "swcache",
            "install",
            "--cache-version",
            "3",
            "--registration-url",
            "/sw.js?v=7",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from(["swcache", "fetch", "/about", "--navigate", "--offline"]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.target, "/about");
                assert!(args.navigate);
                assert!(args.offline);
                assert_eq!(args.method, "GET");
                assert!(!args.include);
            }
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_fetch_method() {
        let cli = Cli::parse_from(["swcache", "fetch", "-X", "POST", "/api/contact"]);
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.method, "POST"),
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_status() {
        let cli = Cli::parse_from(["swcache", "status"]);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn cli_parses_cache_clear() {
        let cli = Cli::parse_from(["swcache", "cache", "clear", "--yes"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { yes },
            }) => assert!(yes),
            _ => panic!("expected Cache clear command"),
        }
    }

    #[test]
    fn cli_parses_state_dir() {
        let cli = Cli::parse_from(["swcache", "--state-dir", "/tmp/sw", "status"]);
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/sw")));
    }

    #[test]
    fn cli_parses_completions() {
        let cli = Cli::parse_from(["swcache", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["swcache", "status"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["swcache", "-v", "status"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["swcache", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
    }
}
