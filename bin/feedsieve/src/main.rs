mod commands;

use clap::{Parser, Subcommand};
use feedsieve_core::GroupSelection;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "feedsieve")]
#[command(about = "Filter the Bilibili dynamic feed down to one follow group", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session cookie to use instead of the one in config (SESSDATA=...; DedeUserID=...)
    #[arg(long, global = true, env = "FEEDSIEVE_COOKIE", hide_env_values = true)]
    cookie: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration and session status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// List your follow groups
    Groups,

    /// List the members of a follow group
    Members {
        /// Group id (tagid), as shown by `feedsieve groups`
        #[arg(allow_hyphen_values = true)]
        group: i64,
    },

    /// Load the dynamic feed, filtered to a follow group
    Feed {
        /// Group id to filter by, or "all" for the unfiltered feed
        #[arg(short, long, default_value = "all", allow_hyphen_values = true)]
        group: GroupSelection,

        /// Number of consecutive feed loads (scrolls) to perform
        #[arg(short, long, default_value = "1")]
        loads: u32,

        /// Start from this feed offset instead of the top
        #[arg(long)]
        offset: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Status => {
            commands::status::run(cli.cookie).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show().await?;
            }
            ConfigCommands::Init { force } => {
                commands::config_cmd::init(force).await?;
            }
            ConfigCommands::Path => {
                commands::config_cmd::path().await?;
            }
        },
        Commands::Groups => {
            commands::groups::list(cli.cookie).await?;
        }
        Commands::Members { group } => {
            commands::groups::members(cli.cookie, group).await?;
        }
        Commands::Feed { group, loads, offset } => {
            commands::feed::run(cli.cookie, group, loads, offset).await?;
        }
    }

    Ok(())
}
