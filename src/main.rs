use changes_cache::commands::*;
use changes_cache::core::{
    error::{CacheError, Result},
    print_error,
};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "changes-cache")]
#[command(about = "Local cache of committed change lists for a git work tree")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read recent commits and append them to the cache
    Fetch {
        /// Number of recent commits to read (0 = whole history)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Store the change lists as incoming rather than completely downloaded
        #[arg(long)]
        incomplete: bool,
    },
    /// Show cached change lists
    Log(BrowseArgs),
    /// Show change lists not yet confirmed against the work tree
    Incoming,
    /// Mark incoming change lists whose files have all been updated
    Reconcile {
        /// JSON report of updated files
        report: Option<PathBuf>,
        /// Build the report from commits after this revision
        #[arg(long, conflicts_with = "report")]
        since: Option<String>,
    },
    /// Show or set whether the cache holds the complete history
    History {
        /// Mark the history as complete
        #[arg(long, conflicts_with = "partial")]
        complete: bool,
        /// Mark the history as partial
        #[arg(long)]
        partial: bool,
    },
    /// Show the cache header summary
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let result = match cli.command {
        Commands::Fetch { count, incomplete } => execute_fetch(count, incomplete),
        Commands::Log(args) => execute_browse(args),
        Commands::Incoming => execute_incoming(),
        Commands::Reconcile { report, since } => {
            execute_reconcile(report.as_deref(), since.as_deref())
        }
        Commands::History { complete, partial } => {
            let set = match (complete, partial) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            execute_history(set)
        }
        Commands::Info => execute_info(),
    };

    if let Err(e) = result {
        if let CacheError::NotInGitRepo = e {
            print_error("Not in a git repository");
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(1);
    }

    Ok(())
}
