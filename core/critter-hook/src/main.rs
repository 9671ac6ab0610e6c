//! critter-hook: CLI hook handler for Critter session status tracking.
//!
//! Rust binary that handles coding-assistant hook events and maintains the
//! per-session status files that `critter-core` watches. Called directly by
//! the assistant's hook configuration.
//!
//! ## Subcommands
//!
//! - `handle`: Main hook handler, reads JSON from stdin
//! - `prune`: Removes status files for sessions that ended without cleanup

mod events;
mod logging;
mod status_file;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "critter-hook")]
#[command(about = "Critter session status recorder")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a hook event (reads JSON from stdin)
    Handle {
        /// Terminal device path of the invoking session (resolved by the
        /// shell wrapper, e.g. `$(tty)`)
        #[arg(long)]
        tty: Option<String>,
    },

    /// Remove status files whose sessions are long gone
    Prune,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Handle { tty } => {
            if let Err(e) = events::run(tty.as_deref()) {
                tracing::error!(error = %e, "critter-hook handle failed");
                std::process::exit(1);
            }
        }
        Commands::Prune => {
            // Pruning is non-critical - log errors but exit 0
            if let Err(e) = status_file::prune() {
                tracing::warn!(error = %e, "critter-hook prune failed");
            }
        }
    }
}
