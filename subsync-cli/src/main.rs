//! subsync — manage subtitle tracks for a channel's videos.
//!
//! # Usage
//!
//! ```text
//! subsync -c <channel> project <name>
//! subsync -c <channel> sync <name> [--dry-run]
//! subsync -c <channel> status <name>
//! subsync -c <channel> upload --video-id <id> --language <code> --file-path <file>
//! ```
//!
//! `<channel>` is a nickname from `config.json`; subtitle files follow the
//! `VIDEOID_LANGUAGE.<ext>` naming convention.

mod commands;
mod config;
mod credentials;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{project::ProjectArgs, status::StatusArgs, sync::SyncArgs, upload::UploadArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "subsync",
    version,
    about = "Synchronize local subtitle folders with a channel's caption tracks",
    long_about = None,
)]
struct Cli {
    /// Nickname of the channel to work on (defined in config.json).
    #[arg(short = 'c', long = "channel")]
    channel: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new project directory with an empty manifest.
    Project(ProjectArgs),

    /// Reconcile a project folder with the channel's caption tracks.
    Sync(SyncArgs),

    /// Show local changes since the last sync (no remote calls).
    Status(StatusArgs),

    /// Upload a single subtitle file to a video.
    Upload(UploadArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(Path::new(config::CONFIG_FILE))?;
    let channel = config.resolve(&cli.channel)?;
    let nickname = cli.channel.as_str();

    match cli.command {
        Commands::Project(args) => args.run(nickname, &channel),
        Commands::Sync(args) => args.run(nickname, &channel),
        Commands::Status(args) => args.run(nickname),
        Commands::Upload(args) => args.run(nickname),
    }
}
