mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use classroom_sync::{Destination, Roster, SyncOptions, Synchronizer};
use classroom_sync_drive::{DriveClient, DriveClientConfig};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "classroom-sync")]
#[command(about = "Download classroom assignment submissions into per-student folders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download an assignment's submissions, keeping earlier revisions
    Sync {
        /// Id of the assignment's submission folder
        #[arg(long)]
        folder: String,
        /// Course name, used as the top-level folder and roster key
        #[arg(long)]
        course: String,
        /// Assignment name, used as the second-level folder
        #[arg(long)]
        assignment: String,
        /// Destination root (defaults to the configured destination)
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Roster file listing the students of each course
        #[arg(long)]
        roster: Option<PathBuf>,
        /// Number of concurrent transfers
        #[arg(long)]
        workers: Option<usize>,
    },
    /// List the latest revision of every file in a submission folder
    List {
        /// Id of the assignment's submission folder
        #[arg(long)]
        folder: String,
    },
    /// Delete earlier copies whose size matches the current file
    Sweep {
        #[arg(long)]
        course: String,
        #[arg(long)]
        assignment: String,
        /// Destination root (defaults to the configured destination)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

fn drive_client(config: &AppConfig) -> DriveClient {
    DriveClient::new(DriveClientConfig {
        token: config::api_token(),
        api_base_url: config.api_base_url.clone(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let app_config = config::load_config();

    match cli.command {
        Command::Sync {
            folder,
            course,
            assignment,
            dest,
            roster,
            workers,
        } => {
            let options = SyncOptions {
                workers: workers.unwrap_or(app_config.workers),
                utc_offset: app_config.offset()?,
            };
            let roster_path = roster.unwrap_or_else(|| app_config.roster.clone());
            let (roster, warning) = Roster::load_or_empty(&roster_path);
            if let Some(warning) = warning {
                eprintln!("{warning}");
            }

            let client = Arc::new(drive_client(&app_config));
            let synchronizer = Synchronizer::new(client.clone())
                .with_options(options)
                .with_roster(roster);
            let destination = Destination::new(
                dest.unwrap_or_else(|| app_config.destination.clone()),
                course,
                assignment,
            );

            let result =
                commands::sync::run(&*client, &synchronizer, &folder, &destination).await?;
            if !result.failures.is_empty() {
                anyhow::bail!("{} file(s) failed to transfer", result.failures.len());
            }
            Ok(())
        }
        Command::List { folder } => {
            let client = drive_client(&app_config);
            commands::list::run(&client, &folder).await
        }
        Command::Sweep {
            course,
            assignment,
            dest,
        } => {
            let destination = Destination::new(
                dest.unwrap_or_else(|| app_config.destination.clone()),
                course,
                assignment,
            );
            commands::sweep::run(&destination)
        }
    }
}
