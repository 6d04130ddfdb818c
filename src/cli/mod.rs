pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use output::{render_all_stats, render_names, render_open_activities, render_stats};
use tracing::level_filters::LevelFilter;

use crate::{
    storage::{json_storage::JsonActivityStorage, ActivityRepository},
    tracker::service::{ActivityService, RenamePolicy, ServiceConfig},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "kal", version, long_about = None)]
#[command(
    about = "Track time spent on real-life activities. Run `kal start <activity>` to start tracking and `kal stop <activity>` to stop it.",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "KAL_DIR",
        help = "Application directory. By default uses $HOME/.kal if it exists, else $XDG_STATE_HOME/kal or $HOME/.local/state/kal"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to stderr")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Log level, overrides RUST_LOG")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(visible_alias = "na", about = "Creates a new activity record")]
    NewActivity { name: String },
    #[command(about = "Starts tracking given activity")]
    Start { name: String },
    #[command(about = "Stops tracking given activity")]
    Stop { name: String },
    #[command(
        visible_alias = "rm",
        about = "Removes activity record. Removing an unknown activity does nothing"
    )]
    Remove { name: String },
    #[command(visible_alias = "mv", about = "Renames given activity")]
    Rename {
        old_name: String,
        new_name: String,
        #[arg(
            long,
            help = "Allow the new name to collide with another activity. Lookups then pick the first one"
        )]
        allow_duplicate: bool,
    },
    #[command(about = "Get stats for a given activity, or for all of them")]
    Stat {
        name: Option<String>,
        #[arg(long, help = "Output as json to stdout")]
        json: bool,
    },
    #[command(visible_alias = "ls", about = "List all activity names")]
    List {
        #[arg(long, help = "Output as json to stdout")]
        json: bool,
    },
    #[command(about = "See all active activities")]
    Log {
        #[arg(long, help = "Output as json to stdout")]
        json: bool,
    },
}

impl Commands {
    fn service_config(&self) -> ServiceConfig {
        let rename_policy = match self {
            Commands::Rename {
                allow_duplicate: true,
                ..
            } => RenamePolicy::AllowDuplicates,
            _ => RenamePolicy::Reject,
        };
        ServiceConfig { rename_policy }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };
    enable_logging(CLI_PREFIX, &dir.join("logs"), args.log_filter, args.log)?;

    let storage = JsonActivityStorage::new(dir)?;
    let service = ActivityService::new(
        storage,
        Box::new(DefaultClock),
        args.commands.service_config(),
    );

    let output = execute(&service, args.commands).await?;
    print!("{output}");
    Ok(())
}

/// Runs a single command against `service` and returns what should be printed.
pub async fn execute<R: ActivityRepository>(
    service: &ActivityService<R>,
    command: Commands,
) -> Result<String> {
    let output = match command {
        Commands::NewActivity { name } => {
            service.create_activity(&name).await?;
            String::new()
        }
        Commands::Start { name } => {
            service.start_session(&name).await?;
            String::new()
        }
        Commands::Stop { name } => {
            service.stop_session(&name).await?;
            String::new()
        }
        Commands::Remove { name } => {
            service.remove_activity(&name).await?;
            String::new()
        }
        Commands::Rename {
            old_name, new_name, ..
        } => {
            service.rename_activity(&old_name, &new_name).await?;
            String::new()
        }
        Commands::Stat {
            name: Some(name),
            json,
        } => render_stats(&service.get_stats(&name).await?, json, &Local)?,
        Commands::Stat { name: None, json } => {
            render_all_stats(&service.get_all_stats().await?, json, &Local)?
        }
        Commands::List { json } => render_names(&service.list_activity_names().await?, json)?,
        Commands::Log { json } => {
            render_open_activities(&service.list_open_activities().await?, json, &Local)?
        }
    };
    Ok(output)
}
