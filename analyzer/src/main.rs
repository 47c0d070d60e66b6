use clap::{Parser, Subcommand};
use common::logging;
use std::path::PathBuf;
use tracing::{debug, Level};

mod attendances;
mod contacts;
mod locations;
mod person;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    common::dotenv()?;

    let args = Args::parse();
    logging::init(args.log_level)?;

    debug!(?args);

    match args.command {
        Command::Locations(command) => locations::run(command, &args.journal_dir).await,
        Command::Contacts(command) => contacts::run(command, &args.journal_dir).await,
        Command::Attendances(command) => attendances::run(command, &args.journal_dir).await,
    }
}

/// Offline analysis over a location's attendance journals
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Directory the per-day journal files are read from
    #[arg(long, default_value = "./journal", env = "JOURNAL_DIR")]
    journal_dir: PathBuf,

    /// The default level to log at
    #[arg(short, long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every location a person visited on a given day
    Locations(locations::Command),
    /// List everyone a person came into contact with on a given day
    Contacts(contacts::Command),
    /// List everyone who attended a location on a given day
    Attendances(attendances::Command),
}
