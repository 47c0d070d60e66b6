use attendance_core::{Date, Location};
use attendance_journal::{attendance_for_location, csv, reader};
use clap::Args;
use eyre::WrapErr;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Command {
    /// The name of the location, exactly as it appears in the locations registry
    #[arg(short, long)]
    location: String,
    /// Write the CSV output to this file instead of stdout
    #[arg(short = 'w', long)]
    write: Option<PathBuf>,
    /// The day to analyze, in YYYY/MM/DD
    date: String,
}

pub async fn run(args: Command, journal_dir: &PathBuf) -> eyre::Result<()> {
    let date = Date::parse(&args.date).wrap_err("invalid date")?;
    let path = journal_dir.join(date.journal_filename());
    let entries = reader::read(&path).await.wrap_err("failed to read journal")?;

    let location = Location::from(args.location.as_str());
    let roster = attendance_for_location(&location, &entries);

    match &args.write {
        Some(path) => {
            let file = File::create(path).wrap_err("failed to create output file")?;
            csv::write(&roster, file).wrap_err("failed to write CSV output")
        }
        None => csv::write(&roster, std::io::stdout()).wrap_err("failed to write CSV output"),
    }
}
