use crate::person;
use attendance_core::Date;
use attendance_journal::{contacts_for_person, csv, reader};
use clap::Args;
use eyre::WrapErr;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Command {
    /// Comma-separated fields identifying the person, e.g. "Jane,Ghent"
    #[arg(short, long)]
    person: String,
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

    let person = person::resolve(&entries, &args.person)?;
    let contacts = contacts_for_person(&person, &entries, date);

    match &args.write {
        Some(path) => {
            let file = File::create(path).wrap_err("failed to create output file")?;
            csv::write(&contacts, file).wrap_err("failed to write CSV output")
        }
        None => csv::write(&contacts, std::io::stdout()).wrap_err("failed to write CSV output"),
    }
}
