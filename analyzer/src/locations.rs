use crate::person;
use attendance_core::Date;
use attendance_journal::{csv, reader, visited_locations};
use clap::Args;
use eyre::WrapErr;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Command {
    /// Comma-separated fields identifying the person, e.g. "Jane,Ghent"
    #[arg(short, long)]
    person: String,
    /// The day to analyze, in YYYY/MM/DD
    date: String,
}

pub async fn run(args: Command, journal_dir: &PathBuf) -> eyre::Result<()> {
    let date = Date::parse(&args.date).wrap_err("invalid date")?;
    let path = journal_dir.join(date.journal_filename());
    let entries = reader::read(&path).await.wrap_err("failed to read journal")?;

    let person = person::resolve(&entries, &args.person)?;
    let mut visits: Vec<_> = visited_locations(&person, &entries).into_iter().collect();
    visits.sort();

    csv::write(&visits, std::io::stdout()).wrap_err("failed to write CSV output")
}
