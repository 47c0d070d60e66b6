use crate::model::JournalEntry;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{error, instrument};

/// Appends journal entries to one file per day, serialized through a single consumer
/// task so concurrent logins never interleave partial lines.
///
/// A failed append is logged and dropped rather than surfaced to the HTTP caller who
/// triggered it: by the time the write happens the login or logout has already
/// succeeded from the visitor's point of view, and retrying would mean buffering
/// entries indefinitely with no clear place to report the eventual failure.
#[derive(Clone)]
pub struct Writer {
    entries: mpsc::Sender<JournalEntry>,
}

impl Writer {
    /// Start the consumer task writing into `directory`, creating it if necessary.
    pub fn start(directory: PathBuf, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<JournalEntry>(queue_capacity);

        tokio::spawn(async move {
            if let Err(source) = tokio::fs::create_dir_all(&directory).await {
                error!(%source, path = %directory.display(), "failed to create journal directory");
            }

            while let Some(entry) = rx.recv().await {
                let path = directory.join(entry.timestamp.date().journal_filename());
                if let Err(source) = append_line(&path, &entry.to_line()).await {
                    error!(%source, path = %path.display(), "failed to append journal entry");
                }
            }
        });

        Self { entries: tx }
    }

    /// Queue an entry for appending. Returns once the entry has been handed to the
    /// writer task, not once it has actually reached disk.
    #[instrument(name = "Writer::append", skip(self, entry), fields(location = %entry.location))]
    pub async fn append(&self, entry: JournalEntry) {
        if self.entries.send(entry).await.is_err() {
            error!("journal writer task is no longer running");
        }
    }
}

async fn append_line(path: &std::path::Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;
    use attendance_core::{Address, Location, Person, Timestamp};

    fn entry() -> JournalEntry {
        JournalEntry {
            timestamp: Timestamp::new(2021, 10, 15, 9, 0, 0),
            session_id: "abc1234567".into(),
            action: Action::Login,
            person: Person {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                address: Address {
                    street: "Elm Street".into(),
                    number: "12".into(),
                    zip_code: "9000".into(),
                    city: "Ghent".into(),
                },
            },
            location: Location::from("bakery-main"),
        }
    }

    #[tokio::test]
    async fn appended_entries_land_in_the_days_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::start(dir.path().to_owned(), 8);

        writer.append(entry()).await;
        // give the consumer task a chance to run
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let content = tokio::fs::read_to_string(dir.path().join("2021-10-15.journal"))
            .await
            .unwrap();
        assert!(content.contains("bakery-main"));
        assert!(content.contains("Jane"));
    }
}
