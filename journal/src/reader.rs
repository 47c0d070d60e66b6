use crate::model::{Action, JournalEntry, FIELD_COUNT};
use attendance_core::model::{Address, Person};
use attendance_core::{Location, Timestamp};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Read and strictly parse a day's journal file.
///
/// Returns one error on the first malformed line rather than skipping it: a
/// corrupted journal is a data integrity problem the analyzer should stop and
/// report, not silently work around.
pub async fn read(path: impl AsRef<Path>) -> Result<Vec<JournalEntry>, Error> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.display().to_string())
        } else {
            Error::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;

    parse(&content)
}

/// Parse journal lines already read into memory, mainly for tests.
pub fn parse(content: &str) -> Result<Vec<JournalEntry>, Error> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<JournalEntry, Error> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(Error::Malformed {
            line: line.to_owned(),
            reason: format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        });
    }

    let [timestamp, session_id, action, location, first_name, last_name, street, number, zip_code, city] =
        fields.try_into().expect("length checked above");

    let timestamp = Timestamp::parse(timestamp).map_err(|_| Error::Malformed {
        line: line.to_owned(),
        reason: "invalid timestamp".into(),
    })?;
    let action = Action::from_str(action).map_err(|_| Error::Malformed {
        line: line.to_owned(),
        reason: format!("unknown event code {action:?}"),
    })?;

    Ok(JournalEntry {
        timestamp,
        session_id: session_id.to_owned(),
        action,
        location: Location::from(location),
        person: Person {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            address: Address {
                street: street.to_owned(),
                number: number.to_owned(),
                zip_code: zip_code.to_owned(),
                city: city.to_owned(),
            },
        },
    })
}

#[derive(Debug)]
pub enum Error {
    NotFound(String),
    Io { path: String, source: std::io::Error },
    Malformed { line: String, reason: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "no journal file at {path:?}"),
            Self::Io { path, source } => write!(f, "failed to read journal file {path:?}: {source}"),
            Self::Malformed { line, reason } => write!(f, "malformed journal line ({reason}): {line:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotFound(_) | Self::Malformed { .. } => None,
        }
    }
}
