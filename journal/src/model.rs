use attendance_core::{Location, Person, Timestamp};
use std::fmt::{self, Display, Formatter};

/// The two events an attendance journal records, serialized on disk as `0`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Logout,
}

impl Action {
    fn code(self) -> u8 {
        match self {
            Self::Login => 0,
            Self::Logout => 1,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Action {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0" => Ok(Self::Login),
            "1" => Ok(Self::Logout),
            _ => Err(()),
        }
    }
}

/// A single line in a day's journal: one person logging in or out of one location.
///
/// Once written, entries are immutable and are never rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub timestamp: Timestamp,
    pub session_id: String,
    pub action: Action,
    pub location: Location,
    pub person: Person,
}

pub(crate) const FIELD_COUNT: usize = 10;

impl JournalEntry {
    /// Render as the ten comma-joined fields the journal file stores, in the order the
    /// reader expects. No escaping is applied: a comma inside a name or address field
    /// would corrupt parsing. That limitation is inherited rather than fixed here.
    pub(crate) fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            self.timestamp,
            self.session_id,
            self.action,
            self.location,
            self.person.first_name,
            self.person.last_name,
            self.person.address.street,
            self.person.address.number,
            self.person.address.zip_code,
            self.person.address.city,
        )
    }
}
