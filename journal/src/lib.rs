pub mod csv;
pub mod model;
pub mod query;
pub mod reader;
pub mod writer;

pub use model::{Action, JournalEntry};
pub use query::{attendance_for_location, contacts_for_person, visited_locations, AttendanceEntry, Contact};
pub use writer::Writer;
