use crate::query::{AttendanceEntry, Contact};
use attendance_core::Location;
use std::io::Write;

/// Something that can be projected onto a CSV table: a header row plus a stream of
/// data rows. The query outputs (attendance rosters, contact lists, visited-location
/// sets) all implement this so the analyzer can write any of them the same way.
pub trait Convertible {
    fn header() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl Convertible for Location {
    fn header() -> Vec<&'static str> {
        vec!["location"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.as_str().to_owned()]
    }
}

impl Convertible for AttendanceEntry {
    fn header() -> Vec<&'static str> {
        vec!["first_name", "last_name", "login", "logout"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.person.first_name.clone(),
            self.person.last_name.clone(),
            self.login.to_string(),
            self.logout.to_string(),
        ]
    }
}

impl Convertible for Contact {
    fn header() -> Vec<&'static str> {
        vec!["first_name", "last_name", "location", "start", "end", "duration_seconds"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.person.first_name.clone(),
            self.person.last_name.clone(),
            self.location.to_string(),
            self.start.to_string(),
            self.end.to_string(),
            self.duration().num_seconds().to_string(),
        ]
    }
}

/// Write a header row followed by one row per item. Uses `csv::Writer`'s built-in
/// quoting rather than raw comma joins — unlike the journal's own on-disk format (a
/// fixed field count that never needs it), a CSV export can legitimately contain a
/// location or address field with a comma in it.
pub fn write<T: Convertible>(items: &[T], out: impl Write) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(T::header())?;
    for item in items {
        writer.write_record(item.row())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::{Address, Person, Timestamp};

    #[test]
    fn writes_header_then_one_row_per_item() {
        let attendances = vec![AttendanceEntry {
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
            login: Timestamp::new(2021, 10, 15, 9, 0, 0),
            logout: Timestamp::new(2021, 10, 15, 9, 30, 0),
        }];

        let mut buffer = Vec::new();
        write(&attendances, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.starts_with("first_name,last_name,login,logout"));
        assert!(output.contains("Jane,Doe"));
    }

    #[test]
    fn quotes_fields_containing_a_comma() {
        let locations = vec![Location::from("Ghent, Belgium")];
        let mut buffer = Vec::new();
        write(&locations, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"Ghent, Belgium\""));
    }
}
