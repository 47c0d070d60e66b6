use attendance_core::Person;
use attendance_journal::JournalEntry;
use eyre::{bail, eyre};
use std::collections::HashSet;

/// Resolve a comma-separated query like `"Jane,Ghent"` to the single person it
/// identifies in a day's journal: every token must match one of the person's first
/// name, last name, street, number, zip code or city.
///
/// Fails if no one matches every token, or if more than one distinct person does — per
/// §6, the subcommand must fail rather than silently pick a match.
pub fn resolve(entries: &[JournalEntry], query: &str) -> eyre::Result<Person> {
    let tokens: Vec<&str> = query.split(',').map(str::trim).filter(|token| !token.is_empty()).collect();
    if tokens.is_empty() {
        bail!("person query must not be empty");
    }

    let mut matches: HashSet<&Person> = HashSet::new();
    for entry in entries {
        if tokens.iter().all(|token| entry.person.matches_token(token)) {
            matches.insert(&entry.person);
        }
    }

    match matches.len() {
        0 => Err(eyre!("no person in the journal matches query {query:?}")),
        1 => Ok(matches.into_iter().next().expect("checked len == 1").clone()),
        n => {
            let names: Vec<String> = matches
                .iter()
                .map(|person| format!("{} {}", person.first_name, person.last_name))
                .collect();
            Err(eyre!("query {query:?} is ambiguous, matches {n} people: {}", names.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::{Address, Location, Timestamp};
    use attendance_journal::Action;

    fn entry(first: &str, last: &str, city: &str, session_id: &str) -> JournalEntry {
        JournalEntry {
            timestamp: Timestamp::new(2021, 10, 15, 9, 0, 0),
            session_id: session_id.into(),
            action: Action::Login,
            location: Location::from("bakery"),
            person: Person {
                first_name: first.into(),
                last_name: last.into(),
                address: Address {
                    street: "Elm Street".into(),
                    number: "1".into(),
                    zip_code: "9000".into(),
                    city: city.into(),
                },
            },
        }
    }

    #[test]
    fn resolves_a_unique_match() {
        let entries = vec![entry("Jane", "Doe", "Ghent", "s1"), entry("John", "Doe", "Bruges", "s2")];
        let person = resolve(&entries, "Jane,Ghent").unwrap();
        assert_eq!(person.first_name, "Jane");
    }

    #[test]
    fn rejects_an_ambiguous_query() {
        let entries = vec![entry("Jane", "Doe", "Ghent", "s1"), entry("Jane", "Smith", "Ghent", "s2")];
        let error = resolve(&entries, "Jane,Ghent").unwrap_err();
        assert!(error.to_string().contains("ambiguous"));
    }

    #[test]
    fn rejects_no_match() {
        let entries = vec![entry("Jane", "Doe", "Ghent", "s1")];
        assert!(resolve(&entries, "Nobody").is_err());
    }
}
