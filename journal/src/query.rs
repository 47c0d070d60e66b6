use crate::model::{Action, JournalEntry};
use attendance_core::{Date, Location, Person, Timestamp};
use std::collections::HashSet;

/// Q1: the set of locations a person visited over a day's journal.
///
/// Order is unspecified and duplicates are coalesced, matching spec §4.H: this is a
/// pure set membership question, not a timeline.
pub fn visited_locations(person: &Person, entries: &[JournalEntry]) -> HashSet<Location> {
    entries
        .iter()
        .filter(|entry| &entry.person == person)
        .map(|entry| entry.location.clone())
        .collect()
}

/// One entry in a location's attendance roster for a day: a person's login and (if
/// they had logged out again by the end of the journal) logout times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub person: Person,
    pub login: Timestamp,
    pub logout: Timestamp,
}

/// Q2: everyone who visited `location` over a day's journal, and when.
///
/// Folds entries keyed by session id: a Login opens an entry with `logout` set to the
/// invalid sentinel; a matching Logout fills it in. A Logout whose session was never
/// opened in this journal (its Login fell on a previous day) is ignored rather than
/// synthesizing a phantom entry. The result is sorted ascending by login, with ties
/// broken by insertion order (a stable sort gives us that for free).
pub fn attendance_for_location(location: &Location, entries: &[JournalEntry]) -> Vec<AttendanceEntry> {
    let mut sessions: Vec<(String, AttendanceEntry)> = Vec::new();

    for entry in entries {
        if &entry.location != location {
            continue;
        }
        match entry.action {
            Action::Login => sessions.push((
                entry.session_id.clone(),
                AttendanceEntry {
                    person: entry.person.clone(),
                    login: entry.timestamp,
                    logout: Timestamp::invalid(),
                },
            )),
            Action::Logout => {
                if let Some((_, attendance)) = sessions.iter_mut().find(|(id, _)| id == &entry.session_id) {
                    attendance.logout = entry.timestamp;
                }
            }
        }
    }

    let mut roster: Vec<AttendanceEntry> = sessions.into_iter().map(|(_, attendance)| attendance).collect();
    roster.sort_by_key(|attendance| attendance.login);
    roster
}

/// A period of overlapping presence between the target person and someone else at a
/// single location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub person: Person,
    pub location: Location,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Contact {
    pub fn duration(&self) -> chrono::Duration {
        self.start.duration_until(self.end)
    }
}

/// Q3: every contact the target person had with someone else over a day's journal.
///
/// Ported from the interval-overlap algorithm the original service used
/// (`GetContactsForPerson`): a linear scan over the chronological journal maintaining
/// two maps of currently-open sessions. `global` holds every open session anywhere
/// that is not at the target's current location; `local` holds open sessions at the
/// target's current location that started after the target's own most recent login.
/// The split exists because a co-presence that began before the target arrived needs
/// the target's own login instant as its interval's lower bound, while one that began
/// after needs the other person's login instant — `local` captures exactly that case.
pub fn contacts_for_person(target: &Person, entries: &[JournalEntry], date: Date) -> Vec<Contact> {
    let mut global: std::collections::HashMap<String, JournalEntry> = std::collections::HashMap::new();
    let mut local: std::collections::HashMap<String, JournalEntry> = std::collections::HashMap::new();
    let mut target_start = Timestamp::invalid();
    let mut target_location: Option<Location> = None;
    let mut contacts = Vec::new();

    for entry in entries {
        if &entry.person != target {
            let target_here = target_start != Timestamp::invalid() && target_location.as_ref() == Some(&entry.location);

            match entry.action {
                Action::Login => {
                    if target_here {
                        local.insert(entry.session_id.clone(), entry.clone());
                    } else {
                        global.insert(entry.session_id.clone(), entry.clone());
                    }
                }
                Action::Logout => {
                    if target_here {
                        if let Some(opened) = local.remove(&entry.session_id) {
                            contacts.push(Contact {
                                person: opened.person,
                                location: entry.location.clone(),
                                start: opened.timestamp,
                                end: entry.timestamp,
                            });
                        } else {
                            contacts.push(Contact {
                                person: entry.person.clone(),
                                location: entry.location.clone(),
                                start: target_start,
                                end: entry.timestamp,
                            });
                        }
                        global.remove(&entry.session_id);
                    } else {
                        global.remove(&entry.session_id);
                    }
                }
            }
            continue;
        }

        match entry.action {
            Action::Login => {
                target_location = Some(entry.location.clone());
                target_start = entry.timestamp;
                local.clear();
            }
            Action::Logout => {
                // The Logout entry itself carries the location the target is leaving,
                // which is authoritative even when no Login for this day ever set
                // `target_location` (the target's session started on a previous day).
                target_departure(
                    entry.timestamp,
                    target_start,
                    Some(&entry.location),
                    date,
                    &mut local,
                    &global,
                    &mut contacts,
                );
                target_start = Timestamp::invalid();
            }
        }
    }

    if target_start != Timestamp::invalid() {
        target_departure(
            date.end_of_day(),
            target_start,
            target_location.as_ref(),
            date,
            &mut local,
            &global,
            &mut contacts,
        );
    }

    contacts
}

/// Emit a contact for every session still open when the target leaves a location,
/// whether they arrived after the target (`local`) or were already present
/// (`global`, filtered to the target's location).
fn target_departure(
    end: Timestamp,
    target_start: Timestamp,
    target_location: Option<&Location>,
    date: Date,
    local: &mut std::collections::HashMap<String, JournalEntry>,
    global: &std::collections::HashMap<String, JournalEntry>,
    contacts: &mut Vec<Contact>,
) {
    let start = if target_start == Timestamp::invalid() {
        date.midnight()
    } else {
        target_start
    };

    for (_, opened) in local.drain() {
        contacts.push(Contact {
            person: opened.person,
            location: opened.location,
            start: opened.timestamp,
            end,
        });
    }

    if let Some(target_location) = target_location {
        for opened in global.values() {
            if &opened.location == target_location {
                contacts.push(Contact {
                    person: opened.person.clone(),
                    location: opened.location.clone(),
                    start,
                    end,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::Address;

    fn person(name: &str) -> Person {
        Person {
            first_name: name.into(),
            last_name: "Doe".into(),
            address: Address {
                street: "Elm Street".into(),
                number: "12".into(),
                zip_code: "9000".into(),
                city: "Ghent".into(),
            },
        }
    }

    fn entry(time: (u32, u32, u32), action: Action, who: &str, session: &str, location: &str) -> JournalEntry {
        JournalEntry {
            timestamp: Timestamp::new(2021, 10, 15, time.0, time.1, time.2),
            session_id: session.into(),
            action,
            location: Location::from(location),
            person: person(who),
        }
    }

    fn date() -> Date {
        Date::new(2021, 10, 15)
    }

    #[test]
    fn visited_locations_coalesces_duplicates() {
        let entries = vec![
            entry((9, 0, 0), Action::Login, "jane", "s1", "bakery"),
            entry((9, 30, 0), Action::Logout, "jane", "s1", "bakery"),
            entry((10, 0, 0), Action::Login, "jane", "s2", "bakery"),
            entry((11, 0, 0), Action::Login, "jane", "s3", "library"),
        ];
        let locations = visited_locations(&person("jane"), &entries);
        assert_eq!(locations.len(), 2);
        assert!(locations.contains(&Location::from("bakery")));
        assert!(locations.contains(&Location::from("library")));
    }

    #[test]
    fn attendance_for_location_only_counts_that_location() {
        let entries = vec![
            entry((9, 0, 0), Action::Login, "jane", "s1", "bakery"),
            entry((9, 5, 0), Action::Login, "john", "s2", "library"),
            entry((9, 30, 0), Action::Logout, "jane", "s1", "bakery"),
        ];
        let roster = attendance_for_location(&Location::from("bakery"), &entries);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].person.first_name, "jane");
        assert_eq!(roster[0].logout, Timestamp::new(2021, 10, 15, 9, 30, 0));
    }

    #[test]
    fn attendance_never_logged_out_keeps_the_invalid_sentinel() {
        let entries = vec![entry((13, 40, 11), Action::Login, "hans", "s1", "bar")];
        let roster = attendance_for_location(&Location::from("bar"), &entries);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].logout, Timestamp::invalid());
    }

    #[test]
    fn attendance_ignores_a_logout_with_no_matching_login() {
        let entries = vec![entry((9, 0, 0), Action::Logout, "jane", "s1", "bakery")];
        assert!(attendance_for_location(&Location::from("bakery"), &entries).is_empty());
    }

    #[test]
    fn attendance_is_sorted_ascending_by_login() {
        let entries = vec![
            entry((17, 32, 45), Action::Login, "otto", "s2", "bar"),
            entry((19, 15, 12), Action::Logout, "otto", "s2", "bar"),
            entry((13, 40, 11), Action::Login, "hans", "s1", "bar"),
        ];
        let roster = attendance_for_location(&Location::from("bar"), &entries);
        assert_eq!(roster[0].person.first_name, "hans");
        assert_eq!(roster[1].person.first_name, "otto");
    }

    #[test]
    fn contacts_capture_a_visitor_fully_engulfed_by_the_targets_visit() {
        let entries = vec![
            entry((9, 0, 0), Action::Login, "target", "s1", "bakery"),
            entry((9, 10, 0), Action::Login, "bystander", "s2", "bakery"),
            entry((9, 20, 0), Action::Logout, "bystander", "s2", "bakery"),
            entry((9, 30, 0), Action::Logout, "target", "s1", "bakery"),
        ];
        let contacts = contacts_for_person(&person("target"), &entries, date());
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].person.first_name, "bystander");
        assert_eq!(contacts[0].start, Timestamp::new(2021, 10, 15, 9, 10, 0));
        assert_eq!(contacts[0].end, Timestamp::new(2021, 10, 15, 9, 20, 0));
    }

    #[test]
    fn contacts_use_target_start_for_a_visitor_already_present_on_arrival() {
        let entries = vec![
            entry((10, 0, 0), Action::Login, "already-there", "s2", "bakery"),
            entry((10, 5, 0), Action::Login, "target", "s1", "bakery"),
            entry((14, 0, 0), Action::Logout, "already-there", "s2", "bakery"),
            entry((15, 0, 0), Action::Logout, "target", "s1", "bakery"),
        ];
        let contacts = contacts_for_person(&person("target"), &entries, date());
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].person.first_name, "already-there");
        assert_eq!(contacts[0].start, Timestamp::new(2021, 10, 15, 10, 5, 0));
        assert_eq!(contacts[0].end, Timestamp::new(2021, 10, 15, 14, 0, 0));
    }

    #[test]
    fn contacts_truncate_at_day_end_when_still_open() {
        let entries = vec![
            entry((19, 0, 0), Action::Login, "target", "s1", "bakery"),
            entry((20, 0, 0), Action::Login, "bystander", "s2", "bakery"),
        ];
        let contacts = contacts_for_person(&person("target"), &entries, date());
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].start, Timestamp::new(2021, 10, 15, 20, 0, 0));
        assert_eq!(contacts[0].end, date().end_of_day());
    }

    #[test]
    fn contacts_use_midnight_when_the_target_departs_without_ever_logging_in() {
        let entries = vec![
            entry((8, 0, 0), Action::Login, "bystander", "s2", "bakery"),
            entry((9, 0, 0), Action::Logout, "target", "s1", "bakery"),
        ];
        let contacts = contacts_for_person(&person("target"), &entries, date());
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].start, date().midnight());
        assert_eq!(contacts[0].end, Timestamp::new(2021, 10, 15, 9, 0, 0));
    }

    #[test]
    fn no_contact_before_the_target_arrives() {
        let entries = vec![
            entry((8, 0, 0), Action::Login, "bystander", "s2", "bakery"),
            entry((8, 30, 0), Action::Logout, "bystander", "s2", "bakery"),
            entry((9, 0, 0), Action::Login, "target", "s1", "bakery"),
            entry((9, 30, 0), Action::Logout, "target", "s1", "bakery"),
        ];
        assert!(contacts_for_person(&person("target"), &entries, date()).is_empty());
    }

    #[test]
    fn no_contact_at_a_different_location() {
        let entries = vec![
            entry((9, 0, 0), Action::Login, "target", "s1", "bakery"),
            entry((9, 5, 0), Action::Login, "elsewhere", "s2", "library"),
            entry((9, 30, 0), Action::Logout, "target", "s1", "bakery"),
        ];
        assert!(contacts_for_person(&person("target"), &entries, date()).is_empty());
    }
}
