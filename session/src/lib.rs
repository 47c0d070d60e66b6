use attendance_core::{hash, IdGenerator, Location, Person, Timestamp};
use attendance_journal::{Action, JournalEntry, Writer as JournalWriter};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

pub mod cookie;

pub use cookie::UserCookie;

/// A visitor currently checked in at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub user_hash: String,
    pub location: Location,
}

/// What happened when a `check_in` command ran: the session it closed, if the visitor
/// was already checked in somewhere, and the session it opened.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub closed: Option<UserSession>,
    pub opened: UserSession,
}

enum Command {
    CheckIn {
        person: Person,
        location: Location,
        reply: oneshot::Sender<CheckIn>,
    },
    CheckOut {
        person: Person,
        reply: oneshot::Sender<Option<UserSession>>,
    },
}

/// Tracks which visitors currently have an open session, and writes the journal
/// entries their opening and closing produce.
///
/// Every mutation goes through a single consumer task draining a bounded channel, so a
/// login and a logout racing for the same person are always applied — and journaled —
/// in the order they were received, and a location switch always journals the Logout
/// before the Login even though both are emitted from the same request. Reads
/// (`get`) go straight to the concurrent map and never wait on the channel.
#[derive(Clone)]
pub struct Manager {
    open_sessions: Arc<DashMap<String, UserSession>>,
    commands: mpsc::Sender<Command>,
}

impl Manager {
    /// Start the consumer task and return a handle shared by every request handler.
    pub fn start(
        journal: JournalWriter,
        id_generator: Arc<IdGenerator>,
        secret: String,
        queue_capacity: usize,
    ) -> Self {
        let open_sessions = Arc::new(DashMap::new());
        let (tx, mut rx) = mpsc::channel::<Command>(queue_capacity);

        let sessions = Arc::clone(&open_sessions);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::CheckIn { person, location, reply } => {
                        let outcome =
                            check_in(&sessions, &journal, &id_generator, &secret, person, location).await;
                        let _ = reply.send(outcome);
                    }
                    Command::CheckOut { person, reply } => {
                        let closed = check_out(&sessions, &journal, &secret, person).await;
                        let _ = reply.send(closed);
                    }
                }
            }
        });

        Self {
            open_sessions,
            commands: tx,
        }
    }

    /// The open session for a person, if any, without going through the command queue.
    pub fn get(&self, person_hash: &str) -> Option<UserSession> {
        self.open_sessions.get(person_hash).map(|entry| entry.value().clone())
    }

    /// OpenSession, composed with an implicit CloseSession first if the person already
    /// had a session open anywhere: closes any prior session (journaling its Logout)
    /// before opening the new one (journaling its Login), both through the same
    /// serialized command so the two entries land in that order even under
    /// concurrent requests for other people.
    #[instrument(name = "Manager::check_in", skip(self, person))]
    pub async fn check_in(&self, person: Person, location: Location) -> Option<CheckIn> {
        let (reply, receiver) = oneshot::channel();
        let command = Command::CheckIn { person, location, reply };
        if self.commands.send(command).await.is_err() {
            return None;
        }
        receiver.await.ok()
    }

    /// CloseSession: closes the open session for a person, if any, journaling its
    /// Logout and returning the session that was closed.
    #[instrument(name = "Manager::check_out", skip(self, person))]
    pub async fn check_out(&self, person: Person) -> Option<UserSession> {
        let (reply, receiver) = oneshot::channel();
        let command = Command::CheckOut { person, reply };
        if self.commands.send(command).await.is_err() {
            return None;
        }
        receiver.await.ok().flatten()
    }
}

async fn check_in(
    sessions: &DashMap<String, UserSession>,
    journal: &JournalWriter,
    id_generator: &IdGenerator,
    secret: &str,
    person: Person,
    location: Location,
) -> CheckIn {
    let person_hash = hash::hash(&person, secret).unwrap_or_default();
    let now = Timestamp::now();

    let closed = sessions.remove(&person_hash).map(|(_, session)| session);
    if let Some(closed) = &closed {
        journal
            .append(JournalEntry {
                timestamp: now,
                session_id: closed.id.clone(),
                action: Action::Logout,
                location: closed.location.clone(),
                person: person.clone(),
            })
            .await;
    }

    let session_id = id_generator.next().await;
    let opened = UserSession {
        id: session_id.clone(),
        user_hash: person_hash.clone(),
        location: location.clone(),
    };
    sessions.insert(person_hash, opened.clone());

    journal
        .append(JournalEntry {
            timestamp: now,
            session_id,
            action: Action::Login,
            location,
            person,
        })
        .await;

    CheckIn { closed, opened }
}

async fn check_out(
    sessions: &DashMap<String, UserSession>,
    journal: &JournalWriter,
    secret: &str,
    person: Person,
) -> Option<UserSession> {
    let person_hash = hash::hash(&person, secret).unwrap_or_default();
    let closed = sessions.remove(&person_hash).map(|(_, session)| session)?;

    journal
        .append(JournalEntry {
            timestamp: Timestamp::now(),
            session_id: closed.id.clone(),
            action: Action::Logout,
            location: closed.location.clone(),
            person,
        })
        .await;

    Some(closed)
}

#[derive(Debug)]
pub enum Error {
    /// The session command queue was not being drained; the manager's task has died.
    QueueClosed,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueClosed => write!(f, "session manager's command queue is closed"),
        }
    }
}

impl std::error::Error for Error {}
