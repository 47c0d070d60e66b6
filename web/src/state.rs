use attendance_core::{Locations, TokenEngine};
use attendance_session::Manager as SessionManager;
use std::ops::Deref;
use std::sync::Arc;
use url::Url;

pub(crate) struct Inner {
    pub engine: Arc<TokenEngine>,
    pub sessions: SessionManager,
    pub locations: Arc<Locations>,
    pub secret: String,
    pub login_base_url: Url,
}

/// Everything a request handler needs, shared between the QR listener and the login
/// listener since they read from the same token engine and session manager. The
/// session manager owns the journal writer itself, so handlers never touch it
/// directly — every check-in or check-out already journals as part of the command.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

impl AppState {
    pub fn new(
        engine: Arc<TokenEngine>,
        sessions: SessionManager,
        locations: Arc<Locations>,
        secret: String,
        login_base_url: Url,
    ) -> Self {
        Self(Arc::new(Inner {
            engine,
            sessions,
            locations,
            secret,
            login_base_url,
        }))
    }
}

impl Deref for AppState {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
