use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors a request handler can return, ranked the way §7 of the design ranks them:
/// each maps to exactly one HTTP status, independent of what produced it.
#[derive(Debug)]
pub(crate) enum Error {
    /// A location, token id, or current-token lookup came back empty.
    NotFound,
    /// The token is absent, unknown, expired, or resolves to a different location than
    /// the one posted alongside it.
    AccessDenied,
    /// The POST body did not contain every required field.
    Malformed,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::AccessDenied => write!(f, "access denied"),
            Self::Malformed => write!(f, "malformed request"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::Malformed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Minimal HTML error page for the human-facing login and QR routes.
    pub(crate) fn into_html(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        (status, Html(format!("<!doctype html><html><body><p>{message}</p></body></html>"))).into_response()
    }
}

#[derive(Serialize)]
struct ApiError {
    err: String,
}

/// For the token API, which reports failure as a JSON body rather than a bare status.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.to_string();
        (status, Json(ApiError { err })).into_response()
    }
}
