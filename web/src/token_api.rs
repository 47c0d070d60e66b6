use crate::error::{Error, Result};
use crate::state::AppState;
use attendance_core::{qr_payload_base64, AccessToken};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub(crate) struct TokensQuery {
    location: Option<String>,
}

/// The wire shape of an `AccessToken`, per §6's Token JSON — short field names, unix
/// timestamps, the QR payload inlined as base64 PNG rather than the raw bytes the
/// engine holds.
#[derive(Serialize)]
struct TokenDto {
    id: String,
    iat: i64,
    exp: i64,
    valid: u32,
    loc: String,
    qr: String,
}

impl From<&AccessToken> for TokenDto {
    fn from(token: &AccessToken) -> Self {
        Self {
            id: token.id.clone(),
            iat: token.issued_at.unix_timestamp(),
            exp: token.expires_at.unix_timestamp(),
            valid: token.valid_remaining,
            loc: token.location.to_string(),
            qr: qr_payload_base64(token),
        }
    }
}

/// `GET /api/tokens[?location=...]`
///
/// With a `location` query parameter, returns the single currently active token for
/// that location, or `{"err":"..."}` if none exists. Without one, returns every token
/// valid anywhere right now.
#[instrument(name = "token_api::tokens", skip(state))]
pub(crate) async fn tokens(State(state): State<AppState>, Query(query): Query<TokensQuery>) -> Result<Json<serde_json::Value>> {
    match query.location {
        Some(name) => {
            let location = state.locations.get(&name).ok_or(Error::NotFound)?;
            let token = state.engine.get_current_for_location(location).ok_or(Error::NotFound)?;
            Ok(Json(serde_json::to_value(TokenDto::from(&token)).expect("TokenDto always serializes")))
        }
        None => {
            let tokens: Vec<TokenDto> = state.engine.get_all().iter().map(TokenDto::from).collect();
            Ok(Json(serde_json::to_value(tokens).expect("TokenDto always serializes")))
        }
    }
}

/// `GET /<locationName>` — a minimal page showing the location's current QR code,
/// refreshed by the caller on the rotation cadence. Unregistered locations and a
/// momentary no-current-token window (see §4.E) both render the 404 HTML page, not a
/// JSON error — this route is for a browser, not the token API.
#[instrument(name = "token_api::location_page", skip(state))]
pub(crate) async fn location_page(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(location) = state.locations.get(&name) else {
        return Error::NotFound.into_html();
    };
    let Some(token) = state.engine.get_current_for_location(location) else {
        return Error::NotFound.into_html();
    };

    let mut login_url = state.login_base_url.clone();
    login_url.query_pairs_mut().append_pair("token", &token.id);

    Html(format!(
        "<!doctype html><html><head><title>{name}</title></head><body>\
         <h1>{name}</h1>\
         <img src=\"data:image/png;base64,{qr}\" alt=\"Scan to check in\"/>\
         <p><a href=\"{url}\">{url}</a></p>\
         </body></html>",
        name = html_escape(location.as_str()),
        qr = qr_payload_base64(&token),
        url = login_url,
    ))
    .into_response()
}

fn html_escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
