use crate::error::Error;
use crate::state::AppState;
use attendance_core::{Address, Location, Person};
use attendance_session::UserCookie;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::instrument;

const COOKIE_NAME: &str = "user";

#[derive(Debug, Deserialize)]
pub(crate) struct TokenQuery {
    token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    token_id: String,
    location: String,
    first_name: String,
    last_name: String,
    street: String,
    number: String,
    zip_code: String,
    city: String,
}

/// A cookie the caller presented that both decodes and matches `secret`. An absent,
/// garbled, or tampered cookie is treated identically to no cookie at all — the
/// protocol in §4.F never distinguishes them, it just falls back to the empty form.
fn valid_cookie(jar: &CookieJar, secret: &str) -> Option<UserCookie> {
    let raw = jar.get(COOKIE_NAME)?;
    let cookie = UserCookie::decode(raw.value()).ok()?;
    cookie.is_valid(secret).then_some(cookie)
}

/// `GET ?token=<id>`
///
/// No cookie (or an invalid one) shows the empty form. A valid cookie with an open
/// session at this same location is a logout: close it and show the confirmation page.
/// A valid cookie with no session, or one open somewhere else, shows the form
/// pre-filled from the cookie's person so a returning visitor doesn't retype it.
#[instrument(name = "login::access", skip(state, jar))]
pub(crate) async fn access(State(state): State<AppState>, Query(query): Query<TokenQuery>, jar: CookieJar) -> Response {
    let token = match state.engine.get_by_id(&query.token) {
        Some(token) => token,
        None => return Error::AccessDenied.into_html(),
    };

    let Some(user_cookie) = valid_cookie(&jar, &state.secret) else {
        return Html(empty_form_page(&token.location, &query.token)).into_response();
    };

    let open = state.sessions.get(user_cookie.session_key());
    let same_location = open.as_ref().is_some_and(|session| session.location == token.location);

    if same_location {
        state.sessions.check_out(user_cookie.person.clone()).await;
        return (
            jar.remove(COOKIE_NAME),
            Html("<p>You have been checked out. Thanks for visiting!</p>"),
        )
            .into_response();
    }

    Html(prefilled_form_page(&token.location, &query.token, &user_cookie.person)).into_response()
}

/// `POST` with the login form.
///
/// Validates the form is complete, that `tokenId` resolves and its location matches the
/// posted `location` (an attacker could otherwise post a stale or foreign token id
/// alongside any location string), mints the cookie, and hands the check-in to the
/// session manager — which closes any prior session for this person before opening the
/// new one, atomically with both journal entries.
#[instrument(name = "login::submit", skip(state, form))]
pub(crate) async fn submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if [
        &form.first_name,
        &form.last_name,
        &form.street,
        &form.number,
        &form.zip_code,
        &form.city,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return Error::Malformed.into_html();
    }

    let token = match state.engine.get_by_id(&form.token_id) {
        Some(token) => token,
        None => return Error::AccessDenied.into_html(),
    };

    let location = Location::from(form.location.as_str());
    if token.location != location {
        return Error::AccessDenied.into_html();
    }

    let person = Person {
        first_name: form.first_name,
        last_name: form.last_name,
        address: Address {
            street: form.street,
            number: form.number,
            zip_code: form.zip_code,
            city: form.city,
        },
    };

    let cookie = match UserCookie::new(person.clone(), &state.secret) {
        Ok(cookie) => cookie,
        Err(_) => return Error::Malformed.into_html(),
    };
    let encoded = match cookie.encode() {
        Ok(encoded) => encoded,
        Err(_) => return Error::Malformed.into_html(),
    };

    state.sessions.check_in(person, location).await;

    let response_cookie = axum_extra::extract::cookie::Cookie::build(COOKIE_NAME, encoded)
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .path("/")
        .finish();

    let jar = CookieJar::new().add(response_cookie);
    (jar, Html("<p>You're checked in. Stay safe!</p>")).into_response()
}

fn empty_form_page(location: &Location, token_id: &str) -> String {
    form_page(location, token_id, None)
}

fn prefilled_form_page(location: &Location, token_id: &str, person: &Person) -> String {
    form_page(location, token_id, Some(person))
}

fn form_page(location: &Location, token_id: &str, person: Option<&Person>) -> String {
    let empty = String::new();
    let (first_name, last_name, street, number, zip_code, city) = match person {
        Some(person) => (
            &person.first_name,
            &person.last_name,
            &person.address.street,
            &person.address.number,
            &person.address.zip_code,
            &person.address.city,
        ),
        None => (&empty, &empty, &empty, &empty, &empty, &empty),
    };

    format!(
        "<!doctype html><html><body>\
         <h1>Check in at {location}</h1>\
         <form method=\"post\">\
         <input type=\"hidden\" name=\"token_id\" value=\"{token_id}\"/>\
         <input type=\"hidden\" name=\"location\" value=\"{location}\"/>\
         <input name=\"first_name\" placeholder=\"First name\" value=\"{first_name}\" required/>\
         <input name=\"last_name\" placeholder=\"Last name\" value=\"{last_name}\" required/>\
         <input name=\"street\" placeholder=\"Street\" value=\"{street}\" required/>\
         <input name=\"number\" placeholder=\"Number\" value=\"{number}\" required/>\
         <input name=\"zip_code\" placeholder=\"Zip code\" value=\"{zip_code}\" required/>\
         <input name=\"city\" placeholder=\"City\" value=\"{city}\" required/>\
         <button type=\"submit\">Check in</button>\
         </form></body></html>"
    )
}
