mod error;
mod login;
mod state;
mod token_api;

pub use state::AppState;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Router for the QR-display listener: each location's page and the token API scanners
/// and operators poll.
pub fn qr_router(state: AppState) -> Router<()> {
    Router::new()
        .route("/api/tokens", get(token_api::tokens))
        .route("/:location", get(token_api::location_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the login listener: the page a visitor lands on after scanning a QR code,
/// mounted at `path` (the path component of the configured login URL, so the QR-embedded
/// link and the route that serves it always agree).
pub fn login_router(state: AppState, path: &str) -> Router<()> {
    Router::new()
        .route(path, get(login::access).post(login::submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::{IdGenerator, Locations, TokenEngine};
    use attendance_journal::Writer as JournalWriter;
    use attendance_session::Manager as SessionManager;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    const REGISTRY: &str = r#"
        <Locations>
            <Location>Bakery</Location>
        </Locations>
    "#;

    async fn harness(dir: &std::path::Path) -> (AppState, Router<()>) {
        let locations = Arc::new(Locations::parse(REGISTRY).unwrap());
        let id_generator = Arc::new(IdGenerator::start(4, 10));
        let login_url = Url::parse("https://login.example/login").unwrap();
        let engine = TokenEngine::start(
            Arc::clone(&locations),
            Arc::clone(&id_generator),
            login_url.clone(),
            Duration::from_secs(60),
        );

        // let the engine complete one tick so a current token exists
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;

        let journal = JournalWriter::start(dir.to_owned(), 8);
        let sessions = SessionManager::start(journal, id_generator, "secret".into(), 8);
        let state = AppState::new(engine, sessions, locations, "secret".into(), login_url);
        let router = login_router(state.clone(), "/login");
        (state, router)
    }

    fn set_cookie_value(response: &axum::http::Response<Body>) -> String {
        let raw = response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .expect("login response should set the user cookie")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_owned()
    }

    #[tokio::test(start_paused = true)]
    async fn login_then_logout_round_trips_through_the_same_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let (state, router) = harness(dir.path()).await;
        let token = state
            .engine
            .get_current_for_location(&attendance_core::Location::from("Bakery"))
            .unwrap();

        let form = format!(
            "token_id={}&location=Bakery&first_name=Jane&last_name=Doe&street=Elm+Street&number=12&zip_code=9000&city=Ghent",
            token.id
        );
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(axum::http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie_value(&response);

        // give the session manager's consumer task a moment to process the check-in
        tokio::task::yield_now().await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/login?token={}", token.id))
                    .header(axum::http::header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("checked out"), "expected a logout confirmation, got: {body}");

        tokio::time::sleep(Duration::from_millis(10)).await;
        let today = attendance_core::Timestamp::now().date().journal_filename();
        let content = tokio::fs::read_to_string(dir.path().join(today)).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",0,Bakery,Jane,Doe,"));
        assert!(lines[1].contains(",1,Bakery,Jane,Doe,"));
    }

    #[tokio::test(start_paused = true)]
    async fn posting_a_token_for_the_wrong_location_is_access_denied() {
        let dir = tempfile::tempdir().unwrap();
        let (state, router) = harness(dir.path()).await;
        let token = state
            .engine
            .get_current_for_location(&attendance_core::Location::from("Bakery"))
            .unwrap();

        let form = format!(
            "token_id={}&location=Somewhere+Else&first_name=Jane&last_name=Doe&street=Elm+Street&number=12&zip_code=9000&city=Ghent",
            token.id
        );
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(axum::http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
