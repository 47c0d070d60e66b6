use attendance_core::{IdGenerator, Locations, TokenEngine};
use attendance_journal::Writer as JournalWriter;
use attendance_session::Manager as SessionManager;
use attendance_web::AppState;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use clap::Parser;
use eyre::WrapErr;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, Level};
use url::Url;

/// Length, in hex characters, of access token and session ids. Not itself configurable:
/// §4.B only requires `idLength >= 8` for collisions to be astronomically improbable,
/// and the wire formats in §6 fix the token id at 10 characters.
const TOKEN_ID_LENGTH: usize = 10;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    common::dotenv()?;

    let config = Config::parse();
    common::logging::init(config.log_level)?;

    let locations = Arc::new(
        Locations::load(&config.locations_file)
            .await
            .wrap_err("failed to load locations registry")?,
    );
    info!(count = locations.len(), "loaded locations registry");

    let id_generator = Arc::new(IdGenerator::start(config.max_concurrent_requests, TOKEN_ID_LENGTH));
    let engine = TokenEngine::start(
        Arc::clone(&locations),
        Arc::clone(&id_generator),
        config.login_base_url.clone(),
        Duration::from_secs(config.rotation_seconds),
    );

    let journal = JournalWriter::start(config.journal_dir.clone(), config.max_concurrent_requests);
    let sessions = SessionManager::start(
        journal,
        id_generator,
        config.secret.clone(),
        config.max_concurrent_requests,
    );

    let state = AppState::new(engine, sessions, locations, config.secret.clone(), config.login_base_url.clone());
    let login_path = config.login_base_url.path().to_owned();

    let tls_config = RustlsConfig::from_pem_file(&config.tls_cert, &config.tls_key)
        .await
        .wrap_err("failed to load TLS certificate")?;

    let qr_handle = Handle::new();
    let login_handle = Handle::new();

    let qr_server = axum_server::bind_rustls(config.qr_address, tls_config.clone())
        .handle(qr_handle.clone())
        .serve(attendance_web::qr_router(state.clone()).into_make_service());

    let login_server = axum_server::bind_rustls(config.login_address, tls_config)
        .handle(login_handle.clone())
        .serve(attendance_web::login_router(state, &login_path).into_make_service());

    info!(qr = %config.qr_address, login = %config.login_address, "listening and ready to handle requests");

    tokio::spawn(shutdown_on_signal(qr_handle, login_handle));

    tokio::try_join!(qr_server, login_server).wrap_err("server failed")?;

    info!("goodbye! o/");
    Ok(())
}

/// Wait for SIGINT (ctrl+c) or SIGTERM, then give both listeners a chance to finish
/// in-flight requests before shutting down.
async fn shutdown_on_signal(qr_handle: Handle, login_handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl+c handler")
    };
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
    qr_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    login_handle.graceful_shutdown(Some(Duration::from_secs(10)));
}

/// The location-attendance tracing service
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Config {
    /// The address the QR-display listener binds to
    #[arg(long, default_value = "0.0.0.0:4443", env = "QR_ADDRESS")]
    qr_address: SocketAddr,

    /// The address the login listener binds to
    #[arg(long, default_value = "0.0.0.0:4444", env = "LOGIN_ADDRESS")]
    login_address: SocketAddr,

    /// The publicly accessible URL visitors are redirected to after scanning a QR code
    #[arg(long, env = "LOGIN_BASE_URL")]
    login_base_url: Url,

    /// Path to the XML file listing every known location
    #[arg(long, env = "LOCATIONS_FILE")]
    locations_file: PathBuf,

    /// Directory the per-day journal files are appended to
    #[arg(long, default_value = "./journal", env = "JOURNAL_DIR")]
    journal_dir: PathBuf,

    /// TLS certificate shared by both listeners
    #[arg(long, env = "TLS_CERT")]
    tls_cert: PathBuf,

    /// TLS private key shared by both listeners
    #[arg(long, env = "TLS_KEY")]
    tls_key: PathBuf,

    /// Secret the token engine and session cookies are hashed with
    #[arg(long, env = "TOKEN_SECRET")]
    secret: String,

    /// How often, in seconds, each location's access token rotates
    #[arg(long, default_value_t = 60, env = "ROTATION_SECONDS")]
    rotation_seconds: u64,

    /// Bounds the session and journal command queues, and the id generator's buffer
    #[arg(long, default_value_t = 64, env = "MAX_CONCURRENT_REQUESTS")]
    max_concurrent_requests: usize,

    /// The default level to log at
    #[arg(long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    log_level: Level,
}
