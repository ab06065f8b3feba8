//! Component wiring: configuration, persistence, the Hub Coordinator, and
//! the HTTP/WebSocket listener.
//!
//! Load configuration, bring up storage, wire the long-lived components,
//! then bind the listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use classroom_config::Config;
use classroom_registry::{ConnectionRegistry, RateLimiter};
use classroom_storage::{Database, PersistenceWriter, StorageReader};
use classroom_telemetry::logging::{config_from_parts, setup_logging};

use crate::rest;
use crate::state::AppState;
use crate::ws::ws_upgrade;

const RATE_LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Everything running after [`run`] binds its listener: the bound address,
/// the serve future, and the background handles to tear down on shutdown.
pub struct RunningServer {
    /// The address actually bound (useful when `http.port` is `0`).
    pub local_addr: SocketAddr,
    /// Resolves once the HTTP/WS listener stops accepting connections.
    pub serve: JoinHandle<std::io::Result<()>>,
    hub_handle: JoinHandle<()>,
    writer_handle: JoinHandle<()>,
    sweep_handle: JoinHandle<()>,
    writer: PersistenceWriter,
    hub: classroom_hub::HubHandle,
}

impl RunningServer {
    /// Runs until either `Ctrl-C` is received or the listener itself stops,
    /// then tears every background component down in order: the Hub
    /// Coordinator first, then the persistence worker, draining its queue.
    /// The rate-limiter sweep task is simply aborted; it holds no state
    /// worth draining.
    pub async fn wait_for_shutdown(self) -> std::io::Result<()> {
        let RunningServer {
            serve,
            hub_handle,
            writer_handle,
            sweep_handle,
            writer,
            hub,
            ..
        } = self;

        let result = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received ctrl-c, shutting down");
                Ok(())
            },
            joined = serve => match joined {
                Ok(inner) => inner,
                Err(err) => Err(std::io::Error::other(err.to_string())),
            },
        };

        sweep_handle.abort();
        hub.stop();
        if let Err(err) = hub_handle.await {
            tracing::warn!(error = %err, "hub coordinator task panicked");
        }
        drop(writer);
        if let Err(err) = writer_handle.await {
            tracing::warn!(error = %err, "persistence writer task panicked");
        }

        result
    }
}

/// Loads configuration, installs logging, wires every component, and binds
/// the HTTP/WebSocket listener. Returns once the listener is bound and
/// accepting; the returned [`RunningServer::serve`] handle resolves when
/// the server itself stops.
///
/// `config_path`, when given, is loaded hermetically via
/// [`Config::load_file`] instead of the default file > env > defaults
/// discovery chain.
///
/// # Errors
///
/// Returns an error if configuration fails to load or validate, the
/// embedded store cannot be opened, or the listener cannot bind.
pub async fn run(config_path: Option<&std::path::Path>) -> anyhow::Result<RunningServer> {
    let config = match config_path {
        Some(path) => Config::load_file(path)?,
        None => Config::load()?,
    };

    let log_config = config_from_parts(
        &config.log.level,
        &config.log.format,
        &config.log.target,
        &config.log.directory,
    );
    if let Err(err) = setup_logging(&log_config) {
        eprintln!("failed to initialize logging: {err}");
    }

    info!(host = %config.http.host, port = config.http.port, "starting classroom hub");

    let db = Arc::new(Database::connect_embedded(&config.db.path).await?);
    let reader = Arc::new(StorageReader::new(Arc::clone(&db)));

    let active_sessions = reader.list_active_sessions().await?;
    info!(count = active_sessions.len(), "rehydrated active sessions");
    let session_cache = Arc::new(classroom_registry::SessionCache::from_active_sessions(active_sessions));

    let (writer, writer_handle) = PersistenceWriter::spawn(Arc::clone(&db));
    let registry = Arc::new(ConnectionRegistry::new());
    let rate_limiter = Arc::new(RateLimiter::new());

    let (hub, hub_handle) = classroom_hub::spawn(
        Arc::clone(&registry),
        Arc::clone(&rate_limiter),
        writer.clone(),
    );

    let sweep_handle = tokio::spawn(sweep_rate_limiter(Arc::clone(&rate_limiter)));

    let state = AppState {
        hub: hub.clone(),
        registry,
        session_cache,
        writer: writer.clone(),
        reader,
        rate_limiter,
        started_at: Instant::now(),
    };

    let router = build_router(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.http.write_timeout_secs,
    )));

    let listener = TcpListener::bind((config.http.host.as_str(), config.http.port)).await?;
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "listening");

    let serve = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await
    });

    Ok(RunningServer {
        local_addr,
        serve,
        hub_handle,
        writer_handle,
        sweep_handle,
        writer,
        hub,
    })
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(rest::health::health))
        .route(
            "/api/sessions",
            get(rest::sessions::list_active_sessions).post(rest::sessions::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(rest::sessions::get_session).delete(rest::sessions::end_session),
        )
        .route("/ws", get(ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn sweep_rate_limiter(rate_limiter: Arc<RateLimiter>) {
    let mut ticker = tokio::time::interval(RATE_LIMITER_SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        rate_limiter.sweep();
    }
}
