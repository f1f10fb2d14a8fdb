//! HTTP server implementation for the tracking API.
//!
//! Wires the tracking store and the mailer into an axum router and runs it
//! with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vassago_core::Result;
use vassago_mail::Mailer;
use vassago_store::TrackingStore;
use vassago_telemetry::TrackingMetrics;

use crate::handlers::{health, report, send_email, server_status, track_pixel};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SUBJECT: &str = "Email Tracking Test";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Enable CORS.
    pub cors: bool,
    /// Externally reachable base URL used in tracking links.
    pub public_url: String,
    /// Sender address for tracking emails.
    pub sender: String,
    /// Subject line for tracking emails.
    pub subject: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            cors: true,
            public_url: format!("http://localhost:{DEFAULT_PORT}"),
            sender: String::new(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a new server config builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    addr: Option<SocketAddr>,
    cors: Option<bool>,
    public_url: Option<String>,
    sender: Option<String>,
    subject: Option<String>,
}

impl ServerConfigBuilder {
    /// Sets the listen address.
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Sets whether CORS is enabled.
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors = Some(enabled);
        self
    }

    /// Sets the public base URL.
    pub fn public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }

    /// Sets the sender address.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Sets the email subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Builds the server config.
    ///
    /// Without an explicit public URL, links point at `localhost` on the listen port.
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let addr = self.addr.unwrap_or(defaults.addr);
        ServerConfig {
            addr,
            cors: self.cors.unwrap_or(defaults.cors),
            public_url: self
                .public_url
                .unwrap_or_else(|| format!("http://localhost:{}", addr.port())),
            sender: self.sender.unwrap_or(defaults.sender),
            subject: self.subject.unwrap_or(defaults.subject),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Tracking records.
    pub store: Arc<dyn TrackingStore>,
    /// Outbound mail collaborator.
    pub mailer: Arc<dyn Mailer>,
    /// Server configuration.
    pub config: ServerConfig,
    /// Dispatch and open counters.
    pub metrics: TrackingMetrics,
    /// Server start time.
    pub start_time: Instant,
}

impl AppState {
    /// Creates new app state.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn TrackingStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            mailer,
            config,
            metrics: TrackingMetrics::new(),
            start_time: Instant::now(),
        }
    }
}

/// Builds the API router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = state.config.cors;

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/status", get(server_status))
        .route("/track/{pixel_id}", get(track_pixel))
        .route("/send-email", post(send_email))
        .route("/report/{email}", get(report))
        .with_state(state);

    router = router.layer(TraceLayer::new_for_http());

    if cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

/// The HTTP server.
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Creates a new server over the given store and mailer.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn TrackingStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let state = Arc::new(AppState::new(config.clone(), store, mailer));
        Self { config, state }
    }

    /// Runs the server until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(self) -> Result<()> {
        if self.config.sender.is_empty() {
            tracing::warn!("No sender address configured; every send will fail");
        }

        let router = router(Arc::clone(&self.state));

        tracing::info!(
            addr = %self.config.addr,
            public_url = %self.config.public_url,
            "Starting Vassago server"
        );

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;

        eprintln!(
            "\n\x1b[32m✓\x1b[0m Server listening on http://{}",
            self.config.addr
        );
        eprintln!("  Tracking links point at {}", self.config.public_url);
        eprintln!("  Press Ctrl+C to stop\n");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        eprintln!("\x1b[32m✓\x1b[0m Server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            eprintln!("\n\x1b[33m⚡\x1b[0m Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            eprintln!("\n\x1b[33m⚡\x1b[0m Received SIGTERM, shutting down gracefully...");
        },
    }
}
