mod app;
mod handlers;
mod state;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use auth0_sample_auth::{AuthConfig, AuthState, SessionStore};
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{app::create_app, state::AppState};

/// Auth0 Sample - Sign users in with Auth0
#[derive(Parser, Debug)]
#[command(name = "auth0_sample")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Port of the local mock Auth0 tenant
    #[cfg(feature = "mock")]
    #[arg(long, default_value = "3001", env = "MOCK_IDP_PORT")]
    mock_idp_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "auth0_sample=debug,auth0_sample_auth=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli)?;
    tracing::info!(
        realm = %config.auth0.realm,
        callback_url = %config.callback_url,
        "Auth0 configured"
    );

    #[cfg(feature = "mock")]
    spawn_mock_idp(cli.mock_idp_port);

    let sessions = SessionStore::new();
    spawn_session_sweeper(sessions.clone());

    let auth = AuthState::new(Arc::new(sessions), config)?;
    let app = create_app(AppState::new(auth));

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Load the auth configuration from the environment.
///
/// `AUTH_BASE_URL` defaults to the local listen port. With the `mock` feature
/// the Auth0 keys default to the local mock tenant.
fn load_config(cli: &Cli) -> Result<AuthConfig> {
    let base_url = format!("http://localhost:{}", cli.port);
    #[cfg(feature = "mock")]
    let mock_realm = format!("http://localhost:{}", cli.mock_idp_port);

    let config = AuthConfig::from_lookup(|key| {
        let value = std::env::var(key).ok();
        match key {
            "AUTH_BASE_URL" => value.or_else(|| Some(base_url.clone())),
            #[cfg(feature = "mock")]
            "AUTH0_APP_ID" => value.or_else(|| Some("mock-client".to_string())),
            #[cfg(feature = "mock")]
            "AUTH0_APP_SECRET" => value.or_else(|| Some("mock-secret".to_string())),
            #[cfg(feature = "mock")]
            "AUTH0_REALM" => value.or_else(|| Some(mock_realm.clone())),
            #[cfg(feature = "mock")]
            "COOKIE_SECURE" => value.or_else(|| Some("false".to_string())),
            _ => value,
        }
    })?;

    Ok(config)
}

/// Periodically drop expired sessions so abandoned logins don't pile up.
fn spawn_session_sweeper(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(10 * 60));
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired(chrono::Utc::now()).await;
            if removed > 0 {
                tracing::debug!(removed, "Swept expired sessions");
            }
        }
    });
}

#[cfg(feature = "mock")]
fn spawn_mock_idp(port: u16) {
    use auth0_sample_auth::mock_idp::MockIdpServer;

    tokio::spawn(async move {
        if let Err(e) = MockIdpServer::new(port).run().await {
            tracing::error!(error = %e, "Mock IdP server failed");
        }
    });
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
