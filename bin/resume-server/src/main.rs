//! resume-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Build the upstream model client and the rate limiter.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod extract;
mod middleware;
mod rate_limit;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use resume_agent::AnthropicClient;
use tracing::{info, warn};

use crate::config::Config;
use crate::rate_limit::SlidingWindowLimiter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: RESUME_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), environment = %cfg.environment, "resume-server starting");

    // ── 3. Collaborators ───────────────────────────────────────────────────────
    let api_key = cfg
        .anthropic_api_key
        .clone()
        .context("ANTHROPIC_API_KEY must be set")?;
    let upstream = AnthropicClient::new(api_key)
        .context("failed to build model provider client")?
        .with_base_url(&cfg.anthropic_base_url)
        .with_model(&cfg.model)
        .with_max_tokens(cfg.max_tokens);
    info!(model = %cfg.model, max_tokens = cfg.max_tokens, "model provider configured");

    let limiter = SlidingWindowLimiter::new(cfg.rate_limit, cfg.rate_limit_window);
    info!(
        limit = cfg.rate_limit,
        window_secs = cfg.rate_limit_window.as_secs(),
        trust_forwarded_for = cfg.trust_forwarded_for,
        "rate limiter ready"
    );

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        limiter: Arc::new(limiter),
        upstream: Arc::new(upstream),
    });

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg
        .bind_address
        .parse()
        .with_context(|| format!("invalid RESUME_BIND '{}'", cfg.bind_address))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("resume-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c    => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
