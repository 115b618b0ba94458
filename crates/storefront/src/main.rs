//! M² Verse Storefront - Public e-commerce site.
//!
//! This binary serves the public-facing storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - JSON catalog bundled with the binary for products and testimonials
//! - Firebase Identity Toolkit for authentication
//! - Firestore for user profiles and blog articles
//! - WhatsApp `wa.me` links for the order/quote contact flow

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

mod cart;
mod catalog;
mod config;
mod error;
mod filters;
mod firebase;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use catalog::Catalog;
use config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use services::auth::IdentityObserver;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry when a DSN is configured.
///
/// The returned guard flushes pending events on drop, so it has to live
/// for the whole process.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config
            .sentry_environment
            .clone()
            .map(std::borrow::Cow::Owned),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };

    Some(sentry::init((dsn, options)))
}

/// Route tracing events into Sentry: warnings and errors become events,
/// info and debug become breadcrumbs on the next event.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Configuration comes first; Sentry and tracing both read from it
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry before the subscriber so its tracing layer can hook in
    let _sentry_guard = init_sentry(&config);

    // Default to info for our crate when RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "m2verse_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if _sentry_guard.is_some() {
        tracing::info!("Sentry error tracking enabled");
    }

    // A broken catalog is a startup failure, not a runtime one
    let catalog = Catalog::load(Path::new("crates/storefront/content/catalog.json"))
        .expect("Failed to load catalog");

    let state = AppState::new(config.clone(), catalog);

    // Track gate-level identity state for the lifetime of the process
    let identity_observer = IdentityObserver::start(state.auth());

    let session_layer = middleware::create_session_layer(state.config());

    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("Storefront listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    identity_observer.stop();
}

/// Liveness probe. Confirms the process is serving requests, nothing more.
async fn health() -> &'static str {
    "ok"
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
