//! Watchma Back binary entrypoint wiring REST, SSE, the movie catalog and the reveal dialogue.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchma_back::{
    catalog::{MovieProvider, caching::CachingMovieProvider, dummy::DummyMovieProvider},
    config::{AppConfig, CatalogSource},
    dialogue::AiProvider,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let movies = build_movie_provider(&config);
    let ai = build_ai_provider(&config);

    let app_state = AppState::new(config, movies, ai);
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the configured catalog source and put the TTL cache in front of it.
///
/// A Jellyfin source that cannot be built falls back to the built-in catalog.
fn build_movie_provider(config: &AppConfig) -> Arc<dyn MovieProvider> {
    let source: Arc<dyn MovieProvider> = match config.catalog.source {
        CatalogSource::Dummy => Arc::new(DummyMovieProvider),
        CatalogSource::Jellyfin => jellyfin_provider(config),
    };
    Arc::new(CachingMovieProvider::new(source, config.catalog.cache_ttl()))
}

#[cfg(feature = "jellyfin")]
fn jellyfin_provider(config: &AppConfig) -> Arc<dyn MovieProvider> {
    use watchma_back::{
        catalog::jellyfin::JellyfinMovieProvider,
        config::{JELLYFIN_API_KEY_ENV, secret_from_env},
    };

    match JellyfinMovieProvider::new(
        config.catalog.jellyfin_base_url.as_deref(),
        secret_from_env(JELLYFIN_API_KEY_ENV),
    ) {
        Ok(provider) => {
            info!("using Jellyfin movie catalog");
            Arc::new(provider)
        }
        Err(err) => {
            warn!(error = %err, "Jellyfin catalog unavailable; using built-in catalog");
            Arc::new(DummyMovieProvider)
        }
    }
}

#[cfg(not(feature = "jellyfin"))]
fn jellyfin_provider(_config: &AppConfig) -> Arc<dyn MovieProvider> {
    warn!("built without the `jellyfin` feature; using built-in catalog");
    Arc::new(DummyMovieProvider)
}

#[cfg(feature = "openai")]
fn build_ai_provider(config: &AppConfig) -> Option<Arc<dyn AiProvider>> {
    use watchma_back::{
        config::{OPENAI_API_KEY_ENV, secret_from_env},
        dialogue::openai::OpenAiProvider,
    };

    if !config.ai.enabled {
        info!("reveal dialogue disabled by configuration");
        return None;
    }
    match OpenAiProvider::new(
        secret_from_env(OPENAI_API_KEY_ENV),
        &config.ai.model,
        config.ai.timeout(),
    ) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(err) => {
            warn!(error = %err, "dialogue generator unavailable; reveals will skip dialogue");
            None
        }
    }
}

#[cfg(not(feature = "openai"))]
fn build_ai_provider(config: &AppConfig) -> Option<Arc<dyn AiProvider>> {
    if config.ai.enabled {
        warn!("built without the `openai` feature; reveals will skip dialogue");
    }
    None
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
