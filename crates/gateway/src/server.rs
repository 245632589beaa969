use std::{sync::Arc, time::Duration};

use {
    axum::{
        Json, Router,
        response::IntoResponse,
        routing::{get, post},
    },
    tokio::sync::watch,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{info, warn},
    voxrelay_config::VoxrelayConfig,
    voxrelay_voice::{HttpSpeechProvider, SpeechRelay},
};

use crate::speech_routes::{generate_handler, voices_handler};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub relay: Arc<SpeechRelay>,
}

impl AppState {
    #[must_use]
    pub fn new(relay: SpeechRelay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the relay (HTTP provider, voice table, relay settings) from config.
pub fn build_relay(config: &VoxrelayConfig) -> anyhow::Result<SpeechRelay> {
    let provider = HttpSpeechProvider::from_config(&config.provider)?;
    Ok(SpeechRelay::new(
        Arc::new(provider),
        Arc::new(config.voice_map()),
        config.relay.clone(),
    ))
}

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .route("/api/voices", get(voices_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the relay HTTP server and run until ctrl-c or SIGTERM.
///
/// On shutdown, in-flight streams get `server.shutdown_timeout_secs` to
/// finish before they are dropped.
pub async fn start_gateway(config: VoxrelayConfig) -> anyhow::Result<()> {
    let relay = build_relay(&config)?;
    let app = build_gateway_app(AppState::new(relay));

    let listener =
        tokio::net::TcpListener::bind((config.server.bind.as_str(), config.server.port)).await?;
    info!(
        addr = %listener.local_addr()?,
        provider = %config.provider.base_url,
        "voxrelay listening"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            res??;
            return Ok(());
        },
        () = shutdown_signal() => {},
    }

    info!("shutdown signal received, draining in-flight streams");
    let _ = shutdown_tx.send(true);

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(res) => {
            res??;
            info!("server stopped gracefully");
        },
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout_secs,
            "shutdown timeout, dropping remaining streams"
        ),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
