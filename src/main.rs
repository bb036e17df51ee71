use std::net::SocketAddr;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wordbook_app::models::WordInput;
use wordbook_app::routes::build_app;
use wordbook_app::{AppConfig, AppState};

/// A handful of entries so a fresh in-memory instance has something to page through.
async fn populate_sample_words(app_state: &AppState) {
    let samples: [(&str, i64, &[usize]); 6] = [
        ("house", 1, &[]),
        ("maison", 2, &[0]),
        ("Haus", 3, &[0, 1]),
        ("casa", 4, &[0]),
        ("дом", 5, &[0, 3]),
        ("dog", 1, &[]),
    ];

    let mut created: Vec<i64> = Vec::with_capacity(samples.len());
    for (name, language_id, translations) in samples {
        let translation_ids: Vec<i64> = translations.iter().map(|i| created[*i]).collect();
        let input = WordInput::normalized(name, Some(language_id), &translation_ids);
        match app_state.word_service.create(&input).await {
            Ok(word) => created.push(word.id),
            Err(e) => {
                warn!("Could not create sample word {}: {}", name, e);
                return;
            }
        }
    }
    info!("Created {} sample words", created.len());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wordbook_app=info,tower_http=info")),
        )
        .init();

    info!("Starting Wordbook server...");

    let config = AppConfig::from_env();
    info!("Server configuration loaded");

    let app_state = AppState::new(config.clone())
        .await
        .context("failed to initialize application state")?;
    info!("Application state initialized");

    if config.database_url.is_none() {
        populate_sample_words(&app_state).await;
    }

    let app = build_app(app_state);

    let addr: SocketAddr = config
        .server_address()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_address()))?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
