//! Snippet Service Binary
//!
//! Runs the snippet summarizer as a REST API service:
//! - Structured JSON logging
//! - Request tracing with correlation IDs
//! - Graceful shutdown handling
//! - Health check endpoints
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT`: Service port (default: 3000)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `OPENAI_API_KEY`: Completion provider key. When unset, a mock provider is used.
//! - `OPENAI_MODEL`: Model identifier (default: gpt-3.5-turbo)
//! - `OPENAI_BASE_URL`: API root (default: https://api.openai.com/v1)
//! - `OPENAI_TIMEOUT_SECS`: Provider request timeout (default: 30)
//! - `DATABASE_URL`: PostgreSQL connection string (`postgres` feature only)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! OPENAI_API_KEY=... cargo run --bin snippet_service
//! DATABASE_URL=postgresql://... cargo run --bin snippet_service --features postgres
//! ```

use std::sync::Arc;
#[cfg(feature = "postgres")]
use std::time::Instant;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use snippet_summarizer::config::{OpenAiConfig, ServiceConfig};
use snippet_summarizer::gateway::{CompletionClient, MockCompletionClient, OpenAiCompletionClient};
use snippet_summarizer::service::{create_router, request_logging_middleware, ServiceState};
use snippet_summarizer::store::SnippetStore;

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "snippet_service=info,snippet_summarizer=info,tower_http=info,sqlx=warn".into()
    });

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .init();
    }
}

#[cfg(feature = "postgres")]
async fn open_store() -> Result<Arc<dyn SnippetStore>, Box<dyn std::error::Error>> {
    use snippet_summarizer::store::PostgresSnippetStore;

    info!("Connecting to PostgreSQL...");
    let connect_start = Instant::now();

    let store = match tokio::time::timeout(
        std::time::Duration::from_secs(30),
        PostgresSnippetStore::from_env(),
    )
    .await
    {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            return Err(e.into());
        }
        Err(_) => {
            tracing::error!("PostgreSQL connection timeout after 30s");
            return Err("Database connection timeout".into());
        }
    };

    store.migrate().await?;

    info!(
        latency_ms = connect_start.elapsed().as_millis() as u64,
        "PostgreSQL connection established"
    );

    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_store() -> Result<Arc<dyn SnippetStore>, Box<dyn std::error::Error>> {
    use snippet_summarizer::store::InMemorySnippetStore;

    warn!("Built without the postgres feature. Snippets are kept in memory and lost on restart.");
    Ok(Arc::new(InMemorySnippetStore::new()))
}

fn completion_client() -> Result<Arc<dyn CompletionClient>, Box<dyn std::error::Error>> {
    match OpenAiConfig::from_env()? {
        Some(config) => {
            info!(model = %config.model, base_url = %config.base_url, "Completion provider configured");
            Ok(Arc::new(OpenAiCompletionClient::new(config)?))
        }
        None => {
            warn!("OPENAI_API_KEY not set. Using mock summaries.");
            Ok(Arc::new(MockCompletionClient::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");

    info!(
        version = version,
        build_sha = build_sha,
        "Starting Snippet Service"
    );

    let config = ServiceConfig::from_env()?;
    let store = open_store().await?;
    let client = completion_client()?;

    let state = ServiceState::new(store, client);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.listen_addr()?;
    info!(
        address = %addr,
        version = version,
        "Snippet Service listening"
    );

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
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
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
            _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
        }
    };

    info!("Ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Snippet Service shutdown complete");

    Ok(())
}
