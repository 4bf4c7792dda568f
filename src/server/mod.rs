// MindMitra - HTTP Server Module
// Chat, mood analytics, health and metrics over axum

mod handlers;

pub use handlers::{create_router, health_check, metrics_endpoint, AppError, ChatRequest, ChatResponse};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::errors::bind_failed_error;
use crate::metrics::PipelineMetrics;
use crate::pipeline::Pipeline;
use crate::storage::MoodLogReader;

/// Shared state behind every route
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub moods: Arc<dyn MoodLogReader>,
    pub metrics: PipelineMetrics,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

/// HTTP front end for the pipeline
pub struct ChatServer {
    state: Arc<AppState>,
    bind_address: String,
}

impl ChatServer {
    pub fn new(state: AppState, bind_address: impl Into<String>) -> Self {
        Self {
            state: Arc::new(state),
            bind_address: bind_address.into(),
        }
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))?;

        let app = create_router(Arc::clone(&self.state)).layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| bind_failed_error(&self.bind_address))?;

        tracing::info!("Starting MindMitra API on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
