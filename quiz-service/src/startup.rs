//! Application startup and lifecycle management.

use crate::config::{ProviderKind, QuizConfig};
use crate::error::AppError;
use crate::handlers::{generate_quiz, health_check, index, method_not_allowed, readiness_check};
use crate::services::providers::gemini::GeminiProvider;
use crate::services::providers::mock::MockProvider;
use crate::services::providers::GenerationProvider;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: QuizConfig,
    pub provider: Arc<dyn GenerationProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the provider selected by configuration.
    pub async fn build(config: QuizConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn GenerationProvider> = match config.provider.kind {
            ProviderKind::Gemini => {
                Arc::new(GeminiProvider::new(config.provider.text_model.clone()))
            }
            ProviderKind::Mock => Arc::new(MockProvider::new()),
        };

        tracing::info!(
            kind = ?config.provider.kind,
            model = %config.provider.text_model,
            "Initialized generation provider"
        );

        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an externally constructed provider.
    /// Tests use this to keep a handle on the mock.
    pub async fn build_with_provider(
        config: QuizConfig,
        provider: Arc<dyn GenerationProvider>,
    ) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.upload.temp_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    temp_dir = %config.upload.temp_dir.display(),
                    "Failed to create upload staging directory: {}", e
                );
                AppError::from(e)
            })?;

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("quiz-service listening on port {}", port);

        let state = AppState { config, provider };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped or a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Create the application router.
///
/// `/api/prompt` accepts POST only; every other method on the path is
/// answered with 405 before any body processing happens.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload.max_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route(
            "/api/prompt",
            post(generate_quiz).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
