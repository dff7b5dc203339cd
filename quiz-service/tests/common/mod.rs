use quiz_service::config::{ProviderKind, QuizConfig};
use quiz_service::services::providers::mock::MockProvider;
use quiz_service::startup::Application;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub temp_dir: PathBuf,
    pub provider: Arc<MockProvider>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MockProvider::new()), |_| {}).await
    }

    pub async fn spawn_with_provider(provider: Arc<MockProvider>) -> Self {
        Self::spawn_with(provider, |_| {}).await
    }

    pub async fn spawn_with(
        provider: Arc<MockProvider>,
        configure: impl FnOnce(&mut QuizConfig),
    ) -> Self {
        let mut config = QuizConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.provider.kind = ProviderKind::Mock;
        config.upload.temp_dir = std::env::temp_dir().join(format!("quiz-test-{}", Uuid::new_v4()));
        configure(&mut config);

        let temp_dir = config.upload.temp_dir.clone();

        let app = Application::build_with_provider(config, provider.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            temp_dir,
            provider,
        }
    }

    /// Number of files left behind in this app's staging directory.
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(&self.temp_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Cleanup test resources (staging directory).
    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.temp_dir).await;
    }
}

/// Build the multipart form the upload page submits.
pub fn quiz_form(data: Vec<u8>, filename: &str, mime_type: &str, api_key: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .part(
            "file",
            reqwest::multipart::Part::bytes(data)
                .file_name(filename.to_string())
                .mime_str(mime_type)
                .unwrap(),
        )
        .text("apiKey", api_key.to_string())
}
