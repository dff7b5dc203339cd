//! Mock provider implementation for testing.

use super::{GenerationProvider, ProviderError, RemoteFile};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Markdown returned by the mock on success. Single newlines on purpose:
/// integration tests assert the paragraph-break expansion against it.
pub const MOCK_MARKDOWN: &str =
    "1. What does the uploaded document describe?\na) Nothing\nb) Everything\nc) The content under test\nd) None of the above\n\ncorrect: c";

/// Mock generation provider.
///
/// Counts calls so tests can assert that the endpoint never reaches the
/// external service on invalid input, and can be configured to fail the
/// way Gemini does.
pub struct MockProvider {
    failure: Option<(u16, Option<String>)>,
    upload_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    last_mime_type: Mutex<Option<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            failure: None,
            upload_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            last_mime_type: Mutex::new(None),
        }
    }

    /// Fail every call with an upstream error carrying a locale-tagged
    /// detail message.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            failure: Some((status, Some(message.into()))),
            ..Self::new()
        }
    }

    /// Fail every call with an upstream error that has no usable detail
    /// message.
    pub fn failing_generic(status: u16) -> Self {
        Self {
            failure: Some((status, None)),
            ..Self::new()
        }
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// MIME type of the most recent upload, as seen by the provider.
    pub fn last_mime_type(&self) -> Option<String> {
        self.last_mime_type.lock().unwrap().clone()
    }

    fn fail_if_configured(&self) -> Result<(), ProviderError> {
        if let Some((status, message)) = &self.failure {
            return Err(ProviderError::Api {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn upload_file(
        &self,
        _api_key: &str,
        _path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, ProviderError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mime_type.lock().unwrap() = Some(mime_type.to_string());
        self.fail_if_configured()?;

        Ok(RemoteFile {
            uri: format!("mock://files/{}", display_name),
            mime_type: mime_type.to_string(),
        })
    }

    async fn generate(
        &self,
        _api_key: &str,
        _prompt: &str,
        _file: &RemoteFile,
    ) -> Result<String, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.fail_if_configured()?;

        Ok(MOCK_MARKDOWN.to_string())
    }
}
