//! Generation provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for the external
//! generation backend, allowing easy swapping between the real Gemini
//! implementation and a mock for tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The upstream API rejected the call. `message` carries the
    /// locale-tagged detail message when the error envelope had one.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no detail"))]
    Api { status: u16, message: Option<String> },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Handle to a document uploaded to the remote service.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// URI the generation call uses to reference the document.
    pub uri: String,
    /// MIME type as recorded by the remote side.
    pub mime_type: String,
}

/// Trait for quiz generation backends.
///
/// The API key is per-call rather than per-provider: callers supply their
/// own credential with each request and the service never holds one.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Upload the staged document, returning the remote handle.
    async fn upload_file(
        &self,
        api_key: &str,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, ProviderError>;

    /// Generate quiz markdown from the prompt and an uploaded document.
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        file: &RemoteFile,
    ) -> Result<String, ProviderError>;
}
