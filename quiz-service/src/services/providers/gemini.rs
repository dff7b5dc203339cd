//! Gemini provider implementation.
//!
//! Uploads the staged document through the Files API resumable protocol
//! (start + finalize) and runs a single generateContent call referencing
//! the uploaded file.

use super::{GenerationProvider, ProviderError, RemoteFile};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Files API base URL (resumable upload protocol).
const GEMINI_UPLOAD_BASE: &str = "https://generativelanguage.googleapis.com/upload/v1beta";

pub struct GeminiProvider {
    client: Client,
    model: String,
    api_base: String,
    upload_base: String,
}

impl GeminiProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(model, GEMINI_API_BASE, GEMINI_UPLOAD_BASE)
    }

    /// Create a provider pointed at alternative endpoints. Used by tests to
    /// substitute a local stub for the real API.
    pub fn with_base_url(
        model: impl Into<String>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            model: model.into(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    /// Pass the response through on success, or map the error body into a
    /// `ProviderError` with the locale-tagged detail message when present.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status.as_u16(), &body))
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn upload_file(
        &self,
        api_key: &str,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, ProviderError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            ProviderError::InvalidRequest(format!("failed to read staged upload: {}", e))
        })?;

        tracing::debug!(
            size = data.len(),
            mime_type = %mime_type,
            "Starting resumable upload to Gemini"
        );

        // Step 1: open an upload session carrying the file metadata.
        let start_url = format!("{}/files?key={}", self.upload_base, api_key);
        let metadata = CreateFileRequest {
            file: FileMetadata {
                display_name: display_name.to_string(),
            },
        };

        let response = self
            .client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let session_url = response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "upload session URL missing from start response".to_string(),
                )
            })?;

        // Step 2: send the bytes and finalize in one shot.
        let response = self
            .client
            .post(&session_url)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(data)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let created: CreateFileResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse upload response: {}", e)))?;

        tracing::debug!(uri = %created.file.uri, "Uploaded document to Gemini");

        Ok(RemoteFile {
            uri: created.file.uri,
            mime_type: created.file.mime_type,
        })
    }

    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        file: &RemoteFile,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::FileData {
                        file_data: FileData {
                            file_uri: file.uri.clone(),
                            mime_type: file.mime_type.clone(),
                        },
                    },
                ],
            }],
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending generation request to Gemini"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &api_response.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count.unwrap_or(0),
                output_tokens = usage.candidates_token_count.unwrap_or(0),
                "Gemini generation finished"
            );
        }

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text),
                _ => None,
            })
            .ok_or_else(|| ProviderError::InvalidResponse("Gemini returned no text".to_string()))
    }
}

/// Parse an error body into a `ProviderError`, preferring the first error
/// detail entry that carries a `locale` field.
fn map_api_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<GoogleErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| {
            envelope
                .error
                .details
                .into_iter()
                .find(|d| d.locale.is_some())
                .and_then(|d| d.message)
        });

    ProviderError::Api { status, message }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFileRequest {
    file: FileMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct CreateFileResponse {
    file: FileInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileInfo {
    uri: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
    mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    details: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    message: Option<String>,
}
