use crate::error::AppError;
use crate::services::{markdown, prompt};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;

/// MIME type forwarded when the upload does not declare one.
const DEFAULT_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub data: String,
}

/// Accept one document and one API key, proxy to the generation backend,
/// and return the normalized quiz markdown.
pub async fn generate_quiz(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<QuizResponse>, AppError> {
    let form = read_prompt_form(&mut multipart).await?;

    tracing::info!(
        filename = %form.filename,
        mime_type = %form.mime_type,
        size = form.data.len(),
        "Quiz generation started"
    );

    // Stage the upload on disk. The guard unlinks the file on every exit
    // path, and it only exists once a file field was actually received.
    let staged = tempfile::Builder::new()
        .prefix("quiz-upload-")
        .tempfile_in(&state.config.upload.temp_dir)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to stage upload: {}", e)))?;
    tokio::fs::write(staged.path(), &form.data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to stage upload: {}", e)))?;

    let display_name = Utc::now().to_rfc3339();
    let remote = state
        .provider
        .upload_file(&form.api_key, staged.path(), &form.mime_type, &display_name)
        .await?;

    let raw = state
        .provider
        .generate(&form.api_key, prompt::MCQ_PROMPT, &remote)
        .await?;

    let data = markdown::expand_paragraph_breaks(&raw);

    tracing::info!(
        filename = %form.filename,
        markdown_len = data.len(),
        "Quiz generation completed"
    );

    Ok(Json(QuizResponse { data }))
}

/// Catch-all for non-POST methods on the prompt route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

struct PromptForm {
    api_key: String,
    filename: String,
    mime_type: String,
    data: Vec<u8>,
}

/// Read the `file` and `apiKey` fields out of the multipart body. Both are
/// required; anything else in the form is ignored.
async fn read_prompt_form(multipart: &mut Multipart) -> Result<PromptForm, AppError> {
    let mut api_key: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(map_multipart_error)?.to_vec();
                file = Some((filename, mime_type, data));
            }
            Some("apiKey") => {
                api_key = Some(field.text().await.map_err(map_multipart_error)?);
            }
            _ => {}
        }
    }

    let api_key = api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::FormParse(anyhow::anyhow!("missing apiKey field")))?;
    let (filename, mime_type, data) =
        file.ok_or_else(|| AppError::FormParse(anyhow::anyhow!("missing file field")))?;

    Ok(PromptForm {
        api_key,
        filename,
        mime_type,
        data,
    })
}

fn map_multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::FormParse(anyhow::anyhow!(err))
    }
}
