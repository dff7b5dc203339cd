//! Upload lifecycle controller.
//!
//! Holds the two user inputs, debounces file selection, and fires the
//! multipart upload once both a document and a non-empty credential are
//! committed. State flows out through a watch channel so any front-end
//! (the `quiz` CLI, tests) can observe progress and outcomes.

use crate::error::UploadError;
use crate::state::UploadState;
use bytes::Bytes;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Quiet window for file selection. Trailing-edge: only the last selection
/// within the window is committed.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Upload body chunk size. Small enough that a typical document produces
/// several progress ticks.
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

pub struct UploadController {
    inner: Arc<Inner>,
}

struct Inner {
    server_url: String,
    http: reqwest::Client,
    credential: Mutex<String>,
    file: Mutex<Option<PathBuf>>,
    pending_selection: Mutex<Option<CancellationToken>>,
    requests_started: AtomicU64,
    state_tx: watch::Sender<UploadState>,
}

#[derive(Debug, Deserialize)]
struct QuizResponse {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl UploadController {
    pub fn new(server_url: impl Into<String>) -> Self {
        let (state_tx, _) = watch::channel(UploadState::default());

        Self {
            inner: Arc::new(Inner {
                server_url: server_url.into(),
                http: reqwest::Client::new(),
                credential: Mutex::new(String::new()),
                file: Mutex::new(None),
                pending_selection: Mutex::new(None),
                requests_started: AtomicU64::new(0),
                state_tx,
            }),
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.inner.state_tx.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> UploadState {
        self.inner.state_tx.borrow().clone()
    }

    /// Requests issued so far, including in-flight ones.
    pub fn requests_started(&self) -> u64 {
        self.inner.requests_started.load(Ordering::SeqCst)
    }

    /// Store the credential. No validation happens here; an empty value
    /// simply never triggers an upload.
    pub fn set_credential(&self, value: impl Into<String>) {
        *self.inner.credential.lock().unwrap() = value.into();
        Inner::maybe_trigger(&self.inner);
    }

    /// Select the document to upload. Each call cancels the previous
    /// pending commit, so rapid re-selection collapses to the last file.
    pub fn select_file(&self, path: impl Into<PathBuf>) {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .inner
            .pending_selection
            .lock()
            .unwrap()
            .replace(token.clone())
        {
            previous.cancel();
        }

        let inner = Arc::clone(&self.inner);
        let path = path.into();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(DEBOUNCE_WINDOW) => {
                    *inner.file.lock().unwrap() = Some(path);
                    Inner::maybe_trigger(&inner);
                }
            }
        });
    }

    /// Wait until the first upload settles with a result or an error.
    pub async fn settled(&self) -> UploadState {
        self.wait_for_completed(1).await
    }

    /// Wait until at least `count` uploads have settled.
    pub async fn wait_for_completed(&self, count: u64) -> UploadState {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|state| !state.loading && state.completed_requests >= count)
            .await
            .expect("state channel closed");
        state.clone()
    }
}

impl Inner {
    /// Fire an upload when both inputs are present; silent no-op otherwise.
    /// Called on every committed change of either input, so changing both in
    /// quick succession can issue duplicate requests. Nothing collapses
    /// in-flight uploads; a new selection only affects future triggers.
    fn maybe_trigger(inner: &Arc<Inner>) {
        let credential = inner.credential.lock().unwrap().clone();
        if credential.is_empty() {
            return;
        }
        let path = match inner.file.lock().unwrap().clone() {
            Some(path) => path,
            None => return,
        };

        inner.requests_started.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            Inner::run_upload(inner, path, credential).await;
        });
    }

    async fn run_upload(inner: Arc<Inner>, path: PathBuf, credential: String) {
        inner.state_tx.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.progress = 0;
        });

        let outcome = Inner::send_request(&inner, &path, &credential).await;

        inner.state_tx.send_modify(|state| {
            match outcome {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Upload failed");
                    state.error = Some(err.to_string());
                }
            }
            state.progress = 0;
            state.loading = false;
            state.completed_requests += 1;
        });
    }

    async fn send_request(
        inner: &Arc<Inner>,
        path: &Path,
        credential: &str,
    ) -> Result<String, UploadError> {
        let data = tokio::fs::read(path).await?;
        let total = data.len() as u64;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        tracing::debug!(filename = %filename, size = total, "Starting upload");

        // Hand the body over in chunks so each one advances the progress
        // percentage, rounded the way the page reports it.
        let progress_inner = Arc::clone(inner);
        let mut sent: u64 = 0;
        let chunks = chunk_payload(data, UPLOAD_CHUNK_BYTES);
        let body_stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            let percent = ((sent * 100 + total / 2) / total) as u8;
            progress_inner.state_tx.send_modify(|state| {
                if percent > state.progress {
                    state.progress = percent;
                }
            });
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        let part =
            reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(body_stream), total)
                .file_name(filename)
                .mime_str(mime.as_ref())
                .map_err(|e| UploadError::Transport(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("apiKey", credential.to_string());

        let response = inner
            .http
            .post(format!("{}/api/prompt", inner.server_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: QuizResponse = response
                .json()
                .await
                .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
            Ok(body.data)
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Server returned status {}", status));
            Err(UploadError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Split the payload into transfer chunks, preserving order and content.
fn chunk_payload(data: Vec<u8>, chunk_size: usize) -> Vec<Bytes> {
    let mut rest = Bytes::from(data);
    let mut chunks = Vec::with_capacity(rest.len() / chunk_size + 1);
    while rest.len() > chunk_size {
        chunks.push(rest.split_to(chunk_size));
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
