//! quiz-client: upload lifecycle state machine for the quiz service.
//!
//! [`UploadController`] owns the two user inputs (document and API key),
//! debounces file selection, issues the multipart upload with byte-level
//! progress, and exposes the derived state through a watch channel. The
//! `quiz` binary is a thin terminal front-end over it.

pub mod controller;
pub mod error;
pub mod state;

pub use controller::{UploadController, DEBOUNCE_WINDOW};
pub use error::UploadError;
pub use state::{UploadState, ViewPhase};
