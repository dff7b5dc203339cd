use thiserror::Error;

/// Error type for upload operations.
///
/// Transport failures are carried here like any other failure so every
/// error reaches the view through the same inline state, server-reported
/// or not.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("An error occurred while uploading: {0}")]
    Transport(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
