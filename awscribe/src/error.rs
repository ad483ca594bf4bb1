use std::path::PathBuf;

/// All errors that can occur in awscribe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("audio file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("unsupported language code: \"{0}\" (use LanguageCode::supported() to list valid codes)")]
    UnsupportedLanguage(String),

    #[error("audio conversion failed: {0}")]
    ConversionFailed(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("transcription service error: {0}")]
    Service(String),

    #[error("malformed transcript in {path}: {reason}")]
    MalformedResult { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error: 1 for problems with local input,
    /// 2 for failures of an external collaborator.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputNotFound { .. } | Error::UnsupportedLanguage(_) | Error::Io(_) => 1,
            Error::ConversionFailed(_)
            | Error::Storage(_)
            | Error::Service(_)
            | Error::MalformedResult { .. } => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
