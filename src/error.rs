//! User-visible error taxonomy for the viewer
//!
//! Every variant is recoverable: the viewer records it in its state and
//! keeps showing the last good image.

use thiserror::Error;

use crate::parser::PpmError;

/// Why an upload was refused before any read started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The single file does not have a `.ppm` extension
    WrongExtension,
    /// More than one file was dropped
    TooManyFiles,
    /// Nothing was dropped
    NoFile,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::WrongExtension => write!(f, "Only files with the .ppm extension are allowed!"),
            RejectReason::TooManyFiles => write!(f, "Only 1 PPM image can be loaded at a time!"),
            RejectReason::NoFile => write!(f, "No file was provided"),
        }
    }
}

/// Underlying read failure, reported without detail to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ReadFailure {
    pub detail: String,
}

impl ReadFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

impl From<std::io::Error> for ReadFailure {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Anything that can go wrong between a drop and a rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("{0}")]
    Invalid(#[from] PpmError),

    #[error("Failed to read PPM image file.")]
    FileReadFailure(#[source] ReadFailure),

    #[error("{0}")]
    RejectedUpload(RejectReason),
}

impl ViewerError {
    /// Stable snake_case tag, used for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Invalid(e) => e.kind(),
            ViewerError::FileReadFailure(_) => "file_read_failure",
            ViewerError::RejectedUpload(RejectReason::WrongExtension) => "wrong_extension",
            ViewerError::RejectedUpload(RejectReason::TooManyFiles) => "too_many_files",
            ViewerError::RejectedUpload(RejectReason::NoFile) => "no_file",
        }
    }
}

impl From<ReadFailure> for ViewerError {
    fn from(e: ReadFailure) -> Self {
        ViewerError::FileReadFailure(e)
    }
}
