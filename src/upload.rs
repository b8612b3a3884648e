//! Upload acceptance and stale-read guarding
//!
//! An accepted upload gets an [`UploadTicket`] stamped with a generation
//! number. The read result is only applied if its ticket is still the
//! latest one issued; older reads that resolve late are dropped.

use std::path::Path;

use crate::error::{ReadFailure, RejectReason, ViewerError};

/// Accepted file extension (compared case-insensitively).
pub const PPM_EXTENSION: &str = "ppm";

/// Check whether a path has a `.ppm` extension.
pub fn is_ppm_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(PPM_EXTENSION))
}

/// Accept exactly one `.ppm` file from a drop, returning its name.
pub fn accept_upload<S: AsRef<str>>(names: &[S]) -> Result<String, ViewerError> {
    match names {
        [] => Err(ViewerError::RejectedUpload(RejectReason::NoFile)),
        [name] if is_ppm_file(Path::new(name.as_ref())) => Ok(name.as_ref().to_string()),
        [_] => Err(ViewerError::RejectedUpload(RejectReason::WrongExtension)),
        _ => Err(ViewerError::RejectedUpload(RejectReason::TooManyFiles)),
    }
}

/// Identity of one accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
    file_name: String,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Issues tickets and remembers which one is current.
#[derive(Debug, Default, Clone)]
pub struct UploadTracker {
    latest: u64,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier one.
    pub fn issue(&mut self, file_name: impl Into<String>) -> UploadTicket {
        self.latest += 1;
        UploadTicket { generation: self.latest, file_name: file_name.into() }
    }

    pub fn is_current(&self, ticket: &UploadTicket) -> bool {
        ticket.generation == self.latest
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest
    }
}

/// Read an upload from disk as text.
pub fn read_upload(path: &Path) -> Result<String, ReadFailure> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|e| ReadFailure::new(format!("{} is not valid UTF-8 text: {}", path.display(), e)))
}
