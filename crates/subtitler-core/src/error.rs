//! Error types module
//!
//! Every non-success outcome of an upload is represented by [`UploadError`] so that
//! callers can branch on the status code without parsing raw response bodies.
//! Cancellation is its own variant: it has no status code and callers handle a
//! user abort differently from a server rejection.

use std::fmt;

/// Which source triggered the cancellation of an in-flight upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSource {
    /// The caller-owned token fired.
    External,
    /// The per-operation timer elapsed.
    Timeout,
}

impl fmt::Display for CancelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelSource::External => f.write_str("cancelled by caller"),
            CancelSource::Timeout => f.write_str("timed out"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The remote service answered, but with a failure status or an unusable
    /// content type. `Display` renders the detail verbatim.
    #[error("{detail}")]
    HttpFailure { status: u16, detail: String },

    #[error("Upload aborted: {source_kind}")]
    Cancelled { source_kind: CancelSource },

    #[error("Upload misconfigured: {reason}")]
    Misconfigured { reason: String },

    /// Connectivity or protocol fault below the HTTP contract.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl UploadError {
    pub fn http_failure(status: u16, detail: impl Into<String>) -> Self {
        UploadError::HttpFailure {
            status,
            detail: detail.into(),
        }
    }

    pub fn misconfigured(reason: impl Into<String>) -> Self {
        UploadError::Misconfigured {
            reason: reason.into(),
        }
    }

    /// HTTP status reported by the server, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided detail string, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            UploadError::HttpFailure { detail, .. } => Some(detail.as_str()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled { .. })
    }

    /// Machine-readable error code (e.g., "HTTP_FAILURE")
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::HttpFailure { .. } => "HTTP_FAILURE",
            UploadError::Cancelled { .. } => "CANCELLED",
            UploadError::Misconfigured { .. } => "MISCONFIGURED",
            UploadError::Transport(_) => "TRANSPORT",
        }
    }

    /// Message suitable for showing to an end user.
    ///
    /// Known status codes get a short explanation prefixed to the server detail.
    /// The upload path itself never looks at these codes; this mapping is for
    /// presentation only.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::HttpFailure { status, detail } => {
                let prefix = match status {
                    413 => Some("File is too large for the server"),
                    422 => Some("The server rejected the file"),
                    500 => Some("The server failed to process the file"),
                    _ => None,
                };
                match prefix {
                    Some(prefix) => format!("{}: {}", prefix, detail),
                    None => format!("Request failed ({}): {}", status, detail),
                }
            }
            UploadError::Cancelled {
                source_kind: CancelSource::External,
            } => "Upload cancelled".to_string(),
            UploadError::Cancelled {
                source_kind: CancelSource::Timeout,
            } => "Upload timed out".to_string(),
            UploadError::Misconfigured { reason } => format!("Configuration error: {}", reason),
            UploadError::Transport(e) => format!("Could not reach the server: {}", e),
        }
    }
}
