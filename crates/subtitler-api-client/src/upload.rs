//! Upload request model and response classification.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use subtitler_core::{CancelSource, UploadError};
use tokio_util::sync::CancellationToken;

/// Filename used when neither the payload nor the request provides one.
pub const DEFAULT_FILENAME: &str = "input.mp4";

/// Media type the service returns on success.
pub const ARTIFACT_CONTENT_TYPE: &str = "video/mp4";

/// `Accept` header: the artifact first, JSON errors second, anything last.
pub const ACCEPT_PREFERENCE: &str = "video/mp4,application/json;q=0.9,*/*;q=0.8";

/// The bytes to upload, optionally carrying their own file name.
#[derive(Debug, Clone)]
pub struct Payload {
    bytes: Bytes,
    name: Option<String>,
}

impl Payload {
    /// In-memory bytes with no intrinsic name.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            name: None,
        }
    }

    pub fn named(bytes: impl Into<Bytes>, name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            name: Some(name.into()),
        }
    }

    /// Read a file from disk; its file name becomes the payload name.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string());
        Ok(Self {
            bytes: Bytes::from(bytes),
            name,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Input of one subtitle upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub payload: Payload,
    pub filename: Option<String>,
    pub api_base: Option<String>,
    pub cancel: Option<CancellationToken>,
    pub timeout: Option<Duration>,
}

impl UploadRequest {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            filename: None,
            api_base: None,
            cancel: None,
            timeout: None,
        }
    }

    pub fn with_api_base(self, api_base: impl Into<String>) -> Self {
        Self {
            api_base: Some(api_base.into()),
            ..self
        }
    }

    /// Name used when the payload carries none.
    pub fn with_filename(self, filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..self
        }
    }

    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Payload name, else the override, else [`DEFAULT_FILENAME`].
    pub fn resolved_filename(&self) -> String {
        self.payload
            .name()
            .or(self.filename.as_deref())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string()
    }
}

/// Successful upload: the subtitled video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Bytes,
    pub content_type: String,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Resolve the endpoint for `path` against the configured base address.
pub(crate) fn resolve_endpoint(
    api_base: Option<&str>,
    path: &str,
) -> Result<reqwest::Url, UploadError> {
    let base = api_base
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| UploadError::misconfigured("API base URL is not configured"))?;

    let base = reqwest::Url::parse(base).map_err(|e| {
        UploadError::misconfigured(format!("Invalid API base URL '{}': {}", base, e))
    })?;

    base.join(path)
        .map_err(|e| UploadError::misconfigured(format!("Invalid endpoint path '{}': {}", path, e)))
}

/// Lowercased content type, with parameters dropped.
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub(crate) fn is_artifact(success: bool, content_type: &str) -> bool {
    success && content_type.starts_with(ARTIFACT_CONTENT_TYPE)
}

pub(crate) fn is_json(content_type: &str) -> bool {
    content_type.contains("application/json")
}

/// Pick the detail out of a JSON error body.
///
/// A string `detail` field is used verbatim; anything else renders the whole
/// document. Returns `None` when the body is not valid JSON.
pub(crate) fn json_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => Some(detail.clone()),
        _ => Some(value.to_string()),
    }
}

/// Placeholder detail when the error body cannot be read.
pub(crate) fn fallback_detail(status: u16) -> String {
    format!("HTTP {}", status)
}

pub(crate) fn cancelled(source: Option<CancelSource>) -> UploadError {
    UploadError::Cancelled {
        source_kind: source.unwrap_or(CancelSource::External),
    }
}
