//! HTTP client for the subtitle service.
//!
//! Wraps a shared `reqwest::Client` and exposes the service operations
//! (English subtitle burn-in, health probe). Each call carries its own base URL,
//! cancellation token and timeout; the client itself holds no per-operation state,
//! so clones can run uploads concurrently.

pub mod api;
pub mod cancel;
pub mod upload;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub use cancel::CancelScope;
pub use subtitler_core::{CancelSource, UploadError};
pub use tokio_util::sync::CancellationToken;
pub use upload::{Artifact, Payload, UploadRequest, ACCEPT_PREFERENCE, DEFAULT_FILENAME};

/// Path of the English subtitle burn-in endpoint.
pub const ENGLISH_SUBTITLES_PATH: &str = "/subtitles/en";

/// Path of the service liveness probe.
pub const HEALTH_PATH: &str = "/healthz";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the subtitle service.
#[derive(Clone, Debug)]
pub struct SubtitleClient {
    client: Client,
}

impl SubtitleClient {
    /// Build a client. No overall request timeout is set: uploads are bounded by
    /// their own per-operation timeout instead.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
