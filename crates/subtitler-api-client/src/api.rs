//! Service operations for the subtitle client.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Response};
use serde::Deserialize;

use crate::cancel::CancelScope;
use crate::upload::{
    cancelled, fallback_detail, is_artifact, is_json, json_detail, media_type, resolve_endpoint,
    Artifact, UploadRequest, ACCEPT_PREFERENCE,
};
use crate::{SubtitleClient, UploadError, ENGLISH_SUBTITLES_PATH, HEALTH_PATH};

const HEALTH_TIMEOUT_SECS: u64 = 10;

/// Liveness probe response. Matches GET /healthz.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

impl SubtitleClient {
    /// Upload a video and receive it back with English subtitles burned in.
    ///
    /// Sends `POST {api_base}/subtitles/en` as multipart form data with a single
    /// `file` part. The call observes one internal cancellation token, triggered by
    /// whichever of `request.cancel` and `request.timeout` fires first; the timer and
    /// the listener are released before this returns, whatever the outcome.
    ///
    /// Only a success status with a `video/mp4` body yields an [`Artifact`]. Every
    /// other response becomes [`UploadError::HttpFailure`] with the server's detail.
    pub async fn post_english_subtitles(
        &self,
        request: UploadRequest,
    ) -> Result<Artifact, UploadError> {
        let endpoint = resolve_endpoint(request.api_base.as_deref(), ENGLISH_SUBTITLES_PATH)?;

        let scope = CancelScope::new(request.cancel.as_ref(), request.timeout);
        let result = self.send_upload(endpoint, request, &scope).await;
        drop(scope);

        match &result {
            Ok(artifact) => {
                tracing::info!(size_bytes = artifact.len(), "Subtitled video received")
            }
            Err(UploadError::Cancelled { source_kind }) => {
                tracing::info!(source = %source_kind, "Subtitle upload cancelled")
            }
            Err(UploadError::HttpFailure { status, detail }) => {
                tracing::warn!(status = %status, detail = %detail, "Subtitle service rejected upload")
            }
            Err(e) => tracing::warn!(error = %e, "Subtitle upload failed"),
        }

        result
    }

    async fn send_upload(
        &self,
        endpoint: reqwest::Url,
        request: UploadRequest,
        scope: &CancelScope,
    ) -> Result<Artifact, UploadError> {
        // Never send once cancellation has already happened.
        if scope.is_cancelled() {
            return Err(cancelled(scope.source()));
        }

        let filename = request.resolved_filename();
        let mime = mime_guess::from_path(&filename).first_or_octet_stream();
        let payload = request.payload.into_bytes();

        tracing::debug!(
            url = %endpoint,
            filename = %filename,
            size_bytes = payload.len(),
            "Uploading video for English subtitles"
        );

        let length = payload.len() as u64;
        let part = multipart::Part::stream_with_length(payload, length)
            .file_name(filename)
            .mime_str(mime.as_ref())?;
        let form = multipart::Form::new().part("file", part);

        let send = self
            .client()
            .post(endpoint)
            .header(ACCEPT, ACCEPT_PREFERENCE)
            .multipart(form)
            .send();
        let response = until_cancelled(scope, send).await??;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(media_type)
            .unwrap_or_default();

        if is_artifact(status.is_success(), &content_type) {
            let bytes = until_cancelled(scope, response.bytes()).await??;
            return Ok(Artifact {
                bytes,
                content_type,
            });
        }

        tracing::debug!(
            status = %status,
            content_type = %content_type,
            "Response is not a video, extracting error detail"
        );
        let detail = until_cancelled(scope, read_detail(response, &content_type)).await?;
        Err(UploadError::http_failure(status.as_u16(), detail))
    }

    /// Probe `GET {api_base}/healthz`. Returns the service's `ok` flag.
    pub async fn health(&self, api_base: &str) -> anyhow::Result<bool> {
        let url = resolve_endpoint(Some(api_base), HEALTH_PATH)?;

        let response = self
            .client()
            .get(url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Health check failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: HealthResponse = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body.ok)
    }
}

/// Run `fut` unless the scope is cancelled first.
async fn until_cancelled<F: Future>(
    scope: &CancelScope,
    fut: F,
) -> Result<F::Output, UploadError> {
    tokio::select! {
        biased;
        _ = scope.token().cancelled() => Err(cancelled(scope.source())),
        output = fut => Ok(output),
    }
}

/// Extract a human-readable detail from an error response.
///
/// Never fails: unreadable bodies fall back to `HTTP <status>`. A body that
/// reads fine is used as-is, even when empty.
async fn read_detail(response: Response, content_type: &str) -> String {
    let status = response.status().as_u16();

    let detail = if is_json(content_type) {
        match response.bytes().await {
            Ok(body) => json_detail(&body),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read JSON error body");
                None
            }
        }
    } else {
        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read error body");
                None
            }
        }
    };

    detail.unwrap_or_else(|| fallback_detail(status))
}
