//! Subtitler CLI — command-line client for the subtitle burn-in service.
//!
//! Set SUBTITLER_API_BASE (or API_BASE), or pass --api-base.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use subtitler_api_client::{CancellationToken, Payload, SubtitleClient, UploadRequest};
use subtitler_cli::{default_output_path, describe_upload_error, format_size, init_tracing};
use subtitler_core::config::timeout_from_secs;
use subtitler_core::validation::validate_media_file;
use subtitler_core::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "subtitler", about = "Subtitle burn-in service CLI")]
struct Cli {
    /// Base URL of the subtitle service (overrides SUBTITLER_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Burn English subtitles into a video
    En {
        /// Path to the video to upload
        file: PathBuf,
        /// Where to write the subtitled video (default: <stem>_subs.mp4)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Abort the upload after this many seconds (0 disables the timeout)
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Skip the local extension and size checks
        #[arg(long)]
        skip_validation: bool,
    },
    /// Check that the service is up
    Health,
}

#[derive(Serialize)]
struct EnSummary {
    input: String,
    output: String,
    content_type: String,
    size_bytes: usize,
    size: String,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let api_base = cli.api_base.or(config.api_base.clone());

    let client = SubtitleClient::new()?;

    match cli.command {
        Commands::En {
            file,
            output,
            timeout_secs,
            skip_validation,
        } => {
            if !skip_validation {
                validate_media_file(
                    &file,
                    &config.allowed_extensions,
                    config.max_file_size_bytes,
                )?;
            }

            let payload = Payload::from_path(&file)
                .await
                .with_context(|| format!("Failed to read file: {}", file.display()))?;

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, cancelling upload");
                    on_ctrl_c.cancel();
                }
            });

            let mut request = UploadRequest::new(payload).with_cancellation(cancel);
            request.api_base = api_base;
            request.timeout = match timeout_secs {
                Some(secs) => timeout_from_secs(secs),
                None => config.timeout,
            };

            tracing::info!(file = %file.display(), "Uploading video");
            let artifact = client
                .post_english_subtitles(request)
                .await
                .map_err(|e| anyhow::anyhow!(describe_upload_error(&e)))?;

            let output = output.unwrap_or_else(|| default_output_path(&file));
            tokio::fs::write(&output, &artifact.bytes)
                .await
                .with_context(|| format!("Failed to write output: {}", output.display()))?;

            print_json(&EnSummary {
                input: file.display().to_string(),
                output: output.display().to_string(),
                content_type: artifact.content_type.clone(),
                size_bytes: artifact.len(),
                size: format_size(artifact.len() as u64),
            })?;
        }
        Commands::Health => {
            let api_base = api_base.context(
                "API base URL is not configured. Set SUBTITLER_API_BASE or pass --api-base",
            )?;
            let ok = client.health(&api_base).await?;
            print_json(&serde_json::json!({ "ok": ok, "api_base": api_base }))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_without_touching_environment() {
        std::env::set_var("SUBTITLER_TIMEOUT_SECS", "soon");

        let cli = Cli::try_parse_from(["subtitler", "en", "clip.mp4", "--timeout-secs", "0"])
            .expect("arguments should parse regardless of configuration");
        match cli.command {
            Commands::En { timeout_secs, .. } => assert_eq!(timeout_secs, Some(0)),
            Commands::Health => panic!("expected en subcommand"),
        }

        let help = Cli::try_parse_from(["subtitler", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

        std::env::remove_var("SUBTITLER_TIMEOUT_SECS");
    }
}
