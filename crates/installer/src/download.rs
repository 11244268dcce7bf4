//! Streaming download
//!
//! Streams a response body to disk in chunks, never buffering the whole
//! archive in memory, with per-chunk progress and cancellation.

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use droidhome_core::{Result, ToolchainError};

use crate::progress::{report, InstallPhase, ProgressCallback};

/// HTTP downloader for component archives.
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download `url` to `target`, reporting progress after every chunk.
    ///
    /// Percent complete comes from the `Content-Length` header, falling back
    /// to `expected_size` when the header is absent. Cancellation is checked
    /// at chunk granularity. Returns the number of bytes written.
    pub async fn download(
        &self,
        url: &str,
        target: &Path,
        expected_size: Option<u64>,
        cancel: &CancellationToken,
        progress: Option<&ProgressCallback>,
    ) -> Result<u64> {
        info!("Downloading {} to {:?}", url, target);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ToolchainError::Cancelled),
            response = self.client.get(url).send() => response
                .and_then(|r| r.error_for_status())
                .map_err(|e| ToolchainError::Network(e.to_string()))?,
        };

        let total = response.content_length().or(expected_size).unwrap_or(0);
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(target).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = tokio::select! {
            _ = cancel.cancelled() => return Err(ToolchainError::Cancelled),
            chunk = stream.next() => chunk,
        } {
            let chunk = chunk.map_err(|e| ToolchainError::Download(e.to_string()))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            let percent = if total > 0 {
                (downloaded as f32 / total as f32) * 100.0
            } else {
                0.0
            };
            report(
                progress,
                InstallPhase::Downloading,
                percent,
                &format!("{} / {} bytes", downloaded, total),
            );
        }

        file.flush().await?;
        debug!("Download complete: {} bytes to {:?}", downloaded, target);
        Ok(downloaded)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let dir = tempfile::tempdir().unwrap();
        let err = Downloader::new()
            .download(
                "http://127.0.0.1:9/never",
                &dir.path().join("out.zip"),
                None,
                &cancel,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Cancelled));
    }
}
