//! Legacy SHA-1 checksum discipline
//!
//! Manifest feeds historically publish SHA-1 digests; this module keeps that
//! verification path separate from the installer's SHA-256 discipline.
//! Checksum sidecar files carry the digest as the first token of the first
//! non-blank line (anything after it, usually a filename, is ignored).

use std::io::Read;
use std::path::Path;

use sha1::{Digest, Sha1};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use droidhome_core::{Result, ToolchainError};

/// Compute SHA-1 over `path` and compare case-insensitively against
/// `expected` hex. Any I/O failure is a verification failure, never an
/// error.
pub fn verify_checksum(path: &Path, expected: &str) -> bool {
    let actual = match sha1_file(path) {
        Ok(digest) => digest,
        Err(e) => {
            warn!("Could not hash {:?}: {}", path, e);
            return false;
        }
    };

    let matches = actual.eq_ignore_ascii_case(expected.trim());
    if matches {
        debug!("SHA-1 verified for {:?}", path);
    } else {
        warn!(
            "SHA-1 mismatch for {:?}: expected {}, got {}",
            path, expected, actual
        );
    }
    matches
}

fn sha1_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Extract the digest from checksum sidecar text: first whitespace-delimited
/// token of the first non-blank line.
pub fn parse_checksum_file(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split_whitespace().next())
        .map(String::from)
}

/// Fetch a checksum sidecar over HTTP and extract the digest.
pub async fn fetch_checksum(
    url: &str,
    client: &reqwest::Client,
    cancel: &CancellationToken,
) -> Result<Option<String>> {
    let body = tokio::select! {
        _ = cancel.cancelled() => return Err(ToolchainError::Cancelled),
        response = client.get(url).send() => {
            let response = response
                .and_then(|r| r.error_for_status())
                .map_err(|e| ToolchainError::Network(e.to_string()))?;
            response
                .text()
                .await
                .map_err(|e| ToolchainError::Network(e.to_string()))?
        }
    };
    Ok(parse_checksum_file(&body))
}
