//! Digest verification
//!
//! The install pipeline verifies with SHA-256 by default; SHA-1 support
//! exists here only because older Google feeds still publish SHA-1 digests
//! for their archives. This path fails hard on mismatch, unlike the
//! boolean legacy verifier in the manifest-feed crate.

use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::debug;

use droidhome_core::{Result, ToolchainError};
use droidhome_sdk_repository::ChecksumKind;

/// Compute the digest of `path` with the given algorithm, streaming the
/// file in chunks.
pub async fn digest_file(path: &Path, kind: ChecksumKind) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buffer = vec![0u8; 64 * 1024];

    match kind {
        ChecksumKind::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let read = file.read(&mut buffer).await?;
                if read == 0 {
                    break;
                }
                hasher.update(&buffer[..read]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
        ChecksumKind::Sha1 => {
            let mut hasher = Sha1::new();
            loop {
                let read = file.read(&mut buffer).await?;
                if read == 0 {
                    break;
                }
                hasher.update(&buffer[..read]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

/// Verify `path` against an expected hex digest; a mismatch is a hard,
/// non-recoverable error naming the path and both digests.
pub async fn verify_digest(path: &Path, kind: ChecksumKind, expected: &str) -> Result<()> {
    let actual = digest_file(path, kind).await?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        debug!("Digest verified for {:?}", path);
        Ok(())
    } else {
        Err(ToolchainError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_string(),
            actual,
        })
    }
}
