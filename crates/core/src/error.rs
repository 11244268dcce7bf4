//! Error types for droidhome
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for droidhome operations
#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("unsupported manifest format: document starts with {0:?}")]
    UnsupportedManifest(char),

    #[error("unsupported version format: {0}")]
    UnsupportedVersion(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("download error: {0}")]
    Download(String),

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("archive entry {entry:?} escapes extraction root {root:?}")]
    PathTraversal { entry: PathBuf, root: PathBuf },

    #[error("{tool} exited with {status}: {stderr}")]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("install error: {0}")]
    Install(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cancelled")]
    Cancelled,
}

/// Result type alias for droidhome operations
pub type Result<T> = std::result::Result<T, ToolchainError>;

impl ToolchainError {
    /// Check if this error is recoverable by retrying the operation
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ToolchainError::Network(_) | ToolchainError::Download(_) | ToolchainError::Cancelled
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ToolchainError::Io(e) => format!("File operation failed: {}", e),
            ToolchainError::Network(msg) => {
                format!("Network error: {}. Please check your connection.", msg)
            }
            ToolchainError::Download(msg) => format!("Download failed: {}", msg),
            ToolchainError::NotFound(msg) => format!("Not found: {}", msg),
            ToolchainError::Cancelled => "Operation was cancelled".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ToolchainError::Network("timed out".into()).is_recoverable());
        assert!(!ToolchainError::ChecksumMismatch {
            path: PathBuf::from("a.zip"),
            expected: "aa".into(),
            actual: "bb".into(),
        }
        .is_recoverable());
    }

    #[test]
    fn test_checksum_message_names_path_and_digests() {
        let err = ToolchainError::ChecksumMismatch {
            path: PathBuf::from("pkg.zip"),
            expected: "deadbeef".into(),
            actual: "cafebabe".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("pkg.zip"));
        assert!(msg.contains("deadbeef"));
        assert!(msg.contains("cafebabe"));
    }
}
