//! Download and install pipeline
//!
//! Fetches a component archive, verifies its digest, extracts it with
//! path-traversal protection, and relocates it into place with
//! backup-and-rollback. Progress is reported per phase through a callback;
//! every async operation is cancellable via a `CancellationToken`.

pub mod download;
pub mod extract;
pub mod install;
pub mod pipeline;
pub mod progress;
pub mod verify;

pub use download::Downloader;
pub use extract::{extract_tar_gz, extract_zip};
pub use install::move_with_rollback;
pub use pipeline::Installer;
pub use progress::{InstallPhase, ProgressCallback};
pub use verify::verify_digest;
