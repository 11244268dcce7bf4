//! Install pipeline
//!
//! Drives one component from manifest entry to installed directory:
//! resolve, download, verify, extract, move into place. All intermediate
//! state lives in a unique temp directory under the destination's parent so
//! the final placement is a same-filesystem rename.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use droidhome_core::{HostArch, HostOs, Result, ToolchainError};
use droidhome_sdk_repository::{ArchiveInfo, ManifestFeed};

use crate::download::Downloader;
use crate::extract::{extract_tar_gz, extract_zip};
use crate::install::move_with_rollback;
use crate::progress::{report, InstallPhase, ProgressCallback};
use crate::verify::verify_digest;

/// Orchestrates the download/verify/extract/install sequence for a single
/// package archive.
pub struct Installer {
    downloader: Downloader,
}

impl Installer {
    pub fn new() -> Self {
        Self {
            downloader: Downloader::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            downloader: Downloader::with_client(client),
        }
    }

    /// Install the package identified by `package_path` from `feed` into
    /// `target`, which becomes the component's root directory.
    ///
    /// Returns the installed path. An existing install at `target` survives
    /// any failure and is replaced atomically on success.
    pub async fn install_package(
        &self,
        feed: &ManifestFeed,
        package_path: &str,
        target: &Path,
        cancel: &CancellationToken,
        progress: Option<&ProgressCallback>,
    ) -> Result<PathBuf> {
        report(
            progress,
            InstallPhase::ReadingManifest,
            0.0,
            &format!("resolving {package_path}"),
        );

        let os = HostOs::current().as_str();
        let arch = HostArch::current().as_str();
        let package = feed
            .resolve_package(package_path, Some(os), Some(arch))
            .ok_or_else(|| {
                ToolchainError::NotFound(format!(
                    "package {package_path:?} for {os}/{arch}"
                ))
            })?;
        let archive = package.best_archive_for_current_system().ok_or_else(|| {
            ToolchainError::NotFound(format!(
                "archive of {package_path:?} for {os}/{arch}"
            ))
        })?;
        info!(
            "Installing {} ({}) from {}",
            package.path,
            package.display_name.as_deref().unwrap_or("unnamed"),
            archive.url
        );

        // staging under the destination's parent keeps the final move a rename
        let staging_parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&staging_parent)?;
        let staging = tempfile::Builder::new()
            .prefix(".droidhome-install-")
            .tempdir_in(&staging_parent)?;

        let archive_path = staging.path().join(archive_file_name(&archive.url));

        report(progress, InstallPhase::Downloading, 0.0, &archive.url);
        if archive.url.contains("://") {
            self.downloader
                .download(&archive.url, &archive_path, archive.size, cancel, progress)
                .await?;
        } else {
            // schemeless sources are local files, matching how cached feeds
            // resolve without the network
            tokio::fs::copy(&archive.url, &archive_path).await?;
        }

        report(
            progress,
            InstallPhase::Verifying,
            0.0,
            &format!("{:?}", archive_path.file_name().unwrap_or_default()),
        );
        match &archive.checksum {
            Some(expected) => {
                verify_digest(&archive_path, archive.checksum_kind, expected).await?;
            }
            None => {
                warn!("No checksum declared for {}; skipping verification", archive.url);
            }
        }

        let extract_dir = staging.path().join("extracted");
        report(progress, InstallPhase::Extracting, 0.0, "unpacking archive");
        if is_tar_gz(&archive.url) {
            extract_tar_gz(&archive_path, &extract_dir, cancel).await?;
        } else {
            extract_zip(&archive_path, &extract_dir, cancel).await?;
        }

        // archives usually wrap everything in a single top-level directory
        let source = single_top_level_dir(&extract_dir)?.unwrap_or(extract_dir);
        move_with_rollback(&source, target)?;

        report(
            progress,
            InstallPhase::Complete,
            100.0,
            &format!("installed to {}", target.display()),
        );
        Ok(target.to_path_buf())
    }

    /// Pick the archive the pipeline would install on this machine, for
    /// callers that want to show it before committing to a download.
    pub fn archive_for_current_system(
        feed: &ManifestFeed,
        package_path: &str,
    ) -> Option<ArchiveInfo> {
        feed.resolve_package(package_path, Some(HostOs::current().as_str()), None)
            .and_then(|p| p.best_archive_for_current_system().cloned())
    }
}

impl Default for Installer {
    fn default() -> Self {
        Self::new()
    }
}

fn archive_file_name(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("archive.zip")
        .to_string()
}

fn is_tar_gz(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.ends_with(".tar.gz") || lower.ends_with(".tgz")
}

/// If `dir` contains exactly one entry and it is a directory, return it.
fn single_top_level_dir(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?;
    let first = match entries.next() {
        Some(entry) => entry?,
        None => return Ok(None),
    };
    if entries.next().is_some() {
        return Ok(None);
    }
    if first.file_type()?.is_dir() {
        Ok(Some(first.path()))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use droidhome_sdk_repository::ChecksumKind;

    fn make_zip(path: &Path, entries: &[(&str, &[u8])]) -> Vec<u8> {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        std::fs::read(path).unwrap()
    }

    fn sha256_hex(data: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(data))
    }

    fn feed_for(archive_path: &Path, checksum: &str) -> ManifestFeed {
        let os = HostOs::current().as_str();
        let manifest = format!(
            r#"{{"packages":[{{
                "id": "cmdline-tools;20.0",
                "displayName": "Command-line Tools",
                "archives": [{{
                    "url": "{}",
                    "sha256": "{}",
                    "os": "{}"
                }}]
            }}]}}"#,
            archive_path.display(),
            checksum,
            os
        );
        let mut feed = ManifestFeed::new();
        feed.load_from_str(&manifest, "unit test").unwrap();
        feed
    }

    #[tokio::test]
    async fn test_install_local_zip_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tools.zip");
        let bytes = make_zip(
            &archive,
            &[
                ("cmdline-tools/bin/sdkmanager", b"#!/bin/sh\n".as_slice()),
                ("cmdline-tools/NOTICE.txt", b"notice".as_slice()),
            ],
        );
        let feed = feed_for(&archive, &sha256_hex(&bytes));

        let phases = Arc::new(AtomicUsize::new(0));
        let phases_seen = phases.clone();
        let progress: ProgressCallback = Box::new(move |phase, _, _| {
            if phase == InstallPhase::Complete {
                phases_seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        let target = dir.path().join("sdk").join("cmdline-tools");
        // the url has no scheme, so it resolves as a local file and the
        // downloader is bypassed
        let installed = Installer::new()
            .install_package(
                &feed,
                "cmdline-tools;20.0",
                &target,
                &CancellationToken::new(),
                Some(&progress),
            )
            .await
            .unwrap();

        assert_eq!(installed, target);
        assert!(target.join("bin/sdkmanager").is_file());
        assert_eq!(phases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_checksum_mismatch_leaves_existing_install() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tools.zip");
        make_zip(&archive, &[("cmdline-tools/bin/sdkmanager", b"new".as_slice())]);
        let feed = feed_for(&archive, "deadbeef");

        let target = dir.path().join("sdk").join("cmdline-tools");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("marker"), b"old").unwrap();

        let err = Installer::new()
            .install_package(
                &feed,
                "cmdline-tools;20.0",
                &target,
                &CancellationToken::new(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::ChecksumMismatch { .. }));
        assert_eq!(std::fs::read(target.join("marker")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_unknown_package_is_not_found() {
        let feed = ManifestFeed::new();
        let dir = tempfile::tempdir().unwrap();

        let err = Installer::new()
            .install_package(
                &feed,
                "ndk;26.1",
                &dir.path().join("ndk"),
                &CancellationToken::new(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::NotFound(_)));
    }

    #[test]
    fn test_archive_file_name_from_url() {
        assert_eq!(
            archive_file_name("https://dl.google.com/android/repository/tools.zip"),
            "tools.zip"
        );
        assert_eq!(archive_file_name("no-slashes.tgz"), "no-slashes.tgz");
    }

    #[test]
    fn test_is_tar_gz() {
        assert!(is_tar_gz("https://x/jdk.tar.gz"));
        assert!(is_tar_gz("https://x/jdk.TGZ"));
        assert!(!is_tar_gz("https://x/jdk.zip"));
    }

    #[test]
    fn test_single_top_level_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(single_top_level_dir(dir.path()).unwrap().is_none());

        std::fs::create_dir(dir.path().join("only")).unwrap();
        assert_eq!(
            single_top_level_dir(dir.path()).unwrap(),
            Some(dir.path().join("only"))
        );

        std::fs::write(dir.path().join("extra"), b"x").unwrap();
        assert!(single_top_level_dir(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_checksum_kind_dispatch_is_per_archive() {
        // legacy feeds declare sha1, modern ones sha256; both must reach
        // the verifier unchanged
        assert_eq!(ChecksumKind::parse("sha1"), ChecksumKind::Sha1);
        assert_eq!(ChecksumKind::parse("sha256"), ChecksumKind::Sha256);
    }
}
