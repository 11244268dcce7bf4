//! Archive extraction
//!
//! Zip archives are extracted in-process with a strict no-escape check on
//! every entry path (zip-slip protection); tar.gz archives are delegated to
//! the system `tar` binary. Executable bits on extracted `bin/` entries are
//! restored explicitly afterwards, since archive formats do not guarantee
//! they survive.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use droidhome_core::{Result, ToolchainError};

/// Extract a zip archive into `target_dir`.
///
/// Any entry whose resolved path would land outside `target_dir` aborts the
/// whole extraction; there is no partial-success mode. Cancellation is
/// checked once per entry.
pub async fn extract_zip(
    archive: &Path,
    target_dir: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    info!("Extracting {:?} to {:?}", archive, target_dir);

    let archive = archive.to_path_buf();
    let target_dir_owned = target_dir.to_path_buf();
    let cancel = cancel.clone();

    // the zip crate is synchronous
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::open(&archive)?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| ToolchainError::Extraction(e.to_string()))?;

        for i in 0..zip.len() {
            if cancel.is_cancelled() {
                return Err(ToolchainError::Cancelled);
            }

            let mut entry = zip
                .by_index(i)
                .map_err(|e| ToolchainError::Extraction(e.to_string()))?;

            // zip-slip protection: reject any entry that resolves outside
            // the destination root
            let relative = entry.enclosed_name().map(PathBuf::from).ok_or_else(|| {
                ToolchainError::PathTraversal {
                    entry: PathBuf::from(entry.name()),
                    root: target_dir_owned.clone(),
                }
            })?;
            let outpath = target_dir_owned.join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)?;
            } else {
                if let Some(parent) = outpath.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut outfile = std::fs::File::create(&outpath)?;
                std::io::copy(&mut entry, &mut outfile)?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                        .ok();
                }
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| ToolchainError::Extraction(e.to_string()))??;

    restore_bin_executable_bits(target_dir)?;
    Ok(())
}

/// Extract a tar.gz archive into `target_dir` with the system `tar` binary.
///
/// A non-zero exit is a hard failure carrying the captured stderr.
pub async fn extract_tar_gz(
    archive: &Path,
    target_dir: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    info!("Extracting {:?} to {:?} via tar", archive, target_dir);
    tokio::fs::create_dir_all(target_dir).await?;

    let mut command = tokio::process::Command::new("tar");
    command
        .arg("-xzf")
        .arg(archive)
        .arg("-C")
        .arg(target_dir)
        .kill_on_drop(true);

    let output = tokio::select! {
        _ = cancel.cancelled() => return Err(ToolchainError::Cancelled),
        output = command.output() => output?,
    };

    if !output.status.success() {
        return Err(ToolchainError::ExternalTool {
            tool: "tar".to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    restore_bin_executable_bits(target_dir)?;
    Ok(())
}

/// Mark every file under a `bin/` directory executable.
///
/// A toolchain whose launchers lost their executable bit is unusable, so a
/// failure here is a hard error, not a warning.
#[cfg(unix)]
pub fn restore_bin_executable_bits(root: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fn walk(dir: &Path, in_bin: bool) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                let is_bin = in_bin || entry.file_name() == "bin";
                walk(&path, is_bin)?;
            } else if in_bin && file_type.is_file() {
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
                debug!("Restored executable bit on {:?}", path);
            }
        }
        Ok(())
    }

    walk(root, false)
}

#[cfg(not(unix))]
pub fn restore_bin_executable_bits(_root: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extract_zip_basic() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        make_zip(
            &archive,
            &[
                ("jdk-17/release", b"JAVA_VERSION=\"17\"\n"),
                ("jdk-17/bin/java", b"#!/bin/sh\n"),
            ],
        );

        let dest = dir.path().join("out");
        extract_zip(&archive, &dest, &CancellationToken::new())
            .await
            .unwrap();

        assert!(dest.join("jdk-17/release").is_file());
        let java = dest.join("jdk-17/bin/java");
        assert!(java.is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&java).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111, "bin entry must be executable");
        }
    }

    #[tokio::test]
    async fn test_zip_slip_entry_aborts_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        make_zip(
            &archive,
            &[("ok.txt", b"fine"), ("../../evil.txt", b"escaped")],
        );

        let dest = dir.path().join("inner").join("out");
        std::fs::create_dir_all(&dest).unwrap();

        let err = extract_zip(&archive, &dest, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::PathTraversal { .. }));

        // nothing may exist outside the destination root
        assert!(!dir.path().join("evil.txt").exists());
        assert!(!dir.path().join("inner").join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_extract_zip_respects_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        make_zip(&archive, &[("file.txt", b"data")]);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = extract_zip(&archive, &dir.path().join("out"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Cancelled));
    }

    #[tokio::test]
    async fn test_tar_gz_roundtrip_via_system_tar() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tree");
        std::fs::create_dir_all(source.join("bin")).unwrap();
        std::fs::write(source.join("bin/java"), b"launcher").unwrap();

        let archive = dir.path().join("tree.tar.gz");
        let status = std::process::Command::new("tar")
            .arg("-czf")
            .arg(&archive)
            .arg("-C")
            .arg(dir.path())
            .arg("tree")
            .status()
            .unwrap();
        assert!(status.success());

        let dest = dir.path().join("out");
        extract_tar_gz(&archive, &dest, &CancellationToken::new())
            .await
            .unwrap();
        assert!(dest.join("tree/bin/java").is_file());
    }

    #[tokio::test]
    async fn test_tar_gz_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("not-an-archive.tar.gz");
        std::fs::write(&archive, b"garbage").unwrap();

        let err = extract_tar_gz(&archive, &dir.path().join("out"), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ToolchainError::ExternalTool { tool, stderr, .. } => {
                assert_eq!(tool, "tar");
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
