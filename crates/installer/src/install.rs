//! Final placement
//!
//! Moving the extracted tree into its destination is the one step that can
//! destroy an existing install, so it runs with a backup: the old target is
//! renamed aside first and restored if the move fails.

use std::path::Path;

use tracing::{debug, info, warn};

use droidhome_core::{Result, ToolchainError};

/// Move `source` to `target`, preserving any existing `target` until the
/// move has succeeded.
///
/// If a tree already exists at `target` it is renamed to a `.backup` sibling
/// before the move; on failure the backup is restored, on success it is
/// deleted. The rollback itself is best effort.
pub fn move_with_rollback(source: &Path, target: &Path) -> Result<()> {
    info!("Moving {:?} to {:?}", source, target);

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let backup = backup_path(target)?;
    let had_existing = target.exists();

    if had_existing {
        if backup.exists() {
            std::fs::remove_dir_all(&backup)?;
        }
        std::fs::rename(target, &backup)?;
        debug!("Backed up existing {:?} to {:?}", target, backup);
    }

    match std::fs::rename(source, target) {
        Ok(()) => {
            if had_existing {
                if let Err(e) = std::fs::remove_dir_all(&backup) {
                    warn!("Failed to remove backup {:?}: {}", backup, e);
                }
            }
            Ok(())
        }
        Err(e) => {
            if had_existing {
                if let Err(restore_err) = std::fs::rename(&backup, target) {
                    warn!(
                        "Failed to restore {:?} from backup {:?}: {}",
                        target, backup, restore_err
                    );
                }
            }
            Err(e.into())
        }
    }
}

fn backup_path(target: &Path) -> Result<std::path::PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| ToolchainError::Install(format!("invalid install target {:?}", target)))?;
    let mut backup_name = name.to_os_string();
    backup_name.push(".backup");
    Ok(target.with_file_name(backup_name))
}
