//! Toolchain context
//!
//! An explicitly constructed snapshot of the machine's toolchain state: the
//! preferred JDK and the Android SDK root. Nothing here is cached behind the
//! caller's back; the snapshot is taken at construction and again on every
//! `refresh()`.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use droidhome_jdk_locator::{JdkCandidate, JdkLocator};

/// A point-in-time view of the installed toolchain.
pub struct ToolchainContext {
    locator: JdkLocator,
    preferred_jdk: Option<JdkCandidate>,
    sdk_root: Option<PathBuf>,
    ndk_root: Option<PathBuf>,
}

impl ToolchainContext {
    /// Scan the machine and build a fresh snapshot.
    pub fn new() -> Self {
        Self::with_locator(JdkLocator::new())
    }

    /// Build a snapshot using a custom locator, e.g. one with a different
    /// scan table.
    pub fn with_locator(locator: JdkLocator) -> Self {
        let mut context = Self {
            locator,
            preferred_jdk: None,
            sdk_root: None,
            ndk_root: None,
        };
        context.refresh();
        context
    }

    /// Re-scan the machine, replacing the snapshot. Installs or removals
    /// that happened since the last scan become visible here and nowhere
    /// earlier.
    pub fn refresh(&mut self) {
        self.preferred_jdk = self.locator.preferred_jdk();
        self.sdk_root = discover_sdk_root();
        self.ndk_root = discover_ndk_root(self.sdk_root.as_deref());
        info!(
            "Toolchain snapshot: jdk={:?} sdk={:?} ndk={:?}",
            self.preferred_jdk.as_ref().map(|j| j.home().to_path_buf()),
            self.sdk_root,
            self.ndk_root
        );
    }

    /// The highest-ranked JDK, honoring the user's explicit preference.
    pub fn preferred_jdk(&self) -> Option<&JdkCandidate> {
        self.preferred_jdk.as_ref()
    }

    /// The Android SDK root, if one was found.
    pub fn sdk_root(&self) -> Option<&Path> {
        self.sdk_root.as_deref()
    }

    /// The Android NDK root, if one was found.
    pub fn ndk_root(&self) -> Option<&Path> {
        self.ndk_root.as_deref()
    }

    /// True when both a JDK and an SDK root are available.
    pub fn is_complete(&self) -> bool {
        self.preferred_jdk.is_some() && self.sdk_root.is_some()
    }

    /// Names of the components the snapshot is missing.
    pub fn missing_components(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.preferred_jdk.is_none() {
            missing.push("JDK");
        }
        if self.sdk_root.is_none() {
            missing.push("Android SDK");
        }
        if self.ndk_root.is_none() {
            missing.push("Android NDK");
        }
        missing
    }
}

impl Default for ToolchainContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the Android SDK root: environment variables first, then the
/// well-known per-OS install locations, keeping the first candidate with a
/// plausible SDK layout.
pub fn discover_sdk_root() -> Option<PathBuf> {
    for path in sdk_root_candidates() {
        if is_sdk_layout(&path) {
            debug!("Android SDK root at {:?}", path);
            return Some(path);
        }
    }
    None
}

fn sdk_root_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    for var in ["ANDROID_HOME", "ANDROID_SDK_ROOT"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                candidates.push(PathBuf::from(value));
            }
        }
    }

    if cfg!(windows) {
        if let Some(local) = dirs::data_local_dir() {
            candidates.push(local.join("Android").join("Sdk"));
        }
        candidates.push(PathBuf::from(r"C:\Program Files (x86)\Android\android-sdk"));
    } else if cfg!(target_os = "macos") {
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join("Library").join("Android").join("sdk"));
        }
    } else {
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join("Android").join("Sdk"));
            candidates.push(home.join("android-sdk"));
        }
        candidates.push(PathBuf::from("/opt/android-sdk"));
        candidates.push(PathBuf::from("/usr/local/android-sdk"));
    }

    candidates
}

/// Find the Android NDK root: `ANDROID_NDK_HOME`/`NDK_ROOT` first, then the
/// versioned `ndk/` directory (and legacy `ndk-bundle`) inside the SDK.
pub fn discover_ndk_root(sdk_root: Option<&Path>) -> Option<PathBuf> {
    for var in ["ANDROID_NDK_HOME", "NDK_ROOT"] {
        if let Ok(value) = env::var(var) {
            let path = PathBuf::from(value);
            if is_ndk_layout(&path) {
                debug!("Android NDK root at {:?} (via {})", path, var);
                return Some(path);
            }
        }
    }

    let sdk_root = sdk_root?;
    let bundle = sdk_root.join("ndk-bundle");
    if is_ndk_layout(&bundle) {
        return Some(bundle);
    }

    // directory names are dotted versions; compare them numerically,
    // lexical order misranks across digit-count boundaries (9.x vs 10.x)
    std::fs::read_dir(sdk_root.join("ndk"))
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| is_ndk_layout(path))
                .max_by_key(|path| ndk_version_key(path))
        })
        .ok()
        .flatten()
}

fn ndk_version_key(path: &Path) -> Vec<u64> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            name.split('.')
                .map_while(|component| component.parse::<u64>().ok())
                .collect()
        })
        .unwrap_or_default()
}

fn is_ndk_layout(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let ndk_build = if cfg!(windows) {
        path.join("ndk-build.cmd")
    } else {
        path.join("ndk-build")
    };
    path.join("source.properties").is_file() || ndk_build.is_file()
}

/// An SDK root must hold at least one of the directories every real install
/// has.
fn is_sdk_layout(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    ["platforms", "platform-tools", "build-tools", "cmdline-tools"]
        .iter()
        .any(|dir| path.join(dir).is_dir())
}
