//! JDK probing
//!
//! One generic scanner driven by a table of `ScanSpec` entries instead of a
//! probe type per vendor. Each entry names the vendor and where to look; the
//! scanner turns entries into candidate paths and validates every path
//! against the JDK home layout contract.
//!
//! Enumeration is lazy and restartable: every call re-touches the
//! filesystem/registry, nothing is memoized. Per-candidate failures are
//! logged and swallowed, a probe never errors out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::candidate::JdkCandidate;
use crate::config_file::read_java_sdk_paths;
use crate::registry::{glob_to_regex, RegistryAccess, ALL_HIVES, ALL_VIEWS};
use crate::release::{parse_property_settings, parse_release_file};

/// Where one vendor's installations may live.
#[derive(Debug, Clone)]
pub enum ScanKind {
    /// A path that is itself a JDK home.
    JdkHome(PathBuf),
    /// A directory whose immediate children are JDK homes
    /// (e.g. `C:\Program Files\Eclipse Adoptium`, `/usr/lib/jvm`).
    JdkContainer(PathBuf),
    /// Subkeys of `parent_key` matching `key_glob`, each carrying the home
    /// path in `value_name`. Both registry views and both hives are scanned.
    Registry {
        parent_key: String,
        key_glob: String,
        value_name: &'static str,
    },
    /// A single registry value holding a home path directly.
    RegistryValue {
        key: String,
        value_name: &'static str,
    },
    /// A Unix config XML with `java-sdk path="..."` override elements.
    ConfigFile(PathBuf),
}

/// One row of the vendor scan table.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    pub vendor: &'static str,
    pub kind: ScanKind,
}

impl ScanSpec {
    pub fn new(vendor: &'static str, kind: ScanKind) -> Self {
        Self { vendor, kind }
    }
}

/// Lazily yield validated candidates for every entry of `specs`, in table
/// order. Re-enumerating runs the scans again.
pub fn scan<'a>(
    specs: &'a [ScanSpec],
    registry: &'a dyn RegistryAccess,
) -> impl Iterator<Item = JdkCandidate> + 'a {
    specs
        .iter()
        .flat_map(move |spec| candidate_paths(spec, registry))
        .filter_map(|(home, locator)| probe_home(&home, &locator))
}

/// Expand one scan table row into (path, locator label) pairs.
fn candidate_paths(spec: &ScanSpec, registry: &dyn RegistryAccess) -> Vec<(PathBuf, String)> {
    match &spec.kind {
        ScanKind::JdkHome(path) => {
            vec![(path.clone(), format!("{} @ {}", spec.vendor, path.display()))]
        }
        ScanKind::JdkContainer(container) => {
            let entries = match std::fs::read_dir(container) {
                Ok(entries) => entries,
                // missing directory or permission failure is "not found"
                Err(_) => return Vec::new(),
            };
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .map(|path| {
                    let locator = format!("{} @ {}", spec.vendor, path.display());
                    (path, locator)
                })
                .collect()
        }
        ScanKind::Registry {
            parent_key,
            key_glob,
            value_name,
        } => {
            let pattern = glob_to_regex(key_glob);
            let mut found = Vec::new();
            for hive in ALL_HIVES {
                for view in ALL_VIEWS {
                    for name in registry.subkeys(hive, view, parent_key) {
                        if !pattern.is_match(&name) {
                            continue;
                        }
                        let key = format!("{}\\{}", parent_key, name);
                        if let Some(home) = registry.get_string(hive, view, &key, value_name) {
                            let locator =
                                format!("Windows Registry @ {}\\{}", hive.as_str(), key);
                            found.push((PathBuf::from(home), locator));
                        }
                    }
                }
            }
            found
        }
        ScanKind::RegistryValue { key, value_name } => {
            let mut found = Vec::new();
            for hive in ALL_HIVES {
                for view in ALL_VIEWS {
                    if let Some(home) = registry.get_string(hive, view, key, value_name) {
                        let locator = format!("Windows Registry @ {}\\{}", hive.as_str(), key);
                        found.push((PathBuf::from(home), locator));
                    }
                }
            }
            found
        }
        ScanKind::ConfigFile(path) => read_java_sdk_paths(path)
            .into_iter()
            .map(|home| (home, format!("config file @ {}", path.display())))
            .collect(),
    }
}

/// Validate a path as a JDK home and collect its metadata.
///
/// Malformed or inaccessible candidates are dropped with a log entry, never
/// an error.
pub fn probe_home(path: &Path, locator: &str) -> Option<JdkCandidate> {
    // macOS installs are bundles with the real home under Contents/Home
    let bundle_home = path.join("Contents").join("Home");
    let home = if bundle_home.is_dir() {
        bundle_home
    } else {
        path.to_path_buf()
    };

    if !has_jdk_layout(&home) {
        debug!("Skipping {:?}: missing bin/java, bin/javac, or bin/jar", home);
        return None;
    }

    let release = read_release(&home);
    let java_properties = query_java_properties(&home);

    if release.is_empty() && java_properties.is_empty() {
        warn!(
            "Skipping {:?}: neither a release file nor java -version output was usable",
            home
        );
        return None;
    }

    Some(JdkCandidate::new(home, locator, release, java_properties))
}

/// The filesystem layout contract for a JDK home.
fn has_jdk_layout(home: &Path) -> bool {
    let bin = home.join("bin");
    ["java", "javac", "jar"].iter().all(|tool| {
        let unix = bin.join(tool);
        let windows = bin.join(format!("{}.exe", tool));
        unix.is_file() || windows.is_file()
    })
}

fn read_release(home: &Path) -> HashMap<String, String> {
    match std::fs::read_to_string(home.join("release")) {
        Ok(text) => parse_release_file(&text),
        Err(_) => HashMap::new(),
    }
}

/// Run the `java` launcher with `-XshowSettings:properties -version` and
/// parse the diagnostic output. Any failure degrades to an empty map.
fn query_java_properties(home: &Path) -> HashMap<String, Vec<String>> {
    let java = if cfg!(windows) {
        home.join("bin").join("java.exe")
    } else {
        home.join("bin").join("java")
    };

    let output = match Command::new(&java)
        .args(["-XshowSettings:properties", "-version"])
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Could not run {:?}: {}", java, e);
            return HashMap::new();
        }
    };

    if !output.status.success() {
        warn!("{:?} -version exited with {}", java, output.status);
        return HashMap::new();
    }

    // the settings block goes to stderr
    parse_property_settings(&String::from_utf8_lossy(&output.stderr))
}
