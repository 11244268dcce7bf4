//! JDK selection
//!
//! Aggregates every vendor scan set for the current platform, dedupes, and
//! ranks by version to pick a preferred JDK. An explicitly configured path
//! (Windows registry value or Unix config file) always wins over anything
//! auto-discovered, regardless of version.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::candidate::JdkCandidate;
use crate::config_file::default_config_path;
use crate::probe::{scan, ScanKind, ScanSpec};
use crate::registry::{NoRegistry, RegistryAccess};

/// Registry key holding the explicitly configured JDK path on Windows.
pub const PREFERRED_JDK_KEY: &str = r"SOFTWARE\droidhome";
/// Value name under [`PREFERRED_JDK_KEY`].
pub const PREFERRED_JDK_VALUE: &str = "JavaSdkDirectory";

/// Discovers and ranks JDK installations.
///
/// Explicitly constructed and stateless between calls: every query re-runs
/// the scans against the live filesystem and registry.
pub struct JdkLocator {
    registry: Box<dyn RegistryAccess + Send + Sync>,
    vendor_specs: Vec<ScanSpec>,
    preferred_specs: Vec<ScanSpec>,
}

impl JdkLocator {
    /// Locator with the built-in vendor table for the current platform and
    /// no registry access (the default off Windows).
    pub fn new() -> Self {
        Self {
            registry: Box::new(NoRegistry),
            vendor_specs: default_vendor_specs(),
            preferred_specs: default_preferred_specs(),
        }
    }

    /// Supply a registry implementation (the host provides one on Windows).
    pub fn with_registry(mut self, registry: Box<dyn RegistryAccess + Send + Sync>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the vendor scan table.
    pub fn with_vendor_specs(mut self, specs: Vec<ScanSpec>) -> Self {
        self.vendor_specs = specs;
        self
    }

    /// Replace the explicit-configuration scan table.
    pub fn with_preferred_specs(mut self, specs: Vec<ScanSpec>) -> Self {
        self.preferred_specs = specs;
        self
    }

    /// Every JDK discoverable on this system, deduplicated and sorted
    /// newest-first. Candidates whose version cannot be derived sort last.
    pub fn known_jdks(&self) -> Vec<JdkCandidate> {
        let candidates: Vec<JdkCandidate> =
            scan(&self.vendor_specs, self.registry.as_ref()).collect();
        debug!("Probes yielded {} raw candidates", candidates.len());
        let ranked = rank(candidates);
        info!("Found {} JDK installations", ranked.len());
        ranked
    }

    /// Like [`known_jdks`](Self::known_jdks), but explicitly configured
    /// installations come first regardless of version.
    pub fn preferred_jdks(&self) -> Vec<JdkCandidate> {
        let configured: Vec<JdkCandidate> =
            scan(&self.preferred_specs, self.registry.as_ref()).collect();

        let mut seen: HashSet<PathBuf> = configured
            .iter()
            .map(|c| canonical_home(c))
            .collect();

        let mut result = configured;
        for candidate in self.known_jdks() {
            if seen.insert(canonical_home(&candidate)) {
                result.push(candidate);
            }
        }
        result
    }

    /// The single best JDK, if any.
    pub fn preferred_jdk(&self) -> Option<JdkCandidate> {
        self.preferred_jdks().into_iter().next()
    }
}

impl Default for JdkLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Dedupe by canonical home path and sort descending by version.
///
/// The sort is stable, so candidates comparing equal keep the scan-table
/// order: the vendor-priority tie-break is the table, not incidental
/// enumeration order.
pub fn rank(candidates: Vec<JdkCandidate>) -> Vec<JdkCandidate> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut unique: Vec<JdkCandidate> = candidates
        .into_iter()
        .filter(|candidate| seen.insert(canonical_home(candidate)))
        .collect();

    unique.sort_by(|a, b| match (a.version().ok(), b.version().ok()) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    unique
}

fn canonical_home(candidate: &JdkCandidate) -> PathBuf {
    std::fs::canonicalize(candidate.home()).unwrap_or_else(|_| candidate.home().to_path_buf())
}

/// Built-in vendor scan table for the current platform, in priority order.
pub fn default_vendor_specs() -> Vec<ScanSpec> {
    let mut specs = Vec::new();

    if let Ok(java_home) = std::env::var("JAVA_HOME") {
        if !java_home.is_empty() {
            specs.push(ScanSpec::new(
                "JAVA_HOME",
                ScanKind::JdkHome(PathBuf::from(java_home)),
            ));
        }
    }

    if cfg!(windows) {
        for (vendor, dir) in [
            ("Microsoft", r"C:\Program Files\Microsoft"),
            ("Eclipse Adoptium", r"C:\Program Files\Eclipse Adoptium"),
            ("Eclipse Foundation", r"C:\Program Files\Eclipse Foundation"),
            ("Azul Zulu", r"C:\Program Files\Zulu"),
            ("Oracle", r"C:\Program Files\Java"),
            ("Visual Studio", r"C:\Program Files (x86)\Android\openjdk"),
            ("Legacy toolchain", r"C:\Program Files (x86)\Android\jdk"),
        ] {
            specs.push(ScanSpec::new(vendor, ScanKind::JdkContainer(PathBuf::from(dir))));
        }
        specs.push(ScanSpec::new(
            "Azul Zulu",
            ScanKind::Registry {
                parent_key: r"SOFTWARE\Azul Systems\Zulu".to_string(),
                key_glob: "zulu-*".to_string(),
                value_name: "InstallationPath",
            },
        ));
        specs.push(ScanSpec::new(
            "Oracle",
            ScanKind::Registry {
                parent_key: r"SOFTWARE\JavaSoft\JDK".to_string(),
                key_glob: "*".to_string(),
                value_name: "JavaHome",
            },
        ));
    } else if cfg!(target_os = "macos") {
        for (vendor, dir) in [
            ("JavaVirtualMachines", "/Library/Java/JavaVirtualMachines"),
            ("JavaVirtualMachines", "/System/Library/Java/JavaVirtualMachines"),
        ] {
            specs.push(ScanSpec::new(vendor, ScanKind::JdkContainer(PathBuf::from(dir))));
        }
        if let Some(home) = dirs::home_dir() {
            specs.push(ScanSpec::new(
                "JavaVirtualMachines",
                ScanKind::JdkContainer(home.join("Library/Java/JavaVirtualMachines")),
            ));
        }
    } else {
        for (vendor, dir) in [
            ("OpenJDK", "/usr/lib/jvm"),
            ("Oracle", "/usr/java"),
            ("Generic", "/usr/local/java"),
            ("Generic", "/opt/java"),
        ] {
            specs.push(ScanSpec::new(vendor, ScanKind::JdkContainer(PathBuf::from(dir))));
        }
    }

    if !cfg!(windows) {
        if let Some(home) = dirs::home_dir() {
            specs.push(ScanSpec::new(
                "SDKMAN",
                ScanKind::JdkContainer(home.join(".sdkman/candidates/java")),
            ));
            specs.push(ScanSpec::new(
                "User JDKs",
                ScanKind::JdkContainer(home.join(".jdks")),
            ));
        }
    }

    // lowest priority: whatever java is first on PATH
    if let Ok(java) = which::which("java") {
        if let Some(home) = java.parent().and_then(|bin| bin.parent()) {
            specs.push(ScanSpec::new("PATH", ScanKind::JdkHome(home.to_path_buf())));
        }
    }

    specs
}

/// Explicit-configuration scan table: the Windows registry value or the Unix
/// config file.
pub fn default_preferred_specs() -> Vec<ScanSpec> {
    if cfg!(windows) {
        vec![ScanSpec::new(
            "Preferred",
            ScanKind::RegistryValue {
                key: PREFERRED_JDK_KEY.to_string(),
                value_name: PREFERRED_JDK_VALUE,
            },
        )]
    } else {
        match default_config_path() {
            Some(path) => vec![ScanSpec::new("Preferred", ScanKind::ConfigFile(path))],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn candidate(home: &str, locator: &str, version: Option<&str>) -> JdkCandidate {
        let mut release = HashMap::new();
        if let Some(version) = version {
            release.insert("JAVA_VERSION".to_string(), version.to_string());
        }
        JdkCandidate::new(PathBuf::from(home), locator, release, HashMap::new())
    }

    #[test]
    fn test_rank_sorts_descending() {
        let ranked = rank(vec![
            candidate("/a", "vendor-a", Some("11.0.2")),
            candidate("/b", "vendor-b", Some("17.0.1")),
            candidate("/c", "vendor-c", Some("1.8.0_292")),
        ]);
        let versions: Vec<String> = ranked
            .iter()
            .map(|c| c.version().unwrap().to_string())
            .collect();
        assert_eq!(versions, vec!["17.0.1", "11.0.2", "1.8.0.292"]);
    }

    #[test]
    fn test_rank_equal_versions_keep_table_order() {
        let ranked = rank(vec![
            candidate("/first", "vendor-high-priority", Some("17.0.1")),
            candidate("/second", "vendor-low-priority", Some("17.0.1")),
        ]);
        assert_eq!(ranked[0].locator(), "vendor-high-priority");
        assert_eq!(ranked[1].locator(), "vendor-low-priority");
    }

    #[test]
    fn test_rank_unversioned_sort_last() {
        let ranked = rank(vec![
            candidate("/a", "vendor-a", None),
            candidate("/b", "vendor-b", Some("1.4.2")),
        ]);
        assert_eq!(ranked[0].locator(), "vendor-b");
        assert!(ranked[1].version().is_err());
    }

    #[test]
    fn test_rank_dedupes_by_home() {
        let ranked = rank(vec![
            candidate("/same", "found-first", Some("17.0.1")),
            candidate("/same", "found-second", Some("17.0.1")),
        ]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].locator(), "found-first");
    }

    fn make_fake_jdk(home: &Path, java_version: &str) {
        let bin = home.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        for tool in ["java", "javac", "jar", "java.exe", "javac.exe", "jar.exe"] {
            std::fs::write(bin.join(tool), b"").unwrap();
        }
        std::fs::write(
            home.join("release"),
            format!("JAVA_VERSION=\"{}\"\n", java_version),
        )
        .unwrap();
    }

    #[test]
    fn test_explicit_configuration_beats_newer_version() {
        let root = tempfile::tempdir().unwrap();
        let old = root.path().join("jdk-8");
        let new = root.path().join("jdk-21");
        make_fake_jdk(&old, "1.8.0_292");
        make_fake_jdk(&new, "21.0.1");

        let config = root.path().join("config.xml");
        std::fs::write(
            &config,
            format!("<droidhome><java-sdk path=\"{}\"/></droidhome>", old.display()),
        )
        .unwrap();

        let locator = JdkLocator::new()
            .with_vendor_specs(vec![ScanSpec::new(
                "Test",
                ScanKind::JdkContainer(root.path().to_path_buf()),
            )])
            .with_preferred_specs(vec![ScanSpec::new(
                "Preferred",
                ScanKind::ConfigFile(config),
            )]);

        let jdks = locator.preferred_jdks();
        assert_eq!(jdks.len(), 2);
        // the configured jdk-8 outranks the auto-discovered jdk-21
        assert_eq!(jdks[0].home(), old);
        assert_eq!(jdks[1].home(), new);
        assert_eq!(locator.preferred_jdk().unwrap().home(), old);
    }

    #[test]
    fn test_known_jdks_ranks_by_version() {
        let root = tempfile::tempdir().unwrap();
        make_fake_jdk(&root.path().join("a-jdk-11"), "11.0.2");
        make_fake_jdk(&root.path().join("b-jdk-17"), "17.0.1");

        let locator = JdkLocator::new()
            .with_vendor_specs(vec![ScanSpec::new(
                "Test",
                ScanKind::JdkContainer(root.path().to_path_buf()),
            )])
            .with_preferred_specs(Vec::new());

        let jdks = locator.known_jdks();
        assert_eq!(jdks.len(), 2);
        assert_eq!(jdks[0].version().unwrap().components(), &[17, 0, 1]);
    }
}
