//! JDK candidate
//!
//! An installation path that passed the JDK home layout checks, together
//! with the metadata the probe collected from it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use droidhome_core::Result;

use crate::version::JdkVersion;

/// A validated JDK installation.
///
/// Immutable after construction. Version resolution is deferred: building a
/// candidate succeeds even when no version is derivable, and only
/// [`JdkCandidate::version`] surfaces the unsupported-format error, since
/// many callers only need the path.
#[derive(Debug, Clone)]
pub struct JdkCandidate {
    home: PathBuf,
    locator: String,
    release: HashMap<String, String>,
    java_properties: HashMap<String, Vec<String>>,
}

impl JdkCandidate {
    pub fn new(
        home: PathBuf,
        locator: impl Into<String>,
        release: HashMap<String, String>,
        java_properties: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            home,
            locator: locator.into(),
            release,
            java_properties,
        }
    }

    /// Root directory of the installation.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Human-readable description of how this candidate was found,
    /// e.g. `"Windows Registry @ HKLM\SOFTWARE\JavaSoft\JDK\17"`.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Key/value pairs from the `release` file, if one was present.
    pub fn release(&self) -> &HashMap<String, String> {
        &self.release
    }

    /// Properties reported by `java -XshowSettings:properties -version`.
    pub fn java_properties(&self) -> &HashMap<String, Vec<String>> {
        &self.java_properties
    }

    /// Resolve the installation's version, preferring the `release` file
    /// over the `java -version` report. Recomputed on every call.
    pub fn version(&self) -> Result<JdkVersion> {
        JdkVersion::parse(&self.release, &self.java_properties)
    }

    /// Path to the `java` launcher inside this home.
    pub fn java_exe(&self) -> PathBuf {
        if cfg!(windows) {
            self.home.join("bin").join("java.exe")
        } else {
            self.home.join("bin").join("java")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_succeeds_without_version() {
        let candidate = JdkCandidate::new(
            PathBuf::from("/opt/jdk"),
            "unit test",
            HashMap::new(),
            HashMap::new(),
        );
        assert_eq!(candidate.home(), Path::new("/opt/jdk"));
        // deferred failure: only the version accessor errors
        assert!(candidate.version().is_err());
    }

    #[test]
    fn test_version_prefers_release_file() {
        let mut release = HashMap::new();
        release.insert("JAVA_VERSION".to_string(), "17.0.2".to_string());
        let mut props = HashMap::new();
        props.insert("java.version".to_string(), vec!["11.0.9".to_string()]);

        let candidate = JdkCandidate::new(PathBuf::from("/opt/jdk"), "unit test", release, props);
        assert_eq!(candidate.version().unwrap().components(), &[17, 0, 2]);
    }
}
