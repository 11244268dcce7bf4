//! JDK version model
//!
//! Normalizes the version strings found across JDK vendors into one ordered
//! representation. Handles the Oracle "1.2.3_4", Microsoft "1.2.3" +
//! BUILD_NUMBER, and modern "17.0.1+9" spellings.

use std::collections::HashMap;
use std::fmt;

use droidhome_core::{Result, ToolchainError};

/// An ordered (major, minor, micro, build/revision) tuple.
///
/// Trailing components are absent, not zero: `17.0` and `17.0.0` are
/// distinct values, and the longer tuple ranks higher among equal prefixes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JdkVersion {
    parts: Vec<u64>,
}

impl JdkVersion {
    /// Resolve a version from the two conflicting sources of truth a JDK
    /// home provides: the `release` file key/value blob and the
    /// `java -version` property map.
    ///
    /// The `release`-derived value always wins when both parse. Fails with
    /// [`ToolchainError::UnsupportedVersion`] only when neither source
    /// yields a parseable version.
    pub fn parse(
        release: &HashMap<String, String>,
        java_properties: &HashMap<String, Vec<String>>,
    ) -> Result<Self> {
        if let Some(version) = Self::from_release(release) {
            return Ok(version);
        }

        if let Some(raw) = java_properties
            .get("java.version")
            .and_then(|values| values.first())
        {
            if let Some(version) = Self::from_version_string(raw) {
                return Ok(version);
            }
        }

        Err(ToolchainError::UnsupportedVersion(format!(
            "JAVA_VERSION={:?}, java.version={:?}",
            release.get("JAVA_VERSION"),
            java_properties.get("java.version").and_then(|v| v.first()),
        )))
    }

    /// Build from a `release` file map: `JAVA_VERSION` carries the dotted
    /// version (optionally with a `_`/`-`/`+` patch suffix), and
    /// `BUILD_NUMBER` supplies the fourth component when no suffix did.
    fn from_release(release: &HashMap<String, String>) -> Option<Self> {
        let raw = release.get("JAVA_VERSION")?;
        let mut version = Self::from_version_string(raw)?;

        if version.parts.len() < 4 {
            if let Some(build) = release
                .get("BUILD_NUMBER")
                .and_then(|b| b.trim().parse::<u64>().ok())
            {
                version.parts.push(build);
            }
        }

        Some(version)
    }

    /// Parse a `major[.minor[.micro]][{_|-|+}patch]` string.
    ///
    /// Returns `None` when the leading component is not numeric; a
    /// non-numeric patch suffix is ignored rather than rejected
    /// ("17-ea" parses as 17).
    pub fn from_version_string(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_matches('"');
        let (dotted, patch) = match raw.find(['_', '-', '+']) {
            Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
            None => (raw, None),
        };

        let mut parts = Vec::new();
        for component in dotted.split('.') {
            match component.parse::<u64>() {
                Ok(n) => parts.push(n),
                Err(_) => break,
            }
        }
        if parts.is_empty() {
            return None;
        }
        parts.truncate(3);

        if let Some(patch) = patch {
            let digits: String = patch.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(n) = digits.parse::<u64>() {
                parts.push(n);
            }
        }

        Some(Self { parts })
    }

    /// The numeric components, most significant first.
    pub fn components(&self) -> &[u64] {
        &self.parts
    }

    /// Major version number.
    pub fn major(&self) -> u64 {
        self.parts[0]
    }
}

impl fmt::Display for JdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", rendered.join("."))
    }
}
