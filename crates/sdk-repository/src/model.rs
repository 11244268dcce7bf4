//! Package and archive model
//!
//! The uniform representation both manifest parsers normalize into.

use std::fmt;

use droidhome_core::{normalize_arch, normalize_os, HostArch, HostOs};

/// Digest algorithm a manifest declares for an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    #[default]
    Sha1,
    Sha256,
}

impl ChecksumKind {
    /// Parse a manifest checksum-type label; unknown labels fall back to
    /// the schema default, SHA-1.
    pub fn parse(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => ChecksumKind::Sha256,
            _ => ChecksumKind::Sha1,
        }
    }
}

/// A package revision with per-component precision: `major[.minor[.micro[.preview]]]`.
///
/// Missing components truncate precision rather than reading as zero.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Revision {
    parts: Vec<u64>,
}

impl Revision {
    /// Build from optional components; assembly stops at the first absent one.
    pub fn from_components(
        major: Option<u64>,
        minor: Option<u64>,
        micro: Option<u64>,
        preview: Option<u64>,
    ) -> Option<Self> {
        let mut parts = Vec::new();
        for component in [major, minor, micro, preview] {
            match component {
                Some(n) => parts.push(n),
                None => break,
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(Self { parts })
        }
    }

    /// Parse a dotted revision string.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = Vec::new();
        for component in raw.trim().split('.') {
            match component.parse::<u64>() {
                Ok(n) => parts.push(n),
                Err(_) => break,
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(Self { parts })
        }
    }

    pub fn components(&self) -> &[u64] {
        &self.parts
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", rendered.join("."))
    }
}

/// One platform-specific downloadable unit of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub url: String,
    pub checksum: Option<String>,
    pub checksum_kind: ChecksumKind,
    pub size: Option<u64>,
    /// Normalized OS tag; `None` means platform-agnostic.
    pub host_os: Option<String>,
    /// Normalized architecture tag; `None` means any.
    pub host_arch: Option<String>,
    pub host_bits: Option<u32>,
}

/// A downloadable SDK/JDK component from a manifest feed.
///
/// Never mutated after parsing; [`PackageInfo::filtered`] produces a new
/// instance with an archive subset rather than touching the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Semicolon-delimited path identifier, e.g. `"platforms;android-35"`.
    pub path: String,
    pub display_name: Option<String>,
    pub revision: Option<Revision>,
    pub license: Option<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub archives: Vec<ArchiveInfo>,
}

impl PackageInfo {
    /// The package type is everything before the first `;` of the path
    /// identifier: `"cmdline-tools;20.0"` is a `"cmdline-tools"` package.
    pub fn package_type(&self) -> &str {
        match self.path.split_once(';') {
            Some((package_type, _)) => package_type,
            None => &self.path,
        }
    }

    /// Pick the archive best matching `os` (and optionally `arch`):
    /// exact OS+arch match, then OS-only, then a platform-agnostic entry.
    pub fn best_archive(&self, os: &str, arch: Option<&str>) -> Option<&ArchiveInfo> {
        let os = normalize_os(os);
        if let Some(arch) = arch {
            let arch = normalize_arch(arch);
            if let Some(archive) = self.archives.iter().find(|a| {
                a.host_os.as_deref() == Some(os.as_str())
                    && a.host_arch.as_deref() == Some(arch.as_str())
            }) {
                return Some(archive);
            }
            if let Some(archive) = self
                .archives
                .iter()
                .find(|a| a.host_os.as_deref() == Some(os.as_str()) && a.host_arch.is_none())
            {
                return Some(archive);
            }
        } else if let Some(archive) = self
            .archives
            .iter()
            .find(|a| a.host_os.as_deref() == Some(os.as_str()))
        {
            return Some(archive);
        }
        self.archives.iter().find(|a| a.host_os.is_none())
    }

    /// The archive matching the machine this process runs on.
    pub fn best_archive_for_current_system(&self) -> Option<&ArchiveInfo> {
        self.best_archive(HostOs::current().as_str(), Some(HostArch::current().as_str()))
    }

    /// A copy whose archives are the subset compatible with `os` (and
    /// `arch`, when given). Platform-agnostic archives match everything.
    pub fn filtered(&self, os: &str, arch: Option<&str>) -> PackageInfo {
        let os = normalize_os(os);
        let arch = arch.map(normalize_arch);
        let archives = self
            .archives
            .iter()
            .filter(|a| match a.host_os.as_deref() {
                Some(archive_os) => archive_os == os,
                None => true,
            })
            .filter(|a| match (&arch, a.host_arch.as_deref()) {
                (Some(wanted), Some(tagged)) => wanted == tagged,
                _ => true,
            })
            .cloned()
            .collect();

        PackageInfo {
            archives,
            ..self.clone()
        }
    }
}
