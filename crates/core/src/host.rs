//! Host platform model
//!
//! Typed OS/arch identifiers for the current system plus the synonym tables
//! used to normalize the free-form values found in manifest feeds.

use serde::{Deserialize, Serialize};

/// Operating system a package archive targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostOs {
    Windows,
    MacOsX,
    Linux,
}

impl HostOs {
    /// The OS this process is running on
    pub fn current() -> Self {
        if cfg!(windows) {
            HostOs::Windows
        } else if cfg!(target_os = "macos") {
            HostOs::MacOsX
        } else {
            HostOs::Linux
        }
    }

    /// Canonical feed identifier for this OS
    pub fn as_str(&self) -> &'static str {
        match self {
            HostOs::Windows => "windows",
            HostOs::MacOsX => "macosx",
            HostOs::Linux => "linux",
        }
    }
}

/// CPU architecture a package archive targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostArch {
    X86_64,
    Aarch64,
    X86,
}

impl HostArch {
    /// The architecture this process is running on
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => HostArch::Aarch64,
            "x86" => HostArch::X86,
            _ => HostArch::X86_64,
        }
    }

    /// Canonical feed identifier for this architecture
    pub fn as_str(&self) -> &'static str {
        match self {
            HostArch::X86_64 => "x86_64",
            HostArch::Aarch64 => "aarch64",
            HostArch::X86 => "x86",
        }
    }
}

/// Normalize a feed OS name to its canonical form.
///
/// Unknown names pass through lowercased; normalization is idempotent.
pub fn normalize_os(os: &str) -> String {
    match os.to_ascii_lowercase().as_str() {
        "windows" | "win" => "windows".to_string(),
        "macosx" | "macos" | "darwin" | "osx" => "macosx".to_string(),
        other => other.to_string(),
    }
}

/// Normalize a feed architecture name to its canonical form.
///
/// Unknown names pass through lowercased; normalization is idempotent.
pub fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "x64" | "amd64" => "x86_64".to_string(),
        "aarch64" | "arm64" => "aarch64".to_string(),
        "x86" | "i386" | "i686" => "x86".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_synonyms() {
        assert_eq!(normalize_os("win"), "windows");
        assert_eq!(normalize_os("Windows"), "windows");
        assert_eq!(normalize_os("darwin"), "macosx");
        assert_eq!(normalize_os("OSX"), "macosx");
        assert_eq!(normalize_os("macos"), "macosx");
        assert_eq!(normalize_os("linux"), "linux");
        assert_eq!(normalize_os("FreeBSD"), "freebsd");
    }

    #[test]
    fn test_arch_synonyms() {
        assert_eq!(normalize_arch("x64"), "x86_64");
        assert_eq!(normalize_arch("AMD64"), "x86_64");
        assert_eq!(normalize_arch("arm64"), "aarch64");
        assert_eq!(normalize_arch("i686"), "x86");
        assert_eq!(normalize_arch("riscv64"), "riscv64");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [
            "windows", "win", "macosx", "macos", "darwin", "osx", "linux", "plan9",
        ] {
            let once = normalize_os(raw);
            assert_eq!(normalize_os(&once), once);
        }
        for raw in ["x86_64", "x64", "amd64", "aarch64", "arm64", "x86", "i386", "i686", "mips"] {
            let once = normalize_arch(raw);
            assert_eq!(normalize_arch(&once), once);
        }
    }

    #[test]
    fn test_current_round_trips_through_normalization() {
        let os = HostOs::current();
        assert_eq!(normalize_os(os.as_str()), os.as_str());
        let arch = HostArch::current();
        assert_eq!(normalize_arch(arch.as_str()), arch.as_str());
    }
}
