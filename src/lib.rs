//! droidhome - Android toolchain discovery and SDK component management
//!
//! Finds the JDKs installed on a machine, ranks them, and manages the
//! download and installation of Android SDK components from manifest feeds.
//!
//! ## Architecture
//!
//! droidhome is organized into specialized crates:
//!
//! - `droidhome-core`: shared error and host-platform model
//! - `droidhome-jdk-locator`: JDK discovery, validation, and ranking
//! - `droidhome-sdk-repository`: manifest feed parsing and package resolution
//! - `droidhome-installer`: download, verify, extract, and install pipeline

#![warn(clippy::all)]

pub mod context;

// Re-export main components for library usage
pub use droidhome_core as core;
pub use droidhome_installer as installer;
pub use droidhome_jdk_locator as jdk_locator;
pub use droidhome_sdk_repository as sdk_repository;

pub use context::ToolchainContext;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::ToolchainContext;
    pub use droidhome_core::{Result, ToolchainError};
    pub use droidhome_installer::{InstallPhase, Installer, ProgressCallback};
    pub use droidhome_jdk_locator::{JdkCandidate, JdkLocator, JdkVersion};
    pub use droidhome_sdk_repository::{ManifestFeed, PackageInfo};
}
