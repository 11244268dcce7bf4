//! droidhome core - shared types
//!
//! This crate provides the error taxonomy and the typed host platform model
//! shared by the discovery, manifest, and installer crates.

pub mod error;
pub mod host;

pub use error::{Result, ToolchainError};
pub use host::{normalize_arch, normalize_os, HostArch, HostOs};

/// droidhome version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
