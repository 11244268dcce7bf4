//! JDK discovery and ranking
//!
//! Locates installed JDKs across heterogeneous sources (filesystem globs,
//! registry keys, config files, PATH), validates each candidate against the
//! JDK home layout contract, and ranks the survivors by version.

pub mod candidate;
pub mod config_file;
pub mod locator;
pub mod probe;
pub mod registry;
pub mod release;
pub mod version;

pub use candidate::JdkCandidate;
pub use locator::JdkLocator;
pub use probe::{ScanKind, ScanSpec};
pub use registry::{NoRegistry, RegistryAccess, RegistryHive, RegistryView};
pub use version::JdkVersion;
