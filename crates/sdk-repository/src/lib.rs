//! SDK component manifest feeds
//!
//! Loads and normalizes the two manifest formats that describe downloadable
//! SDK/JDK components (the Google SDK repository XML schema and the Xamarin
//! JSON feed schema) into a uniform package/archive model, and resolves
//! packages to the archive matching a given platform.

pub mod checksum;
pub mod feed;
pub mod json;
pub mod model;
pub mod xml;

pub use checksum::{fetch_checksum, parse_checksum_file, verify_checksum};
pub use feed::ManifestFeed;
pub use model::{ArchiveInfo, ChecksumKind, PackageInfo, Revision};
