//! Xamarin JSON feed parser
//!
//! The upstream format was never fully specified, so this parser is
//! deliberately tolerant: every logical field accepts several aliased key
//! names, and anything missing is simply absent. A record lacking both a
//! path/id and a usable checksum+URL pair is dropped; everything else is
//! kept, archives or not.

use serde_json::Value;
use tracing::{debug, warn};

use droidhome_core::{normalize_arch, normalize_os, Result, ToolchainError};

use crate::model::{ArchiveInfo, ChecksumKind, PackageInfo, Revision};

/// Parse a JSON feed document, appending its packages to `packages`.
pub fn parse(text: &str, packages: &mut Vec<PackageInfo>) -> Result<()> {
    let doc: Value =
        serde_json::from_str(text).map_err(|e| ToolchainError::JsonParse(e.to_string()))?;

    let records = doc
        .get("packages")
        .or_else(|| doc.get("items"))
        .and_then(Value::as_array)
        .or_else(|| doc.as_array());

    let records = match records {
        Some(records) => records,
        None => {
            return Err(ToolchainError::JsonParse(
                "document has no packages array".to_string(),
            ))
        }
    };

    let mut parsed = 0usize;
    for record in records {
        match parse_package(record) {
            Some(package) => {
                packages.push(package);
                parsed += 1;
            }
            None => warn!("Skipping unidentifiable package record: {}", record),
        }
    }

    debug!("Parsed {} packages from JSON feed", parsed);
    Ok(())
}

fn parse_package(record: &Value) -> Option<PackageInfo> {
    let obj = record.as_object()?;

    let path = str_alias(record, &["id", "path"]);
    let flat_checksum = str_alias(record, &["sha1", "sha256", "checksum"]);
    let flat_url = str_alias(record, &["url"]);

    // keep a record if it is identifiable by path/id or by checksum+url
    if path.is_none() && (flat_checksum.is_none() || flat_url.is_none()) {
        return None;
    }

    let archives = obj
        .get("archives")
        .or_else(|| obj.get("downloads"))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(parse_archive).collect())
        .unwrap_or_default();

    Some(PackageInfo {
        path: path.unwrap_or_default(),
        display_name: str_alias(record, &["displayName", "name"]),
        revision: str_alias(record, &["version", "revision"])
            .as_deref()
            .and_then(Revision::parse),
        license: str_alias(record, &["license", "licenseId"]),
        description: str_alias(record, &["description"]),
        obsolete: record
            .get("obsolete")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        archives,
    })
}

fn parse_archive(record: &Value) -> Option<ArchiveInfo> {
    let url = str_alias(record, &["url"])?;

    let (checksum, checksum_kind) = if let Some(digest) = str_alias(record, &["sha256"]) {
        (Some(digest), ChecksumKind::Sha256)
    } else if let Some(digest) = str_alias(record, &["sha1"]) {
        (Some(digest), ChecksumKind::Sha1)
    } else {
        let kind = str_alias(record, &["checksumType"])
            .map(|label| ChecksumKind::parse(&label))
            .unwrap_or_default();
        (str_alias(record, &["checksum"]), kind)
    };

    Some(ArchiveInfo {
        url,
        checksum,
        checksum_kind,
        size: record.get("size").and_then(Value::as_u64),
        host_os: str_alias(record, &["os", "hostOs", "platform"]).map(|os| normalize_os(&os)),
        host_arch: str_alias(record, &["arch", "architecture", "hostArch"])
            .map(|arch| normalize_arch(&arch)),
        host_bits: u64_alias(record, &["bits", "hostBits"])
            .and_then(|bits| u32::try_from(bits).ok()),
    })
}

/// First non-empty string value among the aliased keys.
fn str_alias(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// First numeric value among the aliased keys; numeric strings count.
fn u64_alias(record: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().filter_map(|key| record.get(key)).find_map(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    })
}
