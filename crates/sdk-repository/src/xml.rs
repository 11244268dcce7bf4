//! Google SDK repository XML parser
//!
//! Parses `sdk-repository`-style documents into the package model. Elements
//! are looked up by local name, so documents with and without the `sdk:`
//! namespace prefix both parse. A package that fails to parse is skipped
//! with a warning and the rest of the feed is still processed.

use tracing::{debug, warn};

use droidhome_core::{normalize_arch, normalize_os, Result, ToolchainError};

use crate::model::{ArchiveInfo, ChecksumKind, PackageInfo, Revision};

/// Base URL that relative archive URLs are resolved against.
pub const REPOSITORY_BASE_URL: &str = "https://dl.google.com/android/repository/";

/// Parse a repository document, appending its packages to `packages`.
pub fn parse(xml: &str, packages: &mut Vec<PackageInfo>) -> Result<()> {
    let doc =
        roxmltree::Document::parse(xml).map_err(|e| ToolchainError::XmlParse(e.to_string()))?;

    let mut parsed = 0usize;
    for node in doc.descendants().filter(|n| {
        n.is_element()
            && matches!(n.tag_name().name(), "remotePackage" | "localPackage")
    }) {
        match parse_package(node) {
            Some(package) => {
                packages.push(package);
                parsed += 1;
            }
            None => {
                warn!(
                    "Skipping unparseable package element at {:?}",
                    node.attribute("path").unwrap_or("<no path>")
                );
            }
        }
    }

    debug!("Parsed {} packages from repository XML", parsed);
    Ok(())
}

fn parse_package(node: roxmltree::Node) -> Option<PackageInfo> {
    let path = node.attribute("path")?.to_string();

    let obsolete = node
        .attribute("obsolete")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let revision = child(node, "revision").and_then(|rev| {
        Revision::from_components(
            child_u64(rev, "major"),
            child_u64(rev, "minor"),
            child_u64(rev, "micro"),
            child_u64(rev, "preview"),
        )
    });

    let archives = child(node, "archives")
        .map(|archives| {
            archives
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "archive")
                .filter_map(parse_archive)
                .collect()
        })
        .unwrap_or_default();

    Some(PackageInfo {
        path,
        display_name: child_text(node, "display-name"),
        revision,
        license: child(node, "uses-license").and_then(|n| n.attribute("ref").map(String::from)),
        description: child_text(node, "description"),
        obsolete,
        archives,
    })
}

fn parse_archive(node: roxmltree::Node) -> Option<ArchiveInfo> {
    // the size/checksum/url triple sits either directly on the archive or
    // under a <complete> wrapper
    let complete = child(node, "complete").unwrap_or(node);

    let raw_url = child_text(complete, "url")?;
    let url = if raw_url.contains("://") {
        raw_url
    } else {
        format!("{}{}", REPOSITORY_BASE_URL, raw_url)
    };

    let checksum_node = child(complete, "checksum");
    let checksum_kind = checksum_node
        .and_then(|n| n.attribute("type"))
        .map(ChecksumKind::parse)
        .unwrap_or_default();
    let checksum = checksum_node
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    Some(ArchiveInfo {
        url,
        checksum,
        checksum_kind,
        size: child_text(complete, "size").and_then(|s| s.parse().ok()),
        host_os: child_text(node, "host-os").map(|os| normalize_os(&os)),
        host_arch: child_text(node, "host-arch").map(|arch| normalize_arch(&arch)),
        host_bits: child_text(node, "host-bits").and_then(|b| b.parse().ok()),
    })
}

/// First child element with the given local name, prefixed or not.
fn child<'a>(node: roxmltree::Node<'a, 'a>, local_name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

fn child_text(node: roxmltree::Node, local_name: &str) -> Option<String> {
    child(node, local_name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn child_u64(node: roxmltree::Node, local_name: &str) -> Option<u64> {
    child_text(node, local_name).and_then(|t| t.parse().ok())
}
