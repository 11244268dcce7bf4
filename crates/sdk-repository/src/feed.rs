//! Manifest feed
//!
//! Owns the packages parsed from one manifest document plus the source it
//! came from. The format is sniffed from the first non-whitespace character:
//! `<` selects the Google XML schema, `{` the Xamarin JSON schema, anything
//! else is a hard parse failure.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use droidhome_core::{Result, ToolchainError};

use crate::model::PackageInfo;
use crate::{json, xml};

/// A loaded manifest document.
#[derive(Debug, Default)]
pub struct ManifestFeed {
    packages: Vec<PackageInfo>,
    source: Option<String>,
}

impl ManifestFeed {
    /// An empty feed; populate it with one of the load operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// All packages in the feed.
    pub fn packages(&self) -> &[PackageInfo] {
        &self.packages
    }

    /// Where the feed was loaded from, if it has been loaded.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Parse a manifest document, replacing the feed contents.
    pub fn load_from_str(&mut self, text: &str, source: impl Into<String>) -> Result<()> {
        let lead = text
            .chars()
            .find(|c| !c.is_whitespace())
            .ok_or(ToolchainError::UnsupportedManifest('\0'))?;

        let mut packages = Vec::new();
        match lead {
            '<' => xml::parse(text, &mut packages)?,
            '{' => json::parse(text, &mut packages)?,
            other => return Err(ToolchainError::UnsupportedManifest(other)),
        }

        self.packages = packages;
        self.source = Some(source.into());
        info!(
            "Loaded {} packages from {}",
            self.packages.len(),
            self.source.as_deref().unwrap_or("<unknown>")
        );
        Ok(())
    }

    /// Load from a local file.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_from_str(&text, path.display().to_string())
    }

    /// Fetch and parse a manifest URL.
    pub async fn load(
        &mut self,
        url: &str,
        client: &reqwest::Client,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let text = fetch_text(url, client, cancel).await?;
        self.load_from_str(&text, url)
    }

    /// Re-fetch the source document and write its raw bytes to `path`.
    ///
    /// The on-disk cache is the upstream document verbatim, not a
    /// serialization of the in-memory model.
    pub async fn cache(
        &self,
        path: &Path,
        client: &reqwest::Client,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| ToolchainError::NotFound("feed has not been loaded".to_string()))?;
        let body = fetch_text(source, client, cancel).await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, body.as_bytes()).await?;
        debug!("Cached manifest from {} to {:?}", source, path);
        Ok(())
    }

    /// Resolve a package by its path identifier (case-insensitive).
    ///
    /// With no OS the package is returned unfiltered. Otherwise the result
    /// is a new package holding only the archives compatible with `os` (and
    /// `arch`, when given); a package whose filtered archive set is empty is
    /// a resolution failure, not an empty success.
    pub fn resolve_package(
        &self,
        path: &str,
        os: Option<&str>,
        arch: Option<&str>,
    ) -> Option<PackageInfo> {
        let package = self
            .packages
            .iter()
            .find(|p| p.path.eq_ignore_ascii_case(path));

        let package = match package {
            Some(package) => package,
            None => {
                warn!("No package {:?} in feed", path);
                return None;
            }
        };

        let os = match os {
            Some(os) => os,
            None => return Some(package.clone()),
        };

        let filtered = package.filtered(os, arch);
        if filtered.archives.is_empty() {
            warn!(
                "Package {:?} has no archive for os={:?} arch={:?}",
                path, os, arch
            );
            return None;
        }
        Some(filtered)
    }
}

async fn fetch_text(
    source: &str,
    client: &reqwest::Client,
    cancel: &CancellationToken,
) -> Result<String> {
    // local paths load without the network, so cached feeds round-trip
    if !source.contains("://") {
        return Ok(std::fs::read_to_string(source)?);
    }

    tokio::select! {
        _ = cancel.cancelled() => Err(ToolchainError::Cancelled),
        response = client.get(source).send() => {
            let response = response
                .and_then(|r| r.error_for_status())
                .map_err(|e| ToolchainError::Network(e.to_string()))?;
            response
                .text()
                .await
                .map_err(|e| ToolchainError::Network(e.to_string()))
        }
    }
}
