//! Unix configuration file
//!
//! On Unix systems an explicitly preferred JDK is recorded in a small XML
//! document containing `<java-sdk path="..."/>` elements, one override per
//! element.

use std::path::{Path, PathBuf};

use tracing::warn;

use droidhome_core::{Result, ToolchainError};

/// Parse `java-sdk` overrides out of a config document.
pub fn parse_java_sdk_paths(xml: &str) -> Result<Vec<PathBuf>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ToolchainError::XmlParse(e.to_string()))?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("java-sdk"))
        .filter_map(|node| node.attribute("path"))
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Read `java-sdk` overrides from a config file.
///
/// A missing file is simply "no overrides"; a present but malformed file is
/// logged and also treated as empty, so probing never fails outright.
pub fn read_java_sdk_paths(path: &Path) -> Vec<PathBuf> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Vec::new(),
    };
    match parse_java_sdk_paths(&text) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("Ignoring malformed config file {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Default config file location, `~/.config/droidhome/config.xml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("droidhome").join("config.xml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_java_sdk_elements() {
        let xml = r#"<droidhome>
            <java-sdk path="/opt/jdk-17"/>
            <java-sdk path="/usr/lib/jvm/temurin-11"/>
            <android-sdk path="/opt/android"/>
        </droidhome>"#;
        let paths = parse_java_sdk_paths(xml).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/opt/jdk-17"),
                PathBuf::from("/usr/lib/jvm/temurin-11")
            ]
        );
    }

    #[test]
    fn test_empty_path_attribute_skipped() {
        let xml = r#"<droidhome><java-sdk path=""/></droidhome>"#;
        assert!(parse_java_sdk_paths(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(parse_java_sdk_paths("<droidhome>").is_err());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let paths = read_java_sdk_paths(Path::new("/nonexistent/droidhome/config.xml"));
        assert!(paths.is_empty());
    }
}
