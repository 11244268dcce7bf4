//! JDK metadata parsers
//!
//! Parsers for the two diagnostic blobs a JDK home provides: the `release`
//! key/value file and the `Property settings:` block printed by
//! `java -XshowSettings:properties -version`.

use std::collections::HashMap;

/// Parse a JDK `release` file: one `KEY=value` pair per line, values
/// optionally double-quoted. Unparseable lines are skipped.
pub fn parse_release_file(text: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            entries.insert(key.to_string(), value.to_string());
        }
    }
    entries
}

/// Parse the `Property settings:` block from `java -XshowSettings:properties`
/// diagnostic output.
///
/// Each property maps to a list of values: lines indented deeper than the
/// `key = value` line extend the previous property's list (the form the JVM
/// uses for path-like properties), they are never concatenated into one
/// string.
pub fn parse_property_settings(text: &str) -> HashMap<String, Vec<String>> {
    let mut properties: HashMap<String, Vec<String>> = HashMap::new();
    let mut in_settings = false;
    let mut current: Option<String> = None;

    for line in text.lines() {
        if !in_settings {
            if line.trim_start().starts_with("Property settings:") {
                in_settings = true;
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(' ') {
            // dedented line ends the settings block
            break;
        }

        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if indent <= 4 {
            if let Some((key, value)) = trimmed.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim();
                let mut values = Vec::new();
                if !value.is_empty() {
                    values.push(value.to_string());
                }
                properties.insert(key.clone(), values);
                current = Some(key);
                continue;
            }
        }

        if let Some(ref key) = current {
            if let Some(values) = properties.get_mut(key) {
                values.push(trimmed.to_string());
            }
        }
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_file_quoting() {
        let text = "JAVA_VERSION=\"17.0.1\"\nBUILD_NUMBER=12\nIMPLEMENTOR=\"Eclipse Adoptium\"\n";
        let entries = parse_release_file(text);
        assert_eq!(entries["JAVA_VERSION"], "17.0.1");
        assert_eq!(entries["BUILD_NUMBER"], "12");
        assert_eq!(entries["IMPLEMENTOR"], "Eclipse Adoptium");
    }

    #[test]
    fn test_release_file_skips_garbage() {
        let text = "# comment\n\nnot a pair\nOS_NAME=Linux\n";
        let entries = parse_release_file(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["OS_NAME"], "Linux");
    }

    #[test]
    fn test_property_settings_basic() {
        let text = "Picked up JAVA_TOOL_OPTIONS:\nProperty settings:\n    java.version = 17.0.1\n    java.vendor = Eclipse Adoptium\n";
        let properties = parse_property_settings(text);
        assert_eq!(properties["java.version"], vec!["17.0.1"]);
        assert_eq!(properties["java.vendor"], vec!["Eclipse Adoptium"]);
    }

    #[test]
    fn test_property_settings_continuation_values_stay_separate() {
        let text = concat!(
            "Property settings:\n",
            "    java.class.path = /a/first.jar\n",
            "        /b/second.jar\n",
            "        /c/third.jar\n",
            "    java.version = 11.0.2\n",
        );
        let properties = parse_property_settings(text);
        assert_eq!(
            properties["java.class.path"],
            vec!["/a/first.jar", "/b/second.jar", "/c/third.jar"]
        );
        assert_eq!(properties["java.version"], vec!["11.0.2"]);
    }

    #[test]
    fn test_property_settings_empty_then_continuation() {
        let text = "Property settings:\n    java.library.path =\n        /usr/lib\n";
        let properties = parse_property_settings(text);
        assert_eq!(properties["java.library.path"], vec!["/usr/lib"]);
    }

    #[test]
    fn test_property_settings_block_ends_at_dedent() {
        let text = "Property settings:\n    java.version = 17\nopenjdk version \"17\"\n    stray = value\n";
        let properties = parse_property_settings(text);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties["java.version"], vec!["17"]);
    }

    #[test]
    fn test_missing_header_yields_empty() {
        let properties = parse_property_settings("java.version = 17\n");
        assert!(properties.is_empty());
    }
}
