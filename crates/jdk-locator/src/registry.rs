//! Registry access seam
//!
//! The Windows registry primitives themselves live outside this library;
//! discovery only needs key enumeration and string values, expressed here as
//! a trait so the scanner works against the real registry on Windows and an
//! in-memory double in tests. The glob matching applied to key names lives
//! here too.

use regex::Regex;

/// Registry hive to consult. Both are always scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryHive {
    CurrentUser,
    LocalMachine,
}

/// Registry view to consult. Both are always scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryView {
    Bits32,
    Bits64,
}

pub const ALL_HIVES: [RegistryHive; 2] = [RegistryHive::CurrentUser, RegistryHive::LocalMachine];
pub const ALL_VIEWS: [RegistryView; 2] = [RegistryView::Bits32, RegistryView::Bits64];

impl RegistryHive {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryHive::CurrentUser => "HKCU",
            RegistryHive::LocalMachine => "HKLM",
        }
    }
}

/// Read access to a registry-like key/value store.
pub trait RegistryAccess {
    /// Names of the immediate subkeys of `path`, empty when the key does not
    /// exist or cannot be read.
    fn subkeys(&self, hive: RegistryHive, view: RegistryView, path: &str) -> Vec<String>;

    /// A string value under `path`, `None` when absent or unreadable.
    fn get_string(
        &self,
        hive: RegistryHive,
        view: RegistryView,
        path: &str,
        value: &str,
    ) -> Option<String>;
}

/// Registry access on systems without a registry.
pub struct NoRegistry;

impl RegistryAccess for NoRegistry {
    fn subkeys(&self, _hive: RegistryHive, _view: RegistryView, _path: &str) -> Vec<String> {
        Vec::new()
    }

    fn get_string(
        &self,
        _hive: RegistryHive,
        _view: RegistryView,
        _path: &str,
        _value: &str,
    ) -> Option<String> {
        None
    }
}

/// Translate a registry key-name glob into an anchored, case-insensitive
/// regex: `*` matches any run, `?` matches one character, everything else is
/// literal.
pub fn glob_to_regex(glob: &str) -> Regex {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push_str("(?i)^");
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    // the translation above only emits valid regex syntax
    Regex::new(&pattern).expect("glob translation produced an invalid pattern")
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory registry double for scanner tests.

    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct FakeRegistry {
        // (hive, view, key path) -> value name -> data
        entries: HashMap<(RegistryHive, RegistryView, String), HashMap<String, String>>,
    }

    impl FakeRegistry {
        pub fn insert(
            &mut self,
            hive: RegistryHive,
            view: RegistryView,
            path: &str,
            value: &str,
            data: &str,
        ) {
            self.entries
                .entry((hive, view, path.to_string()))
                .or_default()
                .insert(value.to_string(), data.to_string());
        }
    }

    impl RegistryAccess for FakeRegistry {
        fn subkeys(&self, hive: RegistryHive, view: RegistryView, path: &str) -> Vec<String> {
            let prefix = format!("{}\\", path.to_ascii_lowercase());
            let mut names: Vec<String> = self
                .entries
                .keys()
                .filter(|(h, v, _)| *h == hive && *v == view)
                .filter_map(|(_, _, key)| {
                    key.to_ascii_lowercase()
                        .strip_prefix(&prefix)
                        .filter(|rest| !rest.contains('\\'))
                        .map(|_| key[path.len() + 1..].to_string())
                })
                .collect();
            names.sort();
            names
        }

        fn get_string(
            &self,
            hive: RegistryHive,
            view: RegistryView,
            path: &str,
            value: &str,
        ) -> Option<String> {
            self.entries
                .iter()
                .find(|((h, v, key), _)| {
                    *h == hive && *v == view && key.eq_ignore_ascii_case(path)
                })
                .and_then(|(_, values)| values.get(value).cloned())
        }
    }
}
