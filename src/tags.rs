use std::collections::BTreeMap;

/// Per-package metadata tags (`Key: value` lines from `%package` sections).
///
/// Tag names keep their original case. A later value for the same package
/// and tag replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStore {
    packages: BTreeMap<String, BTreeMap<String, String>>,
}

impl TagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tag: value` for `package`.
    pub fn set_tag_value(&mut self, package: &str, tag: &str, value: impl Into<String>) {
        self.packages
            .entry(package.to_string())
            .or_default()
            .insert(tag.to_string(), value.into());
    }

    /// Look up a tag value.
    pub fn get_tag_value(&self, package: &str, tag: &str) -> Option<&str> {
        self.packages
            .get(package)
            .and_then(|tags| tags.get(tag))
            .map(String::as_str)
    }

    /// All tags recorded for `package`.
    pub fn tags(&self, package: &str) -> Option<&BTreeMap<String, String>> {
        self.packages.get(package)
    }

    /// Names of all packages that have at least one tag.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}
