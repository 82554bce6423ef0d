use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([\w\-:]+)\}").unwrap());

/// Build-time macro table.
///
/// Names are case-sensitive. The indexed shorthands `S:<n>` and `P:<n>` are
/// stored and looked up as `SOURCE<n>` and `PATCH<n>`, so `%{S:0}` and
/// `%{SOURCE0}` name the same macro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroStore {
    values: BTreeMap<String, String>,
}

impl MacroStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name` and return the stored value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rpm_spec::MacroStore;
    ///
    /// let mut macros = MacroStore::new();
    /// macros.set("S:3", "foo.tar.gz");
    /// assert_eq!(macros.get("SOURCE3"), Some("foo.tar.gz"));
    /// assert_eq!(macros.get("S:3"), Some("foo.tar.gz"));
    /// ```
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &str {
        let slot = self
            .values
            .entry(normalize_name(name).into_owned())
            .or_default();
        *slot = value.into();
        slot.as_str()
    }

    /// Look up a macro. An unset macro is `None`; an empty one is `Some("")`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(normalize_name(name).as_ref()).map(String::as_str)
    }

    /// Whether a macro is set.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over stored `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `%{name}` placeholder that has a stored value.
    ///
    /// Unknown placeholders are left as they are. Expansion is a single
    /// pass: placeholders inside substituted values are not expanded again.
    ///
    /// # Examples
    ///
    /// ```
    /// use rpm_spec::MacroStore;
    ///
    /// let mut macros = MacroStore::new();
    /// macros.set("foo", "bar");
    /// assert_eq!(macros.expand("x-%{foo}-y"), "x-bar-y");
    /// assert_eq!(macros.expand("%{undefined_xyz}"), "%{undefined_xyz}");
    /// ```
    pub fn expand(&self, text: &str) -> String {
        PLACEHOLDER_REGEX
            .replace_all(text, |caps: &Captures| match self.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Map `S:<n>` to `SOURCE<n>` and `P:<n>` to `PATCH<n>`.
fn normalize_name(name: &str) -> Cow<'_, str> {
    let indexed = |prefix: &str| {
        name.strip_prefix(prefix)
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    };
    if let Some(index) = indexed("S:") {
        Cow::Owned(format!("SOURCE{index}"))
    } else if let Some(index) = indexed("P:") {
        Cow::Owned(format!("PATCH{index}"))
    } else {
        Cow::Borrowed(name)
    }
}
