use crate::macros::MacroStore;
use crate::tags::TagStore;

/// Common metadata for one package, as declared by its `%package` tags.
///
/// Values are macro-expanded but otherwise taken as written; nothing is
/// validated. A subpackage that does not set `Version`, `Release` or `Epoch`
/// inherits the main package's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Resolved package name.
    pub name: String,

    /// `Version` tag.
    pub version: Option<String>,

    /// `Release` tag.
    pub release: Option<String>,

    /// `Epoch` tag.
    pub epoch: Option<String>,

    /// One-line `Summary`.
    pub summary: Option<String>,

    /// `License` expression.
    pub license: Option<String>,

    /// Upstream `URL`.
    pub url: Option<String>,

    /// Package `Group`.
    pub group: Option<String>,
}

impl PackageMetadata {
    /// Build the metadata view for `package`.
    ///
    /// `main` is the main package's table key, used for inherited fields.
    /// Returns `None` if `package` declared no tags.
    pub(crate) fn collect(
        package: &str,
        main: Option<&str>,
        tags: &TagStore,
        macros: &MacroStore,
    ) -> Option<Self> {
        tags.tags(package)?;

        let own = |tag: &str| tags.get_tag_value(package, tag).map(|v| macros.expand(v));
        let inherited = |tag: &str| {
            own(tag).or_else(|| {
                main.and_then(|main| tags.get_tag_value(main, tag))
                    .map(|v| macros.expand(v))
            })
        };

        Some(PackageMetadata {
            name: package.to_string(),
            version: inherited("Version"),
            release: inherited("Release"),
            epoch: inherited("Epoch"),
            summary: own("Summary"),
            license: own("License"),
            url: own("URL"),
            group: own("Group"),
        })
    }

    /// `[epoch:]version-release`, when a version is known.
    pub fn evr(&self) -> Option<String> {
        let version = self.version.as_deref()?;
        let mut evr = match self.epoch.as_deref() {
            Some(epoch) => format!("{epoch}:{version}"),
            None => version.to_string(),
        };
        if let Some(release) = self.release.as_deref() {
            evr.push('-');
            evr.push_str(release);
        }
        Some(evr)
    }
}
