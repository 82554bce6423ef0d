use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::args::ParsedArgs;
use crate::content::{self, DeclarationLine};
use crate::error::{Error, Result};
use crate::header::SectionHeader;
use crate::macros::MacroStore;
use crate::metadata::PackageMetadata;
use crate::package::{resolve_package_name, MAIN_PACKAGE};
use crate::section::{classify, split_header, LineClass, SectionKind};
use crate::tags::TagStore;

/// Section text per package, then per section kind.
///
/// Text is the section's lines joined with `\n`, header line included for
/// explicit sections. A repeated `(package, kind)` keeps the last section.
pub type SectionTable = BTreeMap<String, BTreeMap<SectionKind, String>>;

/// Parser configuration and entry point.
///
/// Every parser owns its macro table; nothing is shared between parses.
///
/// # Examples
///
/// ```
/// use rpm_spec::SpecParser;
///
/// let spec = SpecParser::new()
///     .define("dist", ".fc40")
///     .parse("Name: widgets\nRelease: 1%{dist}\n")
///     .unwrap();
/// assert_eq!(spec.expand("%{name}%{dist}"), "widgets.fc40");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecParser {
    macros: MacroStore,
}

impl SpecParser {
    /// Create a parser with no predefined macros.
    pub fn new() -> Self {
        Self::default()
    }

    /// Predefine a macro, as `rpmbuild --define` does.
    pub fn define(mut self, name: &str, value: impl Into<String>) -> Self {
        self.macros.set(name, value);
        self
    }

    /// Parse spec file text.
    pub fn parse(self, input: &str) -> Result<SpecFile> {
        let mut splitter = Splitter {
            macros: self.macros,
            tags: TagStore::new(),
            sections: SectionTable::new(),
        };
        splitter.run(input)?;

        Ok(SpecFile {
            sections: splitter.sections,
            macros: splitter.macros,
            tags: splitter.tags,
        })
    }

    /// Read and parse a spec file.
    pub fn parse_file(self, path: impl AsRef<Path>) -> Result<SpecFile> {
        let input = read_spec(path.as_ref())?;
        self.parse(&input)
    }
}

/// A parsed spec file.
///
/// # Examples
///
/// ```
/// use rpm_spec::{SectionKind, SpecFile};
///
/// let input = "\
/// Name: widgets
/// Version: 1.0
///
/// %files
/// /usr/bin/widget
/// /usr/share/widgets
/// ";
/// let spec = SpecFile::parse(input).unwrap();
/// assert_eq!(spec.get_macro_value("ver"), Some("1.0"));
/// assert_eq!(
///     spec.section("widgets", SectionKind::Files),
///     Some("%files\n/usr/bin/widget\n/usr/share/widgets")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFile {
    sections: SectionTable,
    macros: MacroStore,
    tags: TagStore,
}

impl SpecFile {
    /// Parse spec file text with a default [`SpecParser`].
    pub fn parse(input: &str) -> Result<Self> {
        SpecParser::new().parse(input)
    }

    /// Read and parse a spec file with a default [`SpecParser`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        SpecParser::new().parse_file(path)
    }

    /// The full section table.
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// Text of one section.
    pub fn section(&self, package: &str, kind: SectionKind) -> Option<&str> {
        self.sections
            .get(package)
            .and_then(|sections| sections.get(&kind))
            .map(String::as_str)
    }

    /// Names of all packages that own at least one section.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// The main package's `Name`.
    pub fn main_name(&self) -> Option<&str> {
        self.macros.get("name")
    }

    /// Look up a tag. `None` or an empty package name means the main package.
    pub fn get_tag_value(&self, package: Option<&str>, tag: &str) -> Option<&str> {
        let package = self.package_or_main(package);
        self.tags.get_tag_value(package, tag)
    }

    /// Look up a macro.
    pub fn get_macro_value(&self, name: &str) -> Option<&str> {
        self.macros.get(name)
    }

    /// Expand `%{name}` placeholders against this file's macros.
    pub fn expand(&self, text: &str) -> String {
        self.macros.expand(text)
    }

    /// The macro table.
    pub fn macros(&self) -> &MacroStore {
        &self.macros
    }

    /// The tag table.
    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    /// Metadata view of a package. `None` or an empty name means the main
    /// package.
    pub fn package_metadata(&self, package: Option<&str>) -> Option<PackageMetadata> {
        let package = self.package_or_main(package);
        PackageMetadata::collect(package, self.main_name(), &self.tags, &self.macros)
    }

    fn package_or_main<'a>(&'a self, package: Option<&'a str>) -> &'a str {
        match package {
            Some(package) if !package.is_empty() => package,
            _ => self.main_name().unwrap_or(MAIN_PACKAGE),
        }
    }
}

/// The section splitter: accumulates lines into the open section and
/// flushes it whenever a new section header starts.
struct Splitter {
    macros: MacroStore,
    tags: TagStore,
    sections: SectionTable,
}

impl Splitter {
    fn run(&mut self, input: &str) -> Result<()> {
        // `None` is the implicit main `%package` declaration (the preamble).
        let mut header: Option<SectionHeader> = None;
        let mut lines: Vec<&str> = Vec::new();

        for line in input.lines() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let is_header = split_header(line)
                .is_some_and(|(token, _)| matches!(classify(token), LineClass::Section(_)));

            if is_header {
                self.flush(header.as_ref(), &lines, Some(line))?;
                header = Some(SectionHeader::parse(line, &self.macros)?);
                lines.clear();
            }
            lines.push(line);
        }

        self.flush(header.as_ref(), &lines, None)
    }

    /// Store the open section. `next` is the header that closes it, named in
    /// errors for an empty preamble.
    fn flush(
        &mut self,
        header: Option<&SectionHeader>,
        lines: &[&str],
        next: Option<&str>,
    ) -> Result<()> {
        let text = lines.join("\n");
        let kind = header.map_or(SectionKind::Package, |h| h.kind);
        let section = match (header, next) {
            (Some(header), _) => header.line.clone(),
            (None, Some(next)) if lines.is_empty() => next.to_string(),
            (None, _) => SectionKind::Package.to_string(),
        };
        let default_args = ParsedArgs::default();
        let args = header.map_or(&default_args, |h| &h.args);

        let package = if kind == SectionKind::Package {
            let is_main = header.map_or(true, SectionHeader::is_main_declaration);
            let mut tags = Vec::new();
            for line in content::scan_declaration(&text) {
                match line {
                    DeclarationLine::Tag(tag, value) => {
                        if is_main {
                            content::record_main_tag(&mut self.macros, tag, value);
                        }
                        tags.push((tag, value));
                    }
                    DeclarationLine::Definition(definition) => {
                        content::apply_definition(&mut self.macros, &definition);
                    }
                }
            }

            let package = resolve_package_name(args, &self.macros, &section)?;
            for (tag, value) in tags {
                self.tags.set_tag_value(&package, tag, value);
            }
            package
        } else {
            let package = resolve_package_name(args, &self.macros, &section)?;
            content::parse_body(kind, &text);
            package
        };

        debug!("Section {} for {}: {} lines", kind, package, lines.len());
        self.sections.entry(package).or_default().insert(kind, text);
        Ok(())
    }
}

fn read_spec(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WIDGETS_SPEC: &str = "\
# Widgets spec
%global forgeurl https://example.org/widgets
Name:           widgets
Version:        1.0
Release:        3%{?dist}
Summary:        Widget toolkit
License:        MIT
URL:            %{forgeurl}
Source0:        %{forgeurl}/archive/v%{version}.tar.gz
Patch1:         fix-build.patch

%description
Widgets for everyone.

%package doc
Summary:        Documentation for %{name}
BuildArch:      noarch

%description doc
HTML docs.

%package -n libwidgets
Summary:        Widget runtime library

%prep
%setup -q
%patch -P1 -p1

%build
%if 0%{?fedora}
%configure --enable-fast
%else
%configure
%endif
make %{?_smp_mflags}

%install
make install DESTDIR=%{buildroot}

%check
make test

%post -n libwidgets -p /sbin/ldconfig

%postun -n libwidgets -p /sbin/ldconfig

%files
/usr/bin/widget
/usr/share/widgets

%files doc
/usr/share/doc/widgets

%files -n libwidgets -f libwidgets.lang
/usr/lib64/libwidgets.so.1

%changelog
* Mon Jan 01 2024 Packager <p@example.org> - 1.0-3
- Initial package
";

    #[test]
    fn minimal_end_to_end() {
        let spec = SpecFile::parse("Name: widgets\nVersion: 1.0\n%files\n/usr/bin/a\n/usr/bin/b\n")
            .unwrap();
        assert_eq!(spec.get_macro_value("name"), Some("widgets"));
        assert_eq!(spec.get_macro_value("ver"), Some("1.0"));
        let files = spec.section("widgets", SectionKind::Files).unwrap();
        let paths: Vec<&str> = files.lines().skip(1).collect();
        assert_eq!(paths, vec!["/usr/bin/a", "/usr/bin/b"]);
    }

    #[test]
    fn full_spec_packages() {
        let spec = SpecFile::parse(WIDGETS_SPEC).unwrap();
        assert_eq!(
            spec.packages().collect::<Vec<_>>(),
            vec!["libwidgets", "widgets", "widgets-doc"]
        );
        assert_eq!(spec.main_name(), Some("widgets"));

        let main = &spec.sections()["widgets"];
        for kind in [
            SectionKind::Package,
            SectionKind::Description,
            SectionKind::Prep,
            SectionKind::Build,
            SectionKind::Install,
            SectionKind::Check,
            SectionKind::Files,
            SectionKind::Changelog,
        ] {
            assert!(main.contains_key(&kind), "missing {kind}");
        }

        let lib = &spec.sections()["libwidgets"];
        assert_eq!(
            lib.keys().copied().collect::<Vec<_>>(),
            vec![
                SectionKind::Package,
                SectionKind::Files,
                SectionKind::Post,
                SectionKind::Postun
            ]
        );
    }

    #[test]
    fn full_spec_macros() {
        let spec = SpecFile::parse(WIDGETS_SPEC).unwrap();
        assert_eq!(spec.get_macro_value("version"), Some("1.0"));
        assert_eq!(spec.get_macro_value("release"), Some("3%{?dist}"));
        assert_eq!(
            spec.get_macro_value("forgeurl"),
            Some("https://example.org/widgets")
        );
        assert_eq!(
            spec.expand("%{S:0}"),
            "%{forgeurl}/archive/v%{version}.tar.gz"
        );
        assert_eq!(spec.get_macro_value("P:1"), Some("fix-build.patch"));
    }

    #[test]
    fn tags_keyed_by_resolved_package() {
        let spec = SpecFile::parse(WIDGETS_SPEC).unwrap();
        assert_eq!(spec.get_tag_value(None, "Summary"), Some("Widget toolkit"));
        assert_eq!(spec.get_tag_value(Some(""), "License"), Some("MIT"));
        assert_eq!(
            spec.get_tag_value(Some("widgets-doc"), "Summary"),
            Some("Documentation for %{name}")
        );
        assert_eq!(
            spec.get_tag_value(Some("libwidgets"), "Summary"),
            Some("Widget runtime library")
        );
        assert_eq!(spec.get_tag_value(Some("doc"), "Summary"), None);
    }

    #[test]
    fn subpackage_tags_leave_main_macros_alone() {
        let input = "Name: widgets\nVersion: 1.0\n%package extra\nVersion: 9.9\nName: bogus\n";
        let spec = SpecFile::parse(input).unwrap();
        assert_eq!(spec.get_macro_value("version"), Some("1.0"));
        assert_eq!(spec.get_macro_value("name"), Some("widgets"));
        assert_eq!(spec.get_tag_value(Some("widgets-extra"), "Version"), Some("9.9"));
    }

    #[test]
    fn conditionals_and_macros_stay_in_body() {
        let spec = SpecFile::parse(WIDGETS_SPEC).unwrap();
        assert_eq!(
            spec.section("widgets", SectionKind::Build),
            Some(
                "%build\n%if 0%{?fedora}\n%configure --enable-fast\n%else\n%configure\n%endif\nmake %{?_smp_mflags}"
            )
        );
    }

    #[test]
    fn blank_and_comment_lines_dropped() {
        let spec = SpecFile::parse("Name: w\n\n# note\n%build\n\n  \n# c\nmake\n  # kept\n").unwrap();
        assert_eq!(
            spec.section("w", SectionKind::Build),
            Some("%build\nmake\n  # kept")
        );
    }

    #[test]
    fn preamble_has_no_header_line() {
        let spec = SpecFile::parse(WIDGETS_SPEC).unwrap();
        let preamble = spec.section("widgets", SectionKind::Package).unwrap();
        assert!(preamble.starts_with("%global forgeurl"));
        assert!(preamble.ends_with("Patch1:         fix-build.patch"));
    }

    #[test]
    fn split_lines_round_trip() {
        let input = "Name: w\n%install\nmkdir -p a\n%{__install} b c\n%endif\n";
        let spec = SpecFile::parse(input).unwrap();
        let text = spec.section("w", SectionKind::Install).unwrap();
        let original: Vec<&str> = input.lines().skip(1).take(4).collect();
        assert_eq!(text.split('\n').collect::<Vec<_>>(), original);
    }

    #[test]
    fn repeated_section_last_wins() {
        let spec = SpecFile::parse("Name: w\n%build\nfirst\n%build\nsecond\n").unwrap();
        assert_eq!(spec.section("w", SectionKind::Build), Some("%build\nsecond"));
    }

    #[test]
    fn header_arguments_are_expanded() {
        let spec = SpecFile::parse("Name: w\n%package -n lib%{name}\n%files -n lib%{name}\n/x\n")
            .unwrap();
        assert!(spec.section("libw", SectionKind::Files).is_some());
    }

    #[test]
    fn unknown_flag_tolerated() {
        let spec = SpecFile::parse("Name: w\n%files --weird doc\n/d\n").unwrap();
        assert_eq!(spec.section("w-doc", SectionKind::Files), Some("%files --weird doc\n/d"));
    }

    #[test]
    fn subpackage_before_name_fails() {
        let err = SpecFile::parse("%package doc\nSummary: docs\nName: widgets\n").unwrap_err();
        assert_eq!(
            err,
            Error::MissingMainName {
                section: "%package doc".to_string()
            }
        );
    }

    #[test]
    fn nameless_preamble_fails() {
        let err = SpecFile::parse("Summary: nameless\n%files doc\n/d\n").unwrap_err();
        assert_eq!(
            err,
            Error::MissingMainName {
                section: "%package".to_string()
            }
        );
    }

    #[test]
    fn empty_input_fails_on_preamble() {
        let err = SpecFile::parse("# only a comment\n").unwrap_err();
        assert_eq!(
            err,
            Error::MissingMainName {
                section: "%package".to_string()
            }
        );
    }

    #[test]
    fn global_sees_earlier_tags() {
        let input = "Name: widgets\nVersion: 1.0\n%global tarball %{name}-%{version}.tar.gz\n%files\n/x\n";
        let spec = SpecFile::parse(input).unwrap();
        assert_eq!(spec.get_macro_value("tarball"), Some("widgets-1.0.tar.gz"));
    }

    #[test]
    fn global_before_tags_keeps_placeholders() {
        let input = "%global early %{name}\nName: widgets\n";
        let spec = SpecFile::parse(input).unwrap();
        assert_eq!(spec.get_macro_value("early"), Some("%{name}"));
    }

    #[test]
    fn tag_needs_space_after_colon() {
        let spec = SpecFile::parse("Name: w\nfoo:bar\nSource1:http://x/a.tar.gz\n").unwrap();
        assert_eq!(spec.get_tag_value(None, "foo"), None);
        assert_eq!(spec.get_tag_value(None, "Source1"), None);
        assert_eq!(spec.get_macro_value("SOURCE1"), None);
    }

    #[test]
    fn missing_flag_value_fails() {
        let err = SpecFile::parse("Name: w\n%files -f\n").unwrap_err();
        assert!(matches!(err, Error::MissingFlagValue { ref flag, .. } if flag == "-f"));
    }

    #[test]
    fn predefined_macros() {
        let spec = SpecParser::new()
            .define("dist", ".el9")
            .parse("%global rel 1%{dist}\nName: w\nRelease: %{rel}\n")
            .unwrap();
        assert_eq!(spec.get_macro_value("rel"), Some("1.el9"));
        assert_eq!(
            spec.package_metadata(None).unwrap().release.as_deref(),
            Some("1.el9")
        );
    }

    #[test]
    fn metadata_for_subpackage() {
        let spec = SpecFile::parse(WIDGETS_SPEC).unwrap();
        let doc = spec.package_metadata(Some("widgets-doc")).unwrap();
        assert_eq!(doc.summary.as_deref(), Some("Documentation for widgets"));
        assert_eq!(doc.version.as_deref(), Some("1.0"));
        let main = spec.package_metadata(None).unwrap();
        assert_eq!(main.url.as_deref(), Some("https://example.org/widgets"));
        assert!(spec.package_metadata(Some("nope")).is_none());
    }

    #[test]
    fn from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Name: widgets\nVersion: 2.0\n%files\n/x\n")
            .unwrap();
        let spec = SpecFile::from_path(file.path()).unwrap();
        assert_eq!(spec.get_tag_value(None, "Version"), Some("2.0"));
    }

    #[test]
    fn from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.spec");
        assert_eq!(SpecFile::from_path(&path), Err(Error::NotFound(path)));
    }

    #[test]
    fn from_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpecFile::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn independent_parsers() {
        let a = SpecFile::parse("Name: a\n").unwrap();
        let b = SpecFile::parse("Name: b\n").unwrap();
        assert_eq!(a.main_name(), Some("a"));
        assert_eq!(b.main_name(), Some("b"));
    }
}
