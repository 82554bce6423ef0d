use std::fmt;
use std::str::FromStr;

use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::{Error, Result};

/// Kind of a spec file section.
///
/// Each section is introduced by a `%token` header line and runs until the
/// next section header. Content before the first header belongs to the
/// implicit main [`SectionKind::Package`] declaration (the preamble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    /// `%package` — package or subpackage declaration carrying tags.
    Package,
    /// `%description` — free-form package description.
    Description,
    /// `%files` — list of packaged paths.
    Files,
    /// `%build` — build steps.
    Build,
    /// `%install` — install steps.
    Install,
    /// `%prep` — source preparation steps.
    Prep,
    /// `%changelog` — package changelog.
    Changelog,
    /// `%clean` — cleanup steps.
    Clean,
    /// `%check` — test suite steps.
    Check,
    /// `%pre` — scriptlet run before install.
    Pre,
    /// `%post` — scriptlet run after install.
    Post,
    /// `%preun` — scriptlet run before uninstall.
    Preun,
    /// `%postun` — scriptlet run after uninstall.
    Postun,
    /// `%verifyscript` — scriptlet run on verification.
    Verify,
}

impl SectionKind {
    /// Every section kind, in declaration order.
    pub const ALL: [SectionKind; 14] = [
        SectionKind::Package,
        SectionKind::Description,
        SectionKind::Files,
        SectionKind::Build,
        SectionKind::Install,
        SectionKind::Prep,
        SectionKind::Changelog,
        SectionKind::Clean,
        SectionKind::Check,
        SectionKind::Pre,
        SectionKind::Post,
        SectionKind::Preun,
        SectionKind::Postun,
        SectionKind::Verify,
    ];

    /// Whether this is one of the four install/uninstall scriptlets.
    pub fn is_scriptlet(&self) -> bool {
        matches!(
            self,
            SectionKind::Pre | SectionKind::Post | SectionKind::Preun | SectionKind::Postun
        )
    }

    /// Whether `-n` (use the argument as the full package name) applies.
    pub fn accepts_no_primary_prefix(&self) -> bool {
        matches!(
            self,
            SectionKind::Package
                | SectionKind::Description
                | SectionKind::Files
                | SectionKind::Changelog
        ) || self.is_scriptlet()
    }

    /// Whether `-f <file>` (read extra file list) applies.
    pub fn accepts_file_list(&self) -> bool {
        *self == SectionKind::Files
    }

    /// Whether `-p <interpreter>` applies.
    pub fn accepts_interpreter(&self) -> bool {
        self.is_scriptlet()
    }
}

impl FromStr for SectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "%package" => Ok(SectionKind::Package),
            "%description" => Ok(SectionKind::Description),
            "%files" => Ok(SectionKind::Files),
            "%build" => Ok(SectionKind::Build),
            "%install" => Ok(SectionKind::Install),
            "%prep" => Ok(SectionKind::Prep),
            "%changelog" => Ok(SectionKind::Changelog),
            "%clean" => Ok(SectionKind::Clean),
            "%check" => Ok(SectionKind::Check),
            "%pre" => Ok(SectionKind::Pre),
            "%post" => Ok(SectionKind::Post),
            "%preun" => Ok(SectionKind::Preun),
            "%postun" => Ok(SectionKind::Postun),
            "%verifyscript" => Ok(SectionKind::Verify),
            _ => Err(Error::NotASectionHeader(s.to_string())),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SectionKind::Package => "%package",
            SectionKind::Description => "%description",
            SectionKind::Files => "%files",
            SectionKind::Build => "%build",
            SectionKind::Install => "%install",
            SectionKind::Prep => "%prep",
            SectionKind::Changelog => "%changelog",
            SectionKind::Clean => "%clean",
            SectionKind::Check => "%check",
            SectionKind::Pre => "%pre",
            SectionKind::Post => "%post",
            SectionKind::Preun => "%preun",
            SectionKind::Postun => "%postun",
            SectionKind::Verify => "%verifyscript",
        };
        f.write_str(s)
    }
}

/// Conditional directives. They never open a section and stay in the body
/// of whatever section is currently open.
pub const CONDITIONAL_TOKENS: [&str; 10] = [
    "%if", "%ifarch", "%ifnarch", "%ifos", "%ifnos", "%elif", "%elifarch", "%elifos", "%else",
    "%endif",
];

/// How a `%token` is treated by the section splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// A conditional directive, kept as body content.
    Ignorable,
    /// A section header.
    Section(SectionKind),
    /// Anything else: plain content or an unrelated macro.
    Ordinary,
}

/// Classify the leading token of a line.
///
/// # Examples
///
/// ```
/// use rpm_spec::{classify, LineClass, SectionKind};
///
/// assert_eq!(classify("%files"), LineClass::Section(SectionKind::Files));
/// assert_eq!(classify("%endif"), LineClass::Ignorable);
/// assert_eq!(classify("%configure"), LineClass::Ordinary);
/// ```
pub fn classify(token: &str) -> LineClass {
    if CONDITIONAL_TOKENS.contains(&token) {
        return LineClass::Ignorable;
    }
    match token.parse::<SectionKind>() {
        Ok(kind) => LineClass::Section(kind),
        Err(_) => LineClass::Ordinary,
    }
}

/// Split a line into its `%token` and trimmed argument string.
///
/// Returns `None` when the line does not start with `%`. The argument string
/// is `None` when nothing follows the token. Whether the token names a real
/// section is left to [`classify`].
///
/// # Examples
///
/// ```
/// use rpm_spec::split_header;
///
/// assert_eq!(split_header("%files -n doc  "), Some(("%files", Some("-n doc"))));
/// assert_eq!(split_header("%build"), Some(("%build", None)));
/// assert_eq!(split_header("make"), None);
/// ```
pub fn split_header(line: &str) -> Option<(&str, Option<&str>)> {
    let mut input = line;
    let token = section_token(&mut input).ok()?;
    let rest = input.trim();
    Some((token, (!rest.is_empty()).then_some(rest)))
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn section_token<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    ('%', take_while(0.., is_word_char))
        .take()
        .parse_next(input)
}
