use crate::args::ParsedArgs;
use crate::error::{Error, Result};
use crate::macros::MacroStore;
use crate::section::{classify, split_header, LineClass, SectionKind};

/// A parsed section header line such as `%files -n libwidgets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// The section kind named by the `%token`.
    pub kind: SectionKind,
    /// Flags and positional arguments following the token.
    pub args: ParsedArgs,
    /// The header line as written.
    pub line: String,
}

impl SectionHeader {
    /// Parse a header line, expanding macros in its arguments.
    ///
    /// Fails with [`Error::NotASectionHeader`] when the line does not start
    /// with a recognized section token.
    ///
    /// # Examples
    ///
    /// ```
    /// use rpm_spec::{MacroStore, SectionHeader, SectionKind};
    ///
    /// let header = SectionHeader::parse("%post -p /sbin/ldconfig libs", &MacroStore::new()).unwrap();
    /// assert_eq!(header.kind, SectionKind::Post);
    /// assert_eq!(header.args.args, vec!["libs"]);
    ///
    /// assert!(SectionHeader::parse("%if 0%{?fedora}", &MacroStore::new()).is_err());
    /// ```
    pub fn parse(line: &str, macros: &MacroStore) -> Result<Self> {
        let not_a_header = || Error::NotASectionHeader(line.to_string());
        let (token, raw) = split_header(line).ok_or_else(not_a_header)?;
        let kind = match classify(token) {
            LineClass::Section(kind) => kind,
            LineClass::Ignorable | LineClass::Ordinary => return Err(not_a_header()),
        };
        Ok(SectionHeader {
            kind,
            args: ParsedArgs::parse(kind, raw, macros)?,
            line: line.to_string(),
        })
    }

    /// Parse a header that must declare a package.
    ///
    /// Fails with [`Error::InvalidPackageHeader`] for any other section kind.
    pub fn parse_package(line: &str, macros: &MacroStore) -> Result<Self> {
        let header = Self::parse(line, macros)?;
        if header.kind != SectionKind::Package {
            return Err(Error::InvalidPackageHeader(line.to_string()));
        }
        Ok(header)
    }

    /// Whether this header declares the main package: `%package` with no
    /// name and no `-n`.
    pub fn is_main_declaration(&self) -> bool {
        self.kind == SectionKind::Package
            && self.args.args.is_empty()
            && !self.args.options.no_primary_prefix
    }
}
