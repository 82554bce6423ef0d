use crate::args::ParsedArgs;
use crate::error::{Error, Result};
use crate::header::SectionHeader;
use crate::macros::MacroStore;

/// Package name used for `-n` sections that give no name.
pub const MAIN_PACKAGE: &str = "main";

/// Resolve the package a section belongs to.
///
/// With `-n`, the last positional argument is the full name (or
/// [`MAIN_PACKAGE`] if there is none). Otherwise the name is built from the
/// main package's `name` macro: `<name>-<arg>`, or just `<name>` when no
/// argument is given. `section` is only used in the error when that macro
/// is not set yet.
///
/// # Examples
///
/// ```
/// use rpm_spec::{resolve_package_name, MacroStore, ParsedArgs, SectionKind};
///
/// let mut macros = MacroStore::new();
/// macros.set("name", "widgets");
///
/// let args = ParsedArgs::parse(SectionKind::Package, Some("doc"), &macros).unwrap();
/// assert_eq!(resolve_package_name(&args, &macros, "%package doc").unwrap(), "widgets-doc");
///
/// let args = ParsedArgs::parse(SectionKind::Package, Some("-n doc"), &macros).unwrap();
/// assert_eq!(resolve_package_name(&args, &macros, "%package -n doc").unwrap(), "doc");
/// ```
pub fn resolve_package_name(
    args: &ParsedArgs,
    macros: &MacroStore,
    section: &str,
) -> Result<String> {
    let arg = args.last_arg();

    if args.options.no_primary_prefix {
        return Ok(arg.unwrap_or(MAIN_PACKAGE).to_string());
    }

    let main = macros.get("name").ok_or_else(|| Error::MissingMainName {
        section: section.to_string(),
    })?;
    Ok(match arg {
        Some(arg) => format!("{main}-{arg}"),
        None => main.to_string(),
    })
}

/// Resolve the package a header line belongs to.
pub fn package_name_for_header(line: &str, macros: &MacroStore) -> Result<String> {
    let header = SectionHeader::parse(line, macros)?;
    resolve_package_name(&header.args, macros, &header.line)
}
