use tracing::debug;

use crate::error::{Error, Result};
use crate::macros::MacroStore;
use crate::section::SectionKind;

/// Recognized section-header options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionOptions {
    /// `-n`: the positional argument is the full package name.
    pub no_primary_prefix: bool,
    /// `-f <file>`: extra file lists for `%files`, in order.
    pub file_lists: Vec<String>,
    /// `-p <interpreter>`: scriptlet interpreter, last one wins.
    pub interpreter: Option<String>,
}

/// Arguments of a section header after flag parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Positional arguments, macro-expanded, in order.
    pub args: Vec<String>,
    /// Flags that apply to the section kind.
    pub options: SectionOptions,
}

impl ParsedArgs {
    /// Parse the argument string of a `kind` header.
    ///
    /// Only `-n`, `-f <file>` and `-p <interpreter>` are understood, and each
    /// only on the section kinds that accept it. Anything else starting with
    /// `-` is dropped. Values and positional arguments are macro-expanded.
    ///
    /// # Examples
    ///
    /// ```
    /// use rpm_spec::{MacroStore, ParsedArgs, SectionKind};
    ///
    /// let mut macros = MacroStore::new();
    /// macros.set("name", "widgets");
    ///
    /// let parsed = ParsedArgs::parse(
    ///     SectionKind::Files,
    ///     Some("-f %{name}.lang --strange doc"),
    ///     &macros,
    /// )
    /// .unwrap();
    /// assert_eq!(parsed.args, vec!["doc"]);
    /// assert_eq!(parsed.options.file_lists, vec!["widgets.lang"]);
    /// ```
    pub fn parse(kind: SectionKind, raw: Option<&str>, macros: &MacroStore) -> Result<Self> {
        let mut parsed = ParsedArgs::default();
        let mut tokens = raw.unwrap_or_default().split_whitespace();

        while let Some(token) = tokens.next() {
            match token {
                "-n" => {
                    if kind.accepts_no_primary_prefix() {
                        parsed.options.no_primary_prefix = true;
                    } else {
                        debug!("Ignoring -n on {}", kind);
                    }
                }
                "-f" | "-p" => {
                    let applies = match token {
                        "-f" => kind.accepts_file_list(),
                        _ => kind.accepts_interpreter(),
                    };
                    let value = match tokens.next() {
                        Some(value) => value,
                        None if applies => {
                            return Err(Error::MissingFlagValue {
                                flag: token.to_string(),
                                header: header_line(kind, raw),
                            })
                        }
                        None => break,
                    };
                    if !applies {
                        debug!("Ignoring {} {} on {}", token, value, kind);
                        continue;
                    }
                    let value = macros.expand(value);
                    if token == "-f" {
                        parsed.options.file_lists.push(value);
                    } else {
                        parsed.options.interpreter = Some(value);
                    }
                }
                flag if flag.starts_with('-') => {
                    debug!("Ignoring unknown flag {} on {}", flag, kind);
                }
                arg => parsed.args.push(macros.expand(arg)),
            }
        }

        Ok(parsed)
    }

    /// The last positional argument, which names the package.
    pub fn last_arg(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

fn header_line(kind: SectionKind, raw: Option<&str>) -> String {
    match raw {
        Some(raw) => format!("{kind} {raw}"),
        None => kind.to_string(),
    }
}
