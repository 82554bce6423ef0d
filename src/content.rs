//! Section body parsers.
//!
//! `%package` bodies (including the preamble) carry `Key: value` tags and
//! `%define`/`%global` macro definitions. Every other section body is kept
//! verbatim.

use tracing::trace;
use winnow::ascii::{space0, space1};
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{rest, take_while};

use crate::macros::MacroStore;
use crate::section::{is_word_char, SectionKind};

/// How a macro definition line binds its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// `%define`: body stored as written.
    Define,
    /// `%global`: body expanded when defined.
    Global,
}

/// A `%define <name> <body>` or `%global <name> <body>` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroDefinition<'a> {
    /// Binding style.
    pub kind: DefinitionKind,
    /// Macro name.
    pub name: &'a str,
    /// Macro body, trimmed.
    pub body: &'a str,
}

/// A meaningful line of a `%package` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationLine<'a> {
    /// `Tag: value`.
    Tag(&'a str, &'a str),
    /// `%define` or `%global`.
    Definition(MacroDefinition<'a>),
}

/// Match a `Tag: value` line.
///
/// The tag is a run of word characters. Whitespace may precede the colon
/// and must follow it. The value is the non-empty rest of the line with
/// surrounding whitespace removed. It is not macro-expanded.
///
/// # Examples
///
/// ```
/// use rpm_spec::parse_tag_line;
///
/// assert_eq!(parse_tag_line("Name:    widgets"), Some(("Name", "widgets")));
/// assert_eq!(parse_tag_line("URL: https://example.org"), Some(("URL", "https://example.org")));
/// assert_eq!(parse_tag_line("Summary:"), None);
/// assert_eq!(parse_tag_line("foo:bar"), None);
/// assert_eq!(parse_tag_line("make install"), None);
/// ```
pub fn parse_tag_line(line: &str) -> Option<(&str, &str)> {
    let mut input = line;
    let (tag, value) = tag_line(&mut input).ok()?;
    let value = value.trim();
    (!value.is_empty()).then_some((tag, value))
}

/// Match a `%define` or `%global` line.
pub fn parse_macro_definition(line: &str) -> Option<MacroDefinition<'_>> {
    let mut input = line.trim_start();
    let (kind, name, body) = definition_line(&mut input).ok()?;
    let body = body.trim();
    (!body.is_empty()).then_some(MacroDefinition { kind, name, body })
}

/// Collect the tags and macro definitions of a `%package` body in file
/// order.
///
/// Lines matching neither form are skipped.
pub fn scan_declaration(text: &str) -> Vec<DeclarationLine<'_>> {
    text.lines()
        .filter_map(|line| {
            let parsed = parse_tag_line(line)
                .map(|(tag, value)| DeclarationLine::Tag(tag, value))
                .or_else(|| parse_macro_definition(line).map(DeclarationLine::Definition));
            if parsed.is_none() {
                trace!("Skipping declaration line: {}", line);
            }
            parsed
        })
        .collect()
}

/// Write the macro a definition line declares.
pub fn apply_definition(macros: &mut MacroStore, definition: &MacroDefinition<'_>) {
    let body = match definition.kind {
        DefinitionKind::Define => definition.body.to_string(),
        DefinitionKind::Global => macros.expand(definition.body),
    };
    macros.set(definition.name, body);
}

/// Write the macros a main-package tag implies.
///
/// `Name`, `Version` and `Release` set their lower-cased macro, `Version`
/// also sets `ver`. `SourceN`/`PatchN` set `SOURCEN`/`PATCHN`; a bare
/// `Source`/`Patch` is index 0.
pub fn record_main_tag(macros: &mut MacroStore, tag: &str, value: &str) {
    match tag {
        "Name" => {
            macros.set("name", value);
        }
        "Version" => {
            macros.set("version", value);
            macros.set("ver", value);
        }
        "Release" => {
            macros.set("release", value);
        }
        _ => {
            if let Some((family, index)) = indexed_tag(tag) {
                macros.set(&format!("{family}{index}"), value);
            }
        }
    }
}

/// Parse the body of a section other than `%package`.
///
/// Bodies are kept verbatim in the section table, so nothing is extracted.
pub fn parse_body(kind: SectionKind, text: &str) {
    trace!("{} body kept verbatim ({} bytes)", kind, text.len());
}

fn indexed_tag(tag: &str) -> Option<(&'static str, &str)> {
    let (family, index) = if let Some(index) = tag.strip_prefix("Source") {
        ("SOURCE", index)
    } else if let Some(index) = tag.strip_prefix("Patch") {
        ("PATCH", index)
    } else {
        return None;
    };
    match index {
        "" => Some((family, "0")),
        index if index.bytes().all(|b| b.is_ascii_digit()) => Some((family, index)),
        _ => None,
    }
}

fn tag_line<'s>(input: &mut &'s str) -> ModalResult<(&'s str, &'s str)> {
    let tag = take_while(1.., is_word_char).parse_next(input)?;
    (space0, ':', space1).parse_next(input)?;
    let value = rest.parse_next(input)?;
    Ok((tag, value))
}

fn definition_line<'s>(input: &mut &'s str) -> ModalResult<(DefinitionKind, &'s str, &'s str)> {
    let kind = alt((
        "%define".value(DefinitionKind::Define),
        "%global".value(DefinitionKind::Global),
    ))
    .parse_next(input)?;
    space1.parse_next(input)?;
    let name = take_while(1.., is_word_char).parse_next(input)?;
    space1.parse_next(input)?;
    let body = rest.parse_next(input)?;
    Ok((kind, name, body))
}
