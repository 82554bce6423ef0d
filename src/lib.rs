//! RPM spec file parser.
//!
//! This crate splits a spec file into its sections, resolves which package
//! each section belongs to, and collects the package tags and build-time
//! macros declared along the way.
//!
//! # Overview
//!
//! A spec file is line oriented. Lines starting with a section token such as
//! `%package`, `%files` or `%post` open a new section; everything up to the
//! next one is that section's body. The text before the first section is the
//! main package's preamble. `Name`, `Version` and `Release` tags in the
//! preamble become the `%{name}`, `%{version}` and `%{release}` macros, and
//! subpackage names are built from `%{name}` unless `-n` is given.
//!
//! Scripts are never executed and only plain `%{name}` placeholders are
//! expanded; conditionals and macro functions are kept as text.
//!
//! # Examples
//!
//! ```
//! use rpm_spec::{SectionKind, SpecFile};
//!
//! let input = "\
//! Name: widgets
//! Version: 1.0
//!
//! %package doc
//! Summary: Documentation for %{name}
//!
//! %files doc
//! /usr/share/doc/%{name}
//! ";
//! let spec = SpecFile::parse(input).unwrap();
//! assert_eq!(spec.get_macro_value("name"), Some("widgets"));
//! assert_eq!(
//!     spec.get_tag_value(Some("widgets-doc"), "Summary"),
//!     Some("Documentation for %{name}")
//! );
//! assert!(spec.section("widgets-doc", SectionKind::Files).is_some());
//! ```

mod args;
mod content;
mod error;
mod header;
mod macros;
mod metadata;
mod package;
mod section;
mod spec_file;
mod tags;

// Re-export public types
pub use args::{ParsedArgs, SectionOptions};
pub use content::{parse_macro_definition, parse_tag_line, DefinitionKind, MacroDefinition};
pub use error::{Error, Result};
pub use header::SectionHeader;
pub use macros::MacroStore;
pub use metadata::PackageMetadata;
pub use package::{package_name_for_header, resolve_package_name, MAIN_PACKAGE};
pub use section::{classify, split_header, LineClass, SectionKind, CONDITIONAL_TOKENS};
pub use spec_file::{SectionTable, SpecFile, SpecParser};
pub use tags::TagStore;
