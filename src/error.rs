use std::path::PathBuf;

/// Error type for spec file parsing.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The spec file does not exist.
    #[error("spec file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The spec file exists but could not be read.
    #[error("cannot read spec file {}: {message}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error message.
        message: String,
    },

    /// The line does not start a recognized section.
    #[error("not a section header: {0}")]
    NotASectionHeader(String),

    /// Declaration tags were requested for a header that is not `%package`.
    #[error("invalid package declaration: {0}")]
    InvalidPackageHeader(String),

    /// A package name was needed before the main package declared `Name`.
    #[error("`{section}` needs the main package name, but no Name tag has been declared yet")]
    MissingMainName {
        /// The header line (or `%package` for the preamble) being resolved.
        section: String,
    },

    /// A flag that takes a value was the last token of its header.
    #[error("flag {flag} requires a value in `{header}`")]
    MissingFlagValue {
        /// The flag token, e.g. `-f`.
        flag: String,
        /// The full header line.
        header: String,
    },
}

/// Result type for spec file operations.
pub type Result<T> = std::result::Result<T, Error>;
