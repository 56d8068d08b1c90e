//! Rich diagnostic error types for aidoc-views.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.
//!
//! Only loading and configuration can fail. Malformed entities and unresolved
//! references are handled by policy (skip / fallback) and never surface here.

use miette::Diagnostic;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// A data source could not be turned into statements.
///
/// Every variant is a "source unavailable" condition: the catalog reacts to all
/// of them the same way, by trying the next source or degrading to an empty
/// dataset.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("failed to fetch {location}: {message}")]
    #[diagnostic(
        code(aidoc::source::fetch),
        help(
            "The source could not be read. For files, check that the path exists \
             relative to the configured base directory. For URLs, check that the \
             server is reachable and returns 2xx."
        )
    )]
    Fetch { location: String, message: String },

    #[error("failed to parse {location} as {format}: {message}")]
    #[diagnostic(
        code(aidoc::source::parse),
        help(
            "The document was fetched but is not valid {format}. \
             Regenerate it with the alignment or coverage scripts, or point the \
             configuration at a different file."
        )
    )]
    Parse {
        location: String,
        format: String,
        message: String,
    },

    #[error("no source available for {dataset} ({} attempt(s) failed)", .attempts.len())]
    #[diagnostic(
        code(aidoc::source::exhausted),
        help(
            "Every configured source for this dataset failed to load. \
             The view stays usable with an empty dataset; \
             run with RUST_LOG=warn to see each attempt."
        )
    )]
    Exhausted {
        dataset: String,
        attempts: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read catalog config: {path}")]
    #[diagnostic(
        code(aidoc::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog config: {path}: {message}")]
    #[diagnostic(
        code(aidoc::config::parse),
        help("Check the TOML syntax in the catalog config file.")
    )]
    Parse { path: String, message: String },

    #[error("invalid recency policy: \"{value}\"")]
    #[diagnostic(
        code(aidoc::config::recency),
        help("Valid values are \"run-identifier\" and \"run-timestamp\".")
    )]
    InvalidRecency { value: String },
}

/// Result type for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
