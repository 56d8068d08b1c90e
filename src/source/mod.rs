//! Statement sources: where triples come from.
//!
//! Two encodings are supported behind one trait:
//!
//! - [`rdf::RdfSource`]: triple documents (Turtle, N-Triples, RDF/XML, ...)
//!   parsed with oxigraph.
//! - [`tabular::TabularSource`]: precomputed JSON tables lowered into the same
//!   statement shape.
//!
//! Consumers never learn which one produced their statements. A dataset lists
//! its candidates in preference order and [`load_first_available`] probes them.

pub mod rdf;
pub mod tabular;

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SourceError, SourceResult};
use crate::graph::Statement;

/// Default HTTP timeout for remote sources.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// A local file.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl SourceLocation {
    /// Resolve a configured location string against a base (directory or URL).
    ///
    /// Absolute URLs and absolute paths ignore the base.
    pub fn resolve(base: &str, location: &str) -> Self {
        if is_url(location) {
            return Self::Url(location.to_string());
        }
        if Path::new(location).is_absolute() {
            return Self::Path(PathBuf::from(location));
        }
        if is_url(base) {
            let base = base.trim_end_matches('/');
            let rel = location.trim_start_matches("./");
            return Self::Url(format!("{base}/{rel}"));
        }
        Self::Path(Path::new(base).join(location))
    }

    /// File extension of the location, lower-cased, ignoring URL query strings.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            Self::Path(p) => p.file_name()?.to_string_lossy().into_owned(),
            Self::Url(u) => {
                let path = u.split(['?', '#']).next().unwrap_or(u);
                path.rsplit('/').next()?.to_string()
            }
        };
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Read a location fresh (no caching).
pub fn fetch(location: &SourceLocation, timeout: Duration) -> SourceResult<Vec<u8>> {
    match location {
        SourceLocation::Path(path) => std::fs::read(path).map_err(|e| SourceError::Fetch {
            location: location.to_string(),
            message: e.to_string(),
        }),
        SourceLocation::Url(url) => {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            let response = agent.get(url).call().map_err(|e| SourceError::Fetch {
                location: url.clone(),
                message: e.to_string(),
            })?;

            let mut data = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut data)
                .map_err(|e| SourceError::Fetch {
                    location: url.clone(),
                    message: format!("read body: {e}"),
                })?;
            Ok(data)
        }
    }
}

/// A producer of statements.
pub trait StatementSource: Send + Sync {
    /// Short human-readable description for logs and load state.
    fn describe(&self) -> String;

    /// Fetch and parse everything this source covers.
    fn load(&self) -> SourceResult<Vec<Statement>>;
}

/// Statements together with the description of the source that produced them.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// The loaded statements.
    pub statements: Vec<Statement>,
    /// `describe()` of the winning source.
    pub source: String,
}

/// Probe `sources` in order and return the first one that loads.
///
/// Each failure is logged and recorded; if none succeeds the result is
/// [`SourceError::Exhausted`] listing every attempt.
pub fn load_first_available(
    dataset: &str,
    sources: &[&dyn StatementSource],
) -> SourceResult<Loaded> {
    let mut attempts = Vec::new();

    for source in sources {
        match source.load() {
            Ok(statements) => {
                tracing::info!(
                    dataset,
                    source = %source.describe(),
                    statements = statements.len(),
                    "loaded statements"
                );
                return Ok(Loaded {
                    statements,
                    source: source.describe(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    dataset,
                    source = %source.describe(),
                    error = %e,
                    "source unavailable, trying next"
                );
                attempts.push(format!("{}: {e}", source.describe()));
            }
        }
    }

    Err(SourceError::Exhausted {
        dataset: dataset.to_string(),
        attempts,
    })
}
