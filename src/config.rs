//! Catalog configuration: where each dataset is read from.
//!
//! Configuration is TOML. Every field has a default matching the published
//! documentation site layout, so an empty file (or no file) is valid.
//! Process-wide environment variables override the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, SourceError, SourceResult};
use crate::query::RecencyPolicy;
use crate::source::rdf::RdfSource;
use crate::source::{self, SourceLocation};

/// Overrides the base directory or URL.
pub const ENV_BASE: &str = "AIDOC_BASE";
/// Comma-separated alignment Turtle documents.
pub const ENV_ALIGNMENT_TTLS: &str = "AIDOC_ALIGNMENT_TTLS";
/// Coverage Turtle document.
pub const ENV_COVERAGE_TTL: &str = "AIDOC_COVERAGE_TTL";
/// Requirements Turtle document.
pub const ENV_REQUIREMENTS_TTL: &str = "AIDOC_REQUIREMENTS_TTL";

/// Dataset locations and load options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory or URL that relative locations resolve against.
    #[serde(default = "default_base")]
    pub base: String,
    /// Precomputed alignment tables: the first is required, the rest are
    /// optional companions. Empty disables the tabular source.
    #[serde(default = "default_alignment_tables")]
    pub alignment_tables: Vec<String>,
    /// Alignment Turtle documents. When empty, the manifest lists them.
    #[serde(default)]
    pub alignment_documents: Vec<String>,
    /// Manifest listing alignment Turtle documents.
    #[serde(default = "default_alignment_manifest")]
    pub alignment_manifest: String,
    /// Coverage Turtle document.
    #[serde(default = "default_coverage_document")]
    pub coverage_document: String,
    /// Precomputed coverage table, tried when the document is unavailable.
    #[serde(default = "default_coverage_table")]
    pub coverage_table: Option<String>,
    /// Requirements Turtle document.
    #[serde(default = "default_requirements_document")]
    pub requirements_document: String,
    /// Precomputed requirements table (`{"statements": [...]}`), tried when the
    /// document is unavailable.
    #[serde(default)]
    pub requirements_table: Option<String>,
    /// How the coverage view decides which run is latest.
    #[serde(default)]
    pub recency: RecencyPolicy,
    /// HTTP timeout for remote sources, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base() -> String {
    ".".into()
}
fn default_alignment_tables() -> Vec<String> {
    vec!["alignments.json".into(), "runs.json".into()]
}
fn default_alignment_manifest() -> String {
    "resources/alignments-manifest.json".into()
}
fn default_coverage_document() -> String {
    "resources/semantic_mapping.ttl".into()
}
fn default_coverage_table() -> Option<String> {
    Some("resources/semantic_mapping.json".into())
}
fn default_requirements_document() -> String {
    "annex_4.ttl".into()
}
fn default_timeout_secs() -> u64 {
    source::DEFAULT_TIMEOUT.as_secs()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            alignment_tables: default_alignment_tables(),
            alignment_documents: Vec::new(),
            alignment_manifest: default_alignment_manifest(),
            coverage_document: default_coverage_document(),
            coverage_table: default_coverage_table(),
            requirements_document: default_requirements_document(),
            requirements_table: None,
            recency: RecencyPolicy::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    /// Defaults rooted at `base`.
    pub fn with_base(base: &str) -> Self {
        Self {
            base: base.to_string(),
            ..Default::default()
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = get(ENV_BASE) {
            self.base = base;
        }
        if let Some(list) = get(ENV_ALIGNMENT_TTLS) {
            self.alignment_documents = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(doc) = get(ENV_COVERAGE_TTL) {
            self.coverage_document = doc;
        }
        if let Some(doc) = get(ENV_REQUIREMENTS_TTL) {
            self.requirements_document = doc;
        }
        self
    }

    /// HTTP timeout for remote sources.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve a configured location against [`base`](Self::base).
    pub fn locate(&self, location: &str) -> SourceLocation {
        SourceLocation::resolve(&self.base, location)
    }

    /// Alignment Turtle documents: the explicit list, else the manifest's.
    ///
    /// The manifest is only fetched when the returned source is loaded. An
    /// unreadable manifest makes that load fail like any unavailable source.
    pub fn alignment_documents_source(&self) -> RdfSource {
        let source = if self.alignment_documents.is_empty() {
            RdfSource::from_manifest(self.locate(&self.alignment_manifest), &self.base)
        } else {
            RdfSource::new(
                self.alignment_documents
                    .iter()
                    .map(|d| self.locate(d))
                    .collect(),
            )
        };
        source.with_timeout(self.timeout())
    }
}

/// Suffix identifying alignment documents in a resources directory.
pub const ALIGNMENT_DOCUMENT_SUFFIX: &str = "-alignments.ttl";

/// Index of alignment Turtle documents, as written next to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentManifest {
    /// Document paths relative to the base, e.g. `resources/airo-alignments.ttl`.
    pub files: Vec<String>,
    /// `files.len()`.
    pub count: usize,
    /// How the manifest was produced.
    #[serde(default = "default_generated")]
    pub generated: String,
}

fn default_generated() -> String {
    "auto".into()
}

impl AlignmentManifest {
    /// Build a manifest from the `*-alignments.ttl` files in `dir`, sorted by name.
    ///
    /// Entries are prefixed with the directory's own name so they resolve
    /// against the directory's parent, which is where the views are served from.
    pub fn scan(dir: &Path) -> SourceResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| SourceError::Fetch {
            location: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let prefix = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(ALIGNMENT_DOCUMENT_SUFFIX))
            .collect();
        names.sort();

        let files: Vec<String> = names
            .into_iter()
            .map(|name| {
                if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}/{name}")
                }
            })
            .collect();

        Ok(Self {
            count: files.len(),
            files,
            generated: default_generated(),
        })
    }

    /// Fetch and decode a manifest.
    pub fn read(location: &SourceLocation, timeout: Duration) -> SourceResult<Self> {
        let data = source::fetch(location, timeout)?;
        serde_json::from_slice(&data).map_err(|e| SourceError::Parse {
            location: location.to_string(),
            format: "alignment manifest".into(),
            message: e.to_string(),
        })
    }

    /// Write the manifest as pretty JSON.
    pub fn save(&self, path: &Path) -> SourceResult<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| SourceError::Parse {
            location: path.display().to_string(),
            format: "alignment manifest".into(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| SourceError::Fetch {
            location: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
