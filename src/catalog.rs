//! Catalog facade: the three datasets, loaded and queryable.
//!
//! [`Catalog::load`] fetches alignments, coverage and requirements concurrently,
//! waits for all three, then builds entities. Requirements are reconstructed
//! before coverage because coverage labels resolve against them.
//!
//! Loading never fails. A dataset whose sources are all unavailable becomes an
//! empty collection marked [`LoadState::Degraded`]; its queries still work and
//! return nothing.

use serde::{Deserialize, Serialize};

use crate::config::CatalogConfig;
use crate::entity::{
    Alignment, CoverageMeasurement, Requirement, extract_alignments, extract_measurements,
    extract_requirements, extract_runs, sort_requirements,
};
use crate::error::SourceResult;
use crate::graph::{Statement, SubjectIndex};
use crate::query::{
    self, AlignmentFilter, CoverageFilter, CoverageStats, RecencyPolicy, RequirementFilter,
};
use crate::resolve::{RequirementDirectory, RunDirectory, resolve_requirements};
use crate::source::rdf::RdfSource;
use crate::source::tabular::TabularSource;
use crate::source::{Loaded, StatementSource, load_first_available};

/// Outcome of loading one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    /// Loaded from the described source.
    Ready { source: String },
    /// Every source failed; the dataset is empty.
    Degraded { reason: String },
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// One entry of a run selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOption {
    pub id: String,
    pub label: String,
}

fn split_load(dataset: &str, result: SourceResult<Loaded>) -> (Vec<Statement>, LoadState) {
    match result {
        Ok(loaded) => (
            loaded.statements,
            LoadState::Ready {
                source: loaded.source,
            },
        ),
        Err(e) => {
            tracing::warn!(dataset, error = %e, "dataset degraded to empty");
            let state = LoadState::Degraded {
                reason: e.to_string(),
            };
            (Vec::new(), state)
        }
    }
}

// ── Alignments ──────────────────────────────────────────────────────────

/// Ontology mappings and the runs that produced them.
#[derive(Debug, Clone)]
pub struct AlignmentCatalog {
    alignments: Vec<Alignment>,
    runs: RunDirectory,
    state: LoadState,
}

impl AlignmentCatalog {
    /// Build from already-loaded statements.
    pub fn from_statements(statements: Vec<Statement>, state: LoadState) -> Self {
        let index = SubjectIndex::build(statements);
        let alignments = extract_alignments(&index);
        let runs = RunDirectory::new(extract_runs(&index));
        tracing::info!(
            mappings = alignments.len(),
            runs = runs.len(),
            "alignment catalog ready"
        );
        Self {
            alignments,
            runs,
            state,
        }
    }

    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    pub fn runs(&self) -> &RunDirectory {
        &self.runs
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Mappings passing `filter`, in load order.
    pub fn query(&self, filter: &AlignmentFilter) -> Vec<&Alignment> {
        query::query_alignments(&self.alignments, filter)
    }

    /// Distinct target namespaces, for the namespace selector.
    pub fn namespaces(&self) -> Vec<String> {
        query::distinct_namespaces(&self.alignments)
    }

    /// Distinct relation short forms, for the relation selector.
    pub fn relations(&self) -> Vec<String> {
        query::distinct_relations(&self.alignments)
    }

    /// Run selector entries in load order, labelled `"{tool} @ {when}"`.
    pub fn run_options(&self) -> Vec<RunOption> {
        self.runs
            .runs()
            .iter()
            .map(|r| RunOption {
                id: r.id.clone(),
                label: r.display_label(),
            })
            .collect()
    }

    /// Display label of the run that produced a mapping.
    pub fn run_label(&self, alignment: &Alignment) -> Option<String> {
        alignment
            .generated_by
            .as_deref()
            .map(|id| self.runs.label_for(id))
    }

    /// Detail lookup.
    pub fn mapping(&self, id: &str) -> Option<&Alignment> {
        self.alignments.iter().find(|a| a.id == id)
    }
}

// ── Coverage ────────────────────────────────────────────────────────────

/// Coverage measurements with requirement labels resolved.
#[derive(Debug, Clone)]
pub struct CoverageCatalog {
    measurements: Vec<CoverageMeasurement>,
    runs: RunDirectory,
    recency: RecencyPolicy,
    state: LoadState,
}

impl CoverageCatalog {
    /// Build from already-loaded statements, resolving against `requirements`.
    pub fn from_statements(
        statements: Vec<Statement>,
        requirements: &RequirementDirectory,
        recency: RecencyPolicy,
        state: LoadState,
    ) -> Self {
        let index = SubjectIndex::build(statements);
        let measurements = resolve_requirements(&extract_measurements(&index), requirements);
        let runs = RunDirectory::new(extract_runs(&index));
        tracing::info!(
            measurements = measurements.len(),
            runs = runs.len(),
            ?recency,
            "coverage catalog ready"
        );
        Self {
            measurements,
            runs,
            recency,
            state,
        }
    }

    pub fn measurements(&self) -> &[CoverageMeasurement] {
        &self.measurements
    }

    pub fn runs(&self) -> &RunDirectory {
        &self.runs
    }

    pub fn recency(&self) -> RecencyPolicy {
        self.recency
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The working set: one run's measurements, or latest per requirement.
    pub fn active(&self, run: Option<&str>) -> Vec<&CoverageMeasurement> {
        query::active_measurements(&self.measurements, run, self.recency, &self.runs)
    }

    /// Filtered, sorted view.
    pub fn query(&self, filter: &CoverageFilter) -> Vec<&CoverageMeasurement> {
        query::query_coverage(&self.measurements, filter, self.recency, &self.runs)
    }

    /// Summary over the active set (band and text selections do not apply).
    pub fn stats(&self, run: Option<&str>) -> CoverageStats {
        CoverageStats::from_measurements(&self.active(run))
    }

    /// Run selector entries, newest first, labelled `"{date} ({agent})"`.
    pub fn run_options(&self) -> Vec<RunOption> {
        self.runs
            .sorted_newest_first()
            .into_iter()
            .map(|r| RunOption {
                id: r.id.clone(),
                label: r.option_label(),
            })
            .collect()
    }

    /// Detail lookup.
    pub fn measurement(&self, id: &str) -> Option<&CoverageMeasurement> {
        self.measurements.iter().find(|m| m.id == id)
    }
}

// ── Requirements ────────────────────────────────────────────────────────

/// Annex IV requirements, sorted by number.
#[derive(Debug, Clone)]
pub struct RequirementCatalog {
    requirements: Vec<Requirement>,
    state: LoadState,
}

impl RequirementCatalog {
    /// Build from already-loaded statements.
    pub fn from_statements(statements: Vec<Statement>, state: LoadState) -> Self {
        let index = SubjectIndex::build(statements);
        let mut requirements = extract_requirements(&index);
        sort_requirements(&mut requirements);
        tracing::info!(requirements = requirements.len(), "requirement catalog ready");
        Self {
            requirements,
            state,
        }
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn query(&self, filter: &RequirementFilter) -> Vec<&Requirement> {
        query::query_requirements(&self.requirements, filter)
    }

    /// Distinct lifecycle stages, for the stage selector.
    pub fn stages(&self) -> Vec<String> {
        query::distinct_stages(&self.requirements)
    }

    /// Labels and descriptions keyed by id, for coverage resolution.
    pub fn directory(&self) -> RequirementDirectory {
        RequirementDirectory::new(&self.requirements)
    }

    /// Detail lookup by id (`req3`) or full IRI.
    pub fn requirement(&self, id: &str) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|r| r.id == id || r.uri == id)
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────

/// All three datasets.
#[derive(Debug, Clone)]
pub struct Catalog {
    alignments: AlignmentCatalog,
    coverage: CoverageCatalog,
    requirements: RequirementCatalog,
}

impl Catalog {
    /// Load every dataset named by `config`. Never fails; see [`LoadState`].
    pub fn load(config: &CatalogConfig) -> Self {
        let ((alignments, coverage), requirements) = rayon::join(
            || {
                rayon::join(
                    || load_alignment_statements(config),
                    || load_coverage_statements(config),
                )
            },
            || load_requirement_statements(config),
        );

        let (statements, state) = split_load("requirements", requirements);
        let requirements = RequirementCatalog::from_statements(statements, state);

        let (statements, state) = split_load("coverage", coverage);
        let coverage = CoverageCatalog::from_statements(
            statements,
            &requirements.directory(),
            config.recency,
            state,
        );

        let (statements, state) = split_load("alignments", alignments);
        let alignments = AlignmentCatalog::from_statements(statements, state);

        Self {
            alignments,
            coverage,
            requirements,
        }
    }

    pub fn alignments(&self) -> &AlignmentCatalog {
        &self.alignments
    }

    pub fn coverage(&self) -> &CoverageCatalog {
        &self.coverage
    }

    pub fn requirements(&self) -> &RequirementCatalog {
        &self.requirements
    }
}

/// Precomputed tables first, then the Turtle documents.
fn load_alignment_statements(config: &CatalogConfig) -> SourceResult<Loaded> {
    let timeout = config.timeout();
    let table = config.alignment_tables.split_first().map(|(primary, rest)| {
        rest.iter().fold(
            TabularSource::new(config.locate(primary)).with_timeout(timeout),
            |source, companion| source.with_companion(config.locate(companion)),
        )
    });
    let documents = config.alignment_documents_source();

    let mut sources: Vec<&dyn StatementSource> = Vec::new();
    if let Some(table) = &table {
        sources.push(table);
    }
    sources.push(&documents);
    load_first_available("alignments", &sources)
}

/// The Turtle document first, then the precomputed table.
fn load_coverage_statements(config: &CatalogConfig) -> SourceResult<Loaded> {
    let timeout = config.timeout();
    let document =
        RdfSource::new(vec![config.locate(&config.coverage_document)]).with_timeout(timeout);
    let table = config
        .coverage_table
        .as_deref()
        .map(|t| TabularSource::new(config.locate(t)).with_timeout(timeout));

    let mut sources: Vec<&dyn StatementSource> = Vec::new();
    sources.push(&document);
    if let Some(table) = &table {
        sources.push(table);
    }
    load_first_available("coverage", &sources)
}

/// The Turtle document first, then the optional statements table.
fn load_requirement_statements(config: &CatalogConfig) -> SourceResult<Loaded> {
    let timeout = config.timeout();
    let document =
        RdfSource::new(vec![config.locate(&config.requirements_document)]).with_timeout(timeout);
    let table = config
        .requirements_table
        .as_deref()
        .map(|t| TabularSource::new(config.locate(t)).with_timeout(timeout));

    let mut sources: Vec<&dyn StatementSource> = Vec::new();
    sources.push(&document);
    if let Some(table) = &table {
        sources.push(table);
    }
    load_first_available("requirements", &sources)
}
