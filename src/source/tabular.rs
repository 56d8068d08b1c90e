//! Precomputed JSON tables, lowered into statements.
//!
//! The build step can emit ready-made tables instead of RDF. Each table shape
//! below is rewritten into the statements the RDF form of the same data would
//! have, so the reconstructors cannot tell the two load paths apart.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{SourceError, SourceResult};
use crate::graph::{Statement, Term};
use crate::vocab::{RDF_TYPE, aiact, align, cov, dqv, prov, rdfs, xsd};

use super::{DEFAULT_TIMEOUT, SourceLocation, StatementSource, fetch};

/// Namespace for measurement subjects synthesized from coverage rows.
const MEASUREMENT_NS: &str = "https://w3id.org/aidoc-ap/coverage#measurement-";

// ── Table shapes ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Table {
    /// `{"statements": [...]}`
    Statements { statements: Vec<StatementRow> },
    /// `runs.json`: `{"runs": [...]}`
    Runs { runs: Vec<RunRow> },
    /// `alignments.json`: one row per mapping.
    Mappings(Vec<MappingRow>),
    /// `semantic_mapping.json`: one row per requirement measurement.
    Coverage(Vec<CoverageRow>),
}

#[derive(Debug, Deserialize)]
struct StatementRow {
    subject: String,
    predicate: String,
    object: ObjectCell,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ObjectCell {
    Node {
        id: String,
    },
    Literal {
        value: String,
        #[serde(default)]
        datatype: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunRow {
    id: String,
    #[serde(default)]
    started_at: Option<String>,
    #[serde(default)]
    ended_at: Option<String>,
    #[serde(default)]
    used: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MappingRow {
    mapping: String,
    source: String,
    relation: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    run: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoverageRow {
    requirement_id: String,
    #[serde(default)]
    measurement: Option<String>,
    #[serde(default)]
    coverage_score: Option<f64>,
    #[serde(default)]
    matched_terms: Vec<String>,
    #[serde(default)]
    missing: Vec<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    run: Option<String>,
    #[serde(default)]
    agent: Option<String>,
}

// ── Lowering ────────────────────────────────────────────────────────────

impl Table {
    fn into_statements(self) -> Vec<Statement> {
        let mut out = Vec::new();
        match self {
            Self::Statements { statements } => {
                out.extend(statements.into_iter().map(|row| {
                    let object = match row.object {
                        ObjectCell::Node { id } => Term::Node(id),
                        ObjectCell::Literal { value, datatype } => {
                            Term::Literal { value, datatype }
                        }
                    };
                    Statement::new(row.subject, row.predicate, object)
                }));
            }
            Self::Runs { runs } => {
                for run in runs {
                    lower_run(run, &mut out);
                }
            }
            Self::Mappings(rows) => {
                for row in rows {
                    lower_mapping(row, &mut out);
                }
            }
            Self::Coverage(rows) => {
                for (i, row) in rows.into_iter().enumerate() {
                    lower_coverage(i, row, &mut out);
                }
            }
        }
        out
    }
}

fn lower_run(run: RunRow, out: &mut Vec<Statement>) {
    let id = run.id;
    out.push(Statement::link(&id, RDF_TYPE, prov::ACTIVITY));
    if let Some(t) = run.started_at {
        out.push(Statement::new(
            &id,
            prov::STARTED_AT_TIME,
            Term::typed_literal(t, xsd::DATE_TIME),
        ));
    }
    if let Some(t) = run.ended_at {
        out.push(Statement::new(
            &id,
            prov::ENDED_AT_TIME,
            Term::typed_literal(t, xsd::DATE_TIME),
        ));
    }
    if let Some(used) = run.used {
        out.push(Statement::link(&id, prov::USED, used));
    }
    if let Some(label) = run.label {
        out.push(Statement::new(&id, rdfs::LABEL, Term::literal(label)));
    }
}

fn lower_mapping(row: MappingRow, out: &mut Vec<Statement>) {
    let id = row.mapping;
    out.push(Statement::link(&id, RDF_TYPE, align::MAPPING));
    out.push(Statement::link(&id, align::SOURCE, row.source));
    out.push(Statement::link(&id, align::RELATION, row.relation));
    if let Some(target) = row.target {
        out.push(Statement::link(&id, align::TARGET, target));
    }
    if let Some(conf) = row.confidence {
        out.push(Statement::new(
            &id,
            align::CONFIDENCE,
            Term::typed_literal(conf.to_string(), xsd::FLOAT),
        ));
    }
    if let Some(rationale) = row.rationale {
        out.push(Statement::new(&id, align::RATIONALE, Term::literal(rationale)));
    }
    if let Some(agent) = row.agent {
        out.push(Statement::link(&id, prov::WAS_ATTRIBUTED_TO, agent));
    }
    if let Some(run) = row.run {
        out.push(Statement::link(&id, prov::WAS_GENERATED_BY, run));
    }
}

fn lower_coverage(row_index: usize, row: CoverageRow, out: &mut Vec<Statement>) {
    let id = row
        .measurement
        .unwrap_or_else(|| format!("{MEASUREMENT_NS}{}-{row_index}", row.requirement_id));
    out.push(Statement::link(&id, RDF_TYPE, dqv::QUALITY_MEASUREMENT));
    out.push(Statement::link(
        &id,
        cov::FOR_REQUIREMENT,
        format!("{}{}", aiact::NS, row.requirement_id),
    ));
    if let Some(score) = row.coverage_score {
        out.push(Statement::new(
            &id,
            dqv::VALUE,
            Term::typed_literal(score.to_string(), xsd::FLOAT),
        ));
    }
    for term in row.matched_terms {
        out.push(Statement::new(&id, cov::MATCHED_TERM, Term::literal(term)));
    }
    for label in row.missing {
        out.push(Statement::new(&id, cov::MISSING_LABEL, Term::literal(label)));
    }
    if let Some(reasoning) = row.reasoning {
        out.push(Statement::new(&id, cov::REASONING, Term::literal(reasoning)));
    }
    if let Some(run) = row.run {
        out.push(Statement::link(&id, prov::WAS_GENERATED_BY, run));
    }
    if let Some(agent) = row.agent {
        out.push(Statement::link(&id, prov::WAS_ATTRIBUTED_TO, agent));
    }
}

/// Decode one JSON table into statements.
pub fn decode_table(data: &[u8], location: &str) -> SourceResult<Vec<Statement>> {
    let table: Table = serde_json::from_slice(data).map_err(|e| SourceError::Parse {
        location: location.to_string(),
        format: "JSON table".into(),
        message: e.to_string(),
    })?;
    Ok(table.into_statements())
}

// ── Source ──────────────────────────────────────────────────────────────

/// A required primary table plus optional companion tables.
///
/// The primary must load; a companion that fails (e.g. a missing `runs.json`)
/// is logged and skipped.
#[derive(Debug, Clone)]
pub struct TabularSource {
    primary: SourceLocation,
    companions: Vec<SourceLocation>,
    timeout: Duration,
}

impl TabularSource {
    /// Create a source over a single required table.
    pub fn new(primary: SourceLocation) -> Self {
        Self {
            primary,
            companions: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Add an optional companion table.
    pub fn with_companion(mut self, location: SourceLocation) -> Self {
        self.companions.push(location);
        self
    }

    /// Override the HTTP timeout for remote tables.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl StatementSource for TabularSource {
    fn describe(&self) -> String {
        format!("table {}", self.primary)
    }

    fn load(&self) -> SourceResult<Vec<Statement>> {
        let data = fetch(&self.primary, self.timeout)?;
        let mut statements = decode_table(&data, &self.primary.to_string())?;

        for companion in &self.companions {
            let loaded = fetch(companion, self.timeout)
                .and_then(|data| decode_table(&data, &companion.to_string()));
            match loaded {
                Ok(more) => statements.extend(more),
                Err(e) => {
                    tracing::warn!(
                        table = %companion,
                        error = %e,
                        "companion table unavailable, continuing without it"
                    );
                }
            }
        }

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SubjectIndex;

    #[test]
    fn mapping_rows_lower_to_alignment_statements() {
        let json = br#"[{
            "mapping": "https://w3id.org/aidoc-ap/alignment#m1",
            "source": "https://w3id.org/aidoc-ap#Dataset",
            "relation": "http://www.w3.org/2004/02/skos/core#closeMatch",
            "target": "https://w3id.org/airo#Data",
            "target_ns": "https://w3id.org/airo",
            "confidence": 0.8,
            "rationale": null,
            "run": "https://w3id.org/aidoc-ap/alignment#run1"
        }]"#;
        let stmts = decode_table(json, "alignments.json").unwrap();
        let index = SubjectIndex::build(stmts);
        let m1 = "https://w3id.org/aidoc-ap/alignment#m1";

        assert!(index.has_type(m1, align::MAPPING));
        assert_eq!(index.value(m1, align::CONFIDENCE), Some("0.8"));
        assert_eq!(
            index.value(m1, prov::WAS_GENERATED_BY),
            Some("https://w3id.org/aidoc-ap/alignment#run1")
        );
        assert!(index.first(m1, align::RATIONALE).is_none());
    }

    #[test]
    fn runs_table_lowers_to_activities() {
        let json = br#"{"runs": [
            {"id": "urn:run:1", "startedAt": "2025-03-01T10:00:00Z", "used": "urn:tool/ollama"}
        ]}"#;
        let index = SubjectIndex::build(decode_table(json, "runs.json").unwrap());
        assert!(index.has_type("urn:run:1", prov::ACTIVITY));
        assert_eq!(
            index.value("urn:run:1", prov::STARTED_AT_TIME),
            Some("2025-03-01T10:00:00Z")
        );
        assert!(index.first("urn:run:1", prov::ENDED_AT_TIME).is_none());
    }

    #[test]
    fn coverage_rows_get_unique_subjects() {
        let json = br#"[
            {"requirement": "General description", "requirement_id": "req1", "coverage_score": 0.9,
             "matched_terms": ["AISystem", "Provider"], "missing": ["Intended purpose"]},
            {"requirement_id": "req1", "coverage_score": 0.7}
        ]"#;
        let index = SubjectIndex::build(decode_table(json, "semantic_mapping.json").unwrap());
        let measurements: Vec<&str> = index.subjects_of_type(dqv::QUALITY_MEASUREMENT).collect();
        assert_eq!(measurements.len(), 2);
        assert_eq!(
            index.values(measurements[0], cov::MATCHED_TERM),
            vec!["AISystem", "Provider"]
        );
        assert_eq!(
            index.value(measurements[0], cov::FOR_REQUIREMENT),
            Some("https://w3id.org/aidoc-ap/requirements#req1")
        );
    }

    #[test]
    fn generic_statement_table() {
        let json = br#"{"statements": [
            {"subject": "ex:a", "predicate": "ex:p", "object": {"id": "ex:b"}},
            {"subject": "ex:a", "predicate": "ex:q", "object": {"value": "text"}}
        ]}"#;
        let stmts = decode_table(json, "statements.json").unwrap();
        assert_eq!(stmts[0].object, Term::node("ex:b"));
        assert_eq!(stmts[1].object, Term::literal("text"));
    }

    #[test]
    fn malformed_table_is_a_parse_error() {
        let err = decode_table(br#"{"nope": 1}"#, "x.json").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn missing_companion_is_tolerated() {
        let dir = tempfile::TempDir::new().unwrap();
        let primary = dir.path().join("alignments.json");
        std::fs::write(&primary, "[]").unwrap();

        let source = TabularSource::new(SourceLocation::Path(primary))
            .with_companion(SourceLocation::Path(dir.path().join("runs.json")));
        assert!(source.load().unwrap().is_empty());
    }
}
