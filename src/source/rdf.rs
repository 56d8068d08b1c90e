//! Triple documents parsed with oxigraph.
//!
//! Only the parser is used: quads are flattened into [`Statement`]s (graph
//! names are dropped) and no store is built.

use std::time::Duration;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term as OxTerm;

use crate::config::AlignmentManifest;
use crate::error::{SourceError, SourceResult};
use crate::graph::{Statement, Term};

use super::{DEFAULT_TIMEOUT, SourceLocation, StatementSource, fetch};

/// One or more RDF documents read as a single statement set.
#[derive(Debug, Clone)]
pub struct RdfSource {
    documents: Documents,
    timeout: Duration,
}

/// Where the document list comes from.
#[derive(Debug, Clone)]
enum Documents {
    Listed(Vec<SourceLocation>),
    /// Read from a manifest on load; entries resolve against `base`.
    Manifest {
        location: SourceLocation,
        base: String,
    },
}

impl RdfSource {
    /// Create a source over the given documents, read in order.
    pub fn new(documents: Vec<SourceLocation>) -> Self {
        Self {
            documents: Documents::Listed(documents),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a source over the documents an [`AlignmentManifest`] lists.
    ///
    /// The manifest is not touched until [`load`](StatementSource::load), so a
    /// source that is never probed never fetches it.
    pub fn from_manifest(location: SourceLocation, base: &str) -> Self {
        Self {
            documents: Documents::Manifest {
                location,
                base: base.to_string(),
            },
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the HTTP timeout for remote documents.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The documents this source reads, fetching the manifest if there is one.
    pub fn resolve_documents(&self) -> SourceResult<Vec<SourceLocation>> {
        match &self.documents {
            Documents::Listed(documents) => Ok(documents.clone()),
            Documents::Manifest { location, base } => {
                let manifest = AlignmentManifest::read(location, self.timeout)?;
                Ok(manifest
                    .files
                    .iter()
                    .map(|f| SourceLocation::resolve(base, f))
                    .collect())
            }
        }
    }
}

impl StatementSource for RdfSource {
    fn describe(&self) -> String {
        match &self.documents {
            Documents::Manifest { location, .. } => format!("rdf manifest {location}"),
            Documents::Listed(documents) => match documents.as_slice() {
                [] => "rdf (no documents)".into(),
                [one] => format!("rdf {one}"),
                [first, rest @ ..] => format!("rdf {first} (+{} more)", rest.len()),
            },
        }
    }

    fn load(&self) -> SourceResult<Vec<Statement>> {
        let documents = self.resolve_documents()?;
        if documents.is_empty() {
            return Err(SourceError::Fetch {
                location: "(none)".into(),
                message: "no RDF documents configured".into(),
            });
        }

        let mut statements = Vec::new();
        for location in &documents {
            let data = fetch(location, self.timeout)?;
            let format = format_for(location);
            let parsed = parse_document(&data, format, &location.to_string())?;
            tracing::debug!(
                location = %location,
                format = format.name(),
                statements = parsed.len(),
                "parsed RDF document"
            );
            statements.extend(parsed);
        }
        Ok(statements)
    }
}

/// Pick a parser format from the location's extension, defaulting to Turtle.
pub fn format_for(location: &SourceLocation) -> RdfFormat {
    location
        .extension()
        .and_then(|ext| RdfFormat::from_extension(&ext))
        .unwrap_or(RdfFormat::Turtle)
}

/// Parse a serialized document into statements, in document order.
pub fn parse_document(
    data: &[u8],
    format: RdfFormat,
    location: &str,
) -> SourceResult<Vec<Statement>> {
    let mut statements = Vec::new();
    for quad in RdfParser::from_format(format).for_reader(data) {
        let quad = quad.map_err(|e| SourceError::Parse {
            location: location.to_string(),
            format: format.name().to_string(),
            message: e.to_string(),
        })?;

        statements.push(Statement {
            subject: strip_angles(&quad.subject.to_string()),
            predicate: quad.predicate.as_str().to_string(),
            object: convert_object(quad.object),
        });
    }
    Ok(statements)
}

fn convert_object(term: OxTerm) -> Term {
    match term {
        OxTerm::NamedNode(node) => Term::Node(node.into_string()),
        OxTerm::BlankNode(node) => Term::Node(format!("_:{}", node.as_str())),
        OxTerm::Literal(lit) => Term::typed_literal(lit.value(), lit.datatype().as_str()),
        #[allow(unreachable_patterns)]
        other => Term::Node(strip_angles(&other.to_string())),
    }
}

/// `<iri>` → `iri`; blank nodes (`_:b0`) pass through.
fn strip_angles(s: &str) -> String {
    s.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(s)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{RDF_TYPE, align};

    const TTL: &str = r#"
@prefix align: <https://w3id.org/aidoc-ap/alignment#> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

align:m1 a align:Mapping ;
    align:source <https://w3id.org/aidoc-ap#Dataset> ;
    align:relation skos:exactMatch ;
    align:confidence "0.92"^^xsd:float ;
    align:rationale "Same notion of a dataset." .

align:m2 align:note [ align:rationale "nested" ] .
"#;

    #[test]
    fn parses_turtle_into_statements() {
        let stmts = parse_document(TTL.as_bytes(), RdfFormat::Turtle, "inline").unwrap();
        let m1 = "https://w3id.org/aidoc-ap/alignment#m1";

        assert_eq!(stmts[0].subject, m1);
        assert_eq!(stmts[0].predicate, RDF_TYPE);
        assert_eq!(stmts[0].object, Term::node(align::MAPPING));

        let conf = stmts
            .iter()
            .find(|s| s.predicate == align::CONFIDENCE)
            .unwrap();
        assert_eq!(conf.object.value(), "0.92");
        assert!(!conf.object.is_node());
    }

    #[test]
    fn blank_nodes_keep_underscore_ids() {
        let stmts = parse_document(TTL.as_bytes(), RdfFormat::Turtle, "inline").unwrap();
        let nested = stmts
            .iter()
            .find(|s| s.object.value() == "nested")
            .unwrap();
        assert!(nested.subject.starts_with("_:"));
    }

    #[test]
    fn syntax_errors_report_location() {
        let err = parse_document(b"<a> <b> .", RdfFormat::Turtle, "bad.ttl").unwrap_err();
        match err {
            SourceError::Parse { location, .. } => assert_eq!(location, "bad.ttl"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ntriples_detected_from_extension() {
        let loc = SourceLocation::Path("x/mappings.nt".into());
        assert_eq!(format_for(&loc), RdfFormat::NTriples);
        let loc = SourceLocation::Path("x/annex_4.ttl".into());
        assert_eq!(format_for(&loc), RdfFormat::Turtle);
        let loc = SourceLocation::Path("x/unknown.data".into());
        assert_eq!(format_for(&loc), RdfFormat::Turtle);
    }

    #[test]
    fn empty_source_fails_to_load() {
        assert!(RdfSource::new(vec![]).load().is_err());
    }

    #[test]
    fn manifest_is_read_on_load_not_on_construction() {
        let site = tempfile::tempdir().unwrap();
        let base = site.path().display().to_string();
        let source = RdfSource::from_manifest(
            SourceLocation::resolve(&base, "resources/alignments-manifest.json"),
            &base,
        );
        assert!(source.describe().starts_with("rdf manifest "));
        assert!(matches!(source.load(), Err(SourceError::Fetch { .. })));

        // Written after construction: only a later load can observe it.
        let resources = site.path().join("resources");
        std::fs::create_dir(&resources).unwrap();
        std::fs::write(resources.join("dpv-alignments.ttl"), TTL).unwrap();
        std::fs::write(
            resources.join("alignments-manifest.json"),
            r#"{"files": ["resources/dpv-alignments.ttl"], "count": 1}"#,
        )
        .unwrap();

        assert_eq!(
            source.resolve_documents().unwrap(),
            vec![SourceLocation::Path(resources.join("dpv-alignments.ttl"))]
        );
        let stmts = source.load().unwrap();
        assert!(stmts.iter().any(|s| s.predicate == align::CONFIDENCE));
    }
}
