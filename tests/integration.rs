//! End-to-end integration tests for aidoc-views.
//!
//! These load the fixture site under `tests/data/` through the full pipeline
//! (source probing, indexing, reconstruction, resolution) and check the views
//! the catalog answers.

use std::collections::HashMap;

use aidoc_views::catalog::{Catalog, LoadState};
use aidoc_views::config::CatalogConfig;
use aidoc_views::query::{
    AlignmentFilter, CoverageBand, CoverageFilter, RecencyPolicy, RelationKind,
    RequirementFilter,
};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");

fn fixture_config() -> CatalogConfig {
    CatalogConfig::with_base(FIXTURES)
}

fn turtle_only_config() -> CatalogConfig {
    CatalogConfig {
        alignment_tables: Vec::new(),
        ..fixture_config()
    }
}

fn source_of(state: &LoadState) -> &str {
    match state {
        LoadState::Ready { source } => source,
        LoadState::Degraded { reason } => panic!("dataset degraded: {reason}"),
    }
}

#[test]
fn precomputed_alignment_tables_win() {
    let catalog = Catalog::load(&fixture_config());
    let view = catalog.alignments();

    assert!(source_of(view.state()).starts_with("table "));
    let ids: Vec<&str> = view.alignments().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "https://w3id.org/aidoc-ap/alignment/mapping/json-1",
            "https://w3id.org/aidoc-ap/alignment/mapping/json-2",
        ]
    );

    // runs.json is a companion table: its runs label the mappings.
    let first = &view.alignments()[0];
    assert_eq!(
        view.run_label(first).as_deref(),
        Some("llama3.1 @ 2025-04-01 08:00:00")
    );
    assert_eq!(first.confidence, Some(0.95));
}

#[test]
fn alignment_documents_come_from_the_manifest() {
    let catalog = Catalog::load(&turtle_only_config());
    let view = catalog.alignments();

    assert!(source_of(view.state()).starts_with("rdf "));
    let ids: Vec<&str> = view.alignments().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "https://w3id.org/aidoc-ap/alignment/mapping/airo-1",
            "https://w3id.org/aidoc-ap/alignment/mapping/airo-2",
            "https://w3id.org/aidoc-ap/alignment/mapping/airo-3",
            "https://w3id.org/aidoc-ap/alignment/mapping/dpv-1",
        ]
    );
    assert_eq!(
        view.namespaces(),
        vec!["https://w3id.org/airo", "https://w3id.org/dpv"]
    );

    let exact = &view.alignments()[0];
    assert_eq!(exact.relation_short(), "skos:exactMatch");
    assert_eq!(exact.relation_kind(), Some(RelationKind::Exact));
    assert_eq!(
        view.run_label(exact).as_deref(),
        Some("llama3.1 @ 2025-02-01 10:00:00")
    );

    let unparsable = view
        .mapping("https://w3id.org/aidoc-ap/alignment/mapping/dpv-1")
        .unwrap();
    assert_eq!(unparsable.confidence, None);
}

#[test]
fn missing_tables_fall_back_to_turtle() {
    let config = CatalogConfig {
        alignment_tables: vec!["nope/alignments.json".into()],
        ..fixture_config()
    };
    let catalog = Catalog::load(&config);
    assert!(source_of(catalog.alignments().state()).starts_with("rdf "));
    assert_eq!(catalog.alignments().alignments().len(), 4);
}

#[test]
fn alignment_filters_combine() {
    let catalog = Catalog::load(&turtle_only_config());
    let view = catalog.alignments();

    let filter = AlignmentFilter::new()
        .with_namespace("https://w3id.org/airo")
        .with_min_confidence(0.8);
    let ids: Vec<&str> = view
        .query(&filter)
        .into_iter()
        .map(|a| a.source_name())
        .collect();
    assert_eq!(ids, vec!["RiskAssessment", "AISystem"]);

    let filter = AlignmentFilter::new().with_text("narrower kind");
    let rows = view.query(&filter);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].relation_short(), "skos:closeMatch");

    let filter = AlignmentFilter::new().with_run("https://w3id.org/aidoc-ap/alignment/runs/airo-1");
    assert_eq!(view.query(&filter).len(), 2);
}

#[test]
fn coverage_default_view_uses_latest_run() {
    let catalog = Catalog::load(&fixture_config());
    let view = catalog.coverage();
    assert!(source_of(view.state()).starts_with("rdf "));

    let rows = view.query(&CoverageFilter::new());
    let reqs: Vec<&str> = rows
        .iter()
        .map(|m| m.requirement_id.as_deref().unwrap_or("-"))
        .collect();
    assert_eq!(reqs, vec!["req1", "req2", "req10", "req42"]);
    assert_eq!(rows[0].score, 0.92);
    assert_eq!(rows[0].display_requirement(), "General description of the AI system");
    assert_eq!(
        rows[0].matched_terms,
        vec!["AISystem", "IntendedPurpose"]
    );
    // Unknown requirement keeps its raw id.
    assert_eq!(rows[3].display_requirement(), "req42");
    assert_eq!(rows[3].requirement_description, None);

    let stats = view.stats(None);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.excellent, 1);
    assert_eq!(stats.good, 1);
    assert!((stats.average - 0.72).abs() < 1e-9);
}

#[test]
fn coverage_run_selection_and_bands() {
    let catalog = Catalog::load(&fixture_config());
    let view = catalog.coverage();
    let early = "https://w3id.org/aidoc-ap/coverage#run-2025-01-10";

    let rows = view.query(&CoverageFilter::new().with_run(early));
    let ids: Vec<&str> = rows.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "https://w3id.org/aidoc-ap/coverage#m-req1-a",
            "https://w3id.org/aidoc-ap/coverage#m-req2-a",
        ]
    );
    assert_eq!(view.stats(Some(early)).total, 2);

    let below = view.query(&CoverageFilter::new().with_band(CoverageBand::from_selector("0.5")));
    let reqs: Vec<&str> = below
        .iter()
        .filter_map(|m| m.requirement_id.as_deref())
        .collect();
    assert_eq!(reqs, vec!["req10", "req42"]);

    let high = view.query(&CoverageFilter::new().with_band(CoverageBand::from_selector("0.9")));
    assert_eq!(high.len(), 1);

    let text = view.query(&CoverageFilter::new().with_text("serious incident"));
    assert_eq!(text.len(), 1);
    assert_eq!(text[0].requirement_id.as_deref(), Some("req10"));

    let options = view.run_options();
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["2025-03-02 (mistral:7b)", "2025-01-10 (llama3.1:8b)"]);
}

#[test]
fn coverage_recency_by_timestamp() {
    let config = CatalogConfig {
        recency: RecencyPolicy::RunTimestamp,
        ..fixture_config()
    };
    let catalog = Catalog::load(&config);
    // Identifiers and timestamps agree in the fixtures, so both policies pick
    // the March run.
    let rows = catalog.coverage().query(&CoverageFilter::new());
    assert_eq!(rows[0].id, "https://w3id.org/aidoc-ap/coverage#m-req1-b");
    assert_eq!(catalog.coverage().recency(), RecencyPolicy::RunTimestamp);
}

#[test]
fn coverage_table_fallback() {
    let config = CatalogConfig {
        coverage_document: "resources/missing.ttl".into(),
        ..fixture_config()
    };
    let catalog = Catalog::load(&config);
    let view = catalog.coverage();
    assert!(source_of(view.state()).starts_with("table "));

    let rows = view.query(&CoverageFilter::new());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].score, 0.91);
    assert_eq!(rows[0].display_requirement(), "General description of the AI system");
    assert_eq!(rows[1].missing, vec!["Component interaction"]);
}

#[test]
fn requirements_sorted_with_questions() {
    let catalog = Catalog::load(&fixture_config());
    let view = catalog.requirements();

    let ids: Vec<&str> = view.requirements().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["req1", "req2", "req10"]);

    let req1 = view.requirement("req1").unwrap();
    assert_eq!(
        req1.competency_questions,
        vec![
            "What is the intended purpose of the system?",
            "Who is the provider of the system?",
        ]
    );
    assert_eq!(req1.source, "Annex IV(1)");

    assert_eq!(view.stages(), vec!["Deployment", "Design", "Development"]);

    let design = view.query(&RequirementFilter::new().with_stage("Design"));
    assert_eq!(design.len(), 1);

    let by_question = view.query(&RequirementFilter::new().with_text("WHO IS THE PROVIDER"));
    assert_eq!(by_question[0].id, "req1");

    let by_description = view.query(&RequirementFilter::new().with_text("post-market phase"));
    assert_eq!(by_description[0].id, "req10");
}

#[test]
fn config_file_and_env_overrides() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(
        &path,
        format!(
            "base = \"{FIXTURES}\"\nalignment_tables = []\nrecency = \"run-timestamp\"\n"
        ),
    )
    .unwrap();

    let env: HashMap<&str, String> = HashMap::from([(
        "AIDOC_ALIGNMENT_TTLS",
        "resources/dpv-alignments.ttl".to_string(),
    )]);
    let config = CatalogConfig::load(&path)
        .unwrap()
        .apply_env_overrides_from(|key| env.get(key).cloned());

    assert_eq!(config.recency, RecencyPolicy::RunTimestamp);
    let catalog = Catalog::load(&config);
    assert_eq!(catalog.alignments().alignments().len(), 1);
    assert_eq!(
        catalog.alignments().alignments()[0].relation_kind(),
        Some(RelationKind::Broad)
    );
}

#[test]
fn empty_site_degrades_every_dataset() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = Catalog::load(&CatalogConfig::with_base(&dir.path().display().to_string()));

    for state in [
        catalog.alignments().state(),
        catalog.coverage().state(),
        catalog.requirements().state(),
    ] {
        assert!(matches!(state, LoadState::Degraded { .. }));
    }
    assert!(catalog.coverage().run_options().is_empty());
    assert!(catalog.requirements().stages().is_empty());
}

#[test]
fn malformed_turtle_degrades_only_that_dataset() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("annex_4.ttl"), "this is not turtle .").unwrap();

    let config = CatalogConfig {
        requirements_document: dir.path().join("annex_4.ttl").display().to_string(),
        ..fixture_config()
    };
    let catalog = Catalog::load(&config);

    match catalog.requirements().state() {
        LoadState::Degraded { reason } => assert!(reason.contains("requirements")),
        other => panic!("expected degraded requirements, got {other:?}"),
    }
    // Coverage still loads; labels fall back to raw ids.
    let rows = catalog.coverage().query(&CoverageFilter::new());
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].display_requirement(), "req1");
}

#[test]
fn alignment_table_site_without_manifest() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::copy(
        format!("{FIXTURES}/alignments.json"),
        dir.path().join("alignments.json"),
    )
    .unwrap();

    let catalog = Catalog::load(&CatalogConfig::with_base(&dir.path().display().to_string()));
    let view = catalog.alignments();
    assert!(source_of(view.state()).starts_with("table "));
    assert_eq!(view.alignments().len(), 2);
    // runs.json is an optional companion; without it runs are just unknown.
    assert!(view.runs().is_empty());
}

#[test]
fn requirements_table_fallback() {
    let dir = tempfile::TempDir::new().unwrap();
    let req5 = "https://w3id.org/aidoc-ap/requirements#req5";
    let table = serde_json::json!({
        "statements": [
            {
                "subject": req5,
                "predicate": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                "object": {"id": "https://w3id.org/aidoc-ap/requirements#Requirement"}
            },
            {
                "subject": req5,
                "predicate": "http://www.w3.org/2000/01/rdf-schema#label",
                "object": {"value": "Risk management system"}
            }
        ]
    });
    std::fs::write(dir.path().join("annex_4.json"), table.to_string()).unwrap();

    let config = CatalogConfig {
        requirements_table: Some("annex_4.json".into()),
        ..CatalogConfig::with_base(&dir.path().display().to_string())
    };
    let catalog = Catalog::load(&config);
    let view = catalog.requirements();

    assert!(source_of(view.state()).starts_with("table "));
    let req = view.requirement("req5").unwrap();
    assert_eq!(req.label, "Risk management system");
    assert_eq!(req.lifecycle_stage, "Not specified");
}
