//! aidoc-views CLI: terminal rendering of the alignment, coverage and
//! requirement views.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use aidoc_views::catalog::{Catalog, CoverageCatalog, LoadState, RunOption};
use aidoc_views::config::{AlignmentManifest, CatalogConfig};
use aidoc_views::query::{
    AlignmentFilter, CoverageBand, CoverageFilter, CoverageGrade, RecencyPolicy,
    RequirementFilter,
};

#[derive(Parser)]
#[command(
    name = "aidoc-views",
    version,
    about = "Browse AIDOC alignments, coverage and requirements"
)]
struct Cli {
    /// Catalog config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory or URL for dataset locations (overrides config and AIDOC_BASE).
    #[arg(long, global = true)]
    base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show load state, selector values and runs for every dataset.
    Status,

    /// List ontology alignment mappings.
    Alignments {
        /// Free-text search.
        #[arg(long, default_value = "")]
        q: String,
        /// Target namespace, exact.
        #[arg(long, default_value = "")]
        namespace: String,
        /// Relation short form, e.g. skos:exactMatch.
        #[arg(long, default_value = "")]
        relation: String,
        /// Run identifier, exact.
        #[arg(long, default_value = "")]
        run: String,
        /// Minimum confidence (0 disables).
        #[arg(long, default_value = "0")]
        min_confidence: f64,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List requirement coverage measurements.
    Coverage {
        /// Free-text search.
        #[arg(long, default_value = "")]
        q: String,
        /// Score band: empty for any, 0.5 for below good, otherwise a minimum.
        #[arg(long, default_value = "")]
        band: String,
        /// Run identifier; omit for the latest run per requirement.
        #[arg(long, default_value = "")]
        run: String,
        /// Latest-run policy: run-identifier or run-timestamp.
        #[arg(long)]
        recency: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List Annex IV requirements.
    Requirements {
        /// Free-text search.
        #[arg(long, default_value = "")]
        q: String,
        /// Lifecycle stage, exact.
        #[arg(long, default_value = "")]
        stage: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the detail record for a mapping, measurement or requirement.
    Show {
        /// Mapping or measurement identifier, requirement id (req3) or IRI.
        id: String,
    },

    /// Write alignments-manifest.json for the *-alignments.ttl files in a directory.
    Manifest {
        /// Resources directory to scan.
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    }
    .apply_env_overrides();
    if let Some(base) = cli.base {
        config.base = base;
    }

    match cli.command {
        Commands::Manifest { dir } => {
            let manifest = AlignmentManifest::scan(&dir)?;
            let path = dir.join("alignments-manifest.json");
            manifest.save(&path)?;
            println!(
                "Generated manifest with {} alignment files -> {}",
                manifest.count,
                path.display()
            );
            for file in &manifest.files {
                println!("  - {file}");
            }
        }

        Commands::Status => {
            let catalog = Catalog::load(&config);
            print_state("alignments", catalog.alignments().state());
            println!("  mappings:   {}", catalog.alignments().alignments().len());
            println!("  namespaces: {}", catalog.alignments().namespaces().join(", "));
            println!("  relations:  {}", catalog.alignments().relations().join(", "));
            print_runs(&catalog.alignments().run_options());

            print_state("coverage", catalog.coverage().state());
            print_coverage_summary(catalog.coverage(), None);
            print_runs(&catalog.coverage().run_options());

            print_state("requirements", catalog.requirements().state());
            println!(
                "  requirements: {}",
                catalog.requirements().requirements().len()
            );
            println!("  stages:       {}", catalog.requirements().stages().join(", "));
        }

        Commands::Alignments {
            q,
            namespace,
            relation,
            run,
            min_confidence,
            json,
        } => {
            let catalog = Catalog::load(&config);
            let view = catalog.alignments();
            let filter = AlignmentFilter::new()
                .with_text(&q)
                .with_namespace(&namespace)
                .with_relation(&relation)
                .with_run(&run)
                .with_min_confidence(min_confidence);
            let rows = view.query(&filter);

            if json {
                print_json(&rows)?;
                return Ok(());
            }

            println!("{} of {} mappings", rows.len(), view.alignments().len());
            for m in rows {
                let kind = m.relation_kind().map(|k| k.as_str()).unwrap_or("-");
                let confidence = m
                    .confidence
                    .map(|c| format!("{c:.2}"))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "  {:<32} {:<22} [{kind}] {:<48} {confidence:>5}  {}",
                    m.source_name(),
                    m.relation_short(),
                    m.target,
                    view.run_label(m).unwrap_or_else(|| "-".into()),
                );
            }
        }

        Commands::Coverage {
            q,
            band,
            run,
            recency,
            json,
        } => {
            if let Some(recency) = recency {
                config.recency = recency.parse::<RecencyPolicy>()?;
            }
            let catalog = Catalog::load(&config);
            let view = catalog.coverage();
            let filter = CoverageFilter::new()
                .with_text(&q)
                .with_band(CoverageBand::from_selector(&band))
                .with_run(&run);
            let rows = view.query(&filter);

            if json {
                print_json(&rows)?;
                return Ok(());
            }

            print_coverage_summary(view, filter.run());
            for m in rows {
                println!(
                    "  {:<8} {:<48} {:.2} [{}]  matched {} / missing {}",
                    m.requirement_id.as_deref().unwrap_or("-"),
                    m.display_requirement(),
                    m.score,
                    CoverageGrade::of(m.score).as_str(),
                    m.matched_terms.len(),
                    m.missing.len(),
                );
            }
        }

        Commands::Requirements { q, stage, json } => {
            let catalog = Catalog::load(&config);
            let view = catalog.requirements();
            let filter = RequirementFilter::new().with_text(&q).with_stage(&stage);
            let rows = view.query(&filter);

            if json {
                print_json(&rows)?;
                return Ok(());
            }

            println!("{} of {} requirements", rows.len(), view.requirements().len());
            for r in rows {
                println!(
                    "  {:<6} {:<56} {:<20} {} question(s)",
                    r.id,
                    r.label,
                    r.lifecycle_stage,
                    r.competency_questions.len()
                );
            }
        }

        Commands::Show { id } => {
            let catalog = Catalog::load(&config);

            if let Some(m) = catalog.alignments().mapping(&id) {
                println!("Mapping {}", m.id);
                println!("  source:     {}", m.source);
                println!("  relation:   {}", m.relation_short());
                println!("  target:     {}", m.target);
                println!("  namespace:  {}", m.target_namespace);
                if let Some(c) = m.confidence {
                    println!("  confidence: {c:.2}");
                }
                if let Some(rationale) = &m.rationale {
                    println!("  rationale:  {rationale}");
                }
                if let Some(agent) = &m.agent {
                    println!("  agent:      {agent}");
                }
                if let Some(run_id) = &m.generated_by {
                    println!("  run:        {run_id}");
                    if let Some(run) = catalog.alignments().runs().get(run_id) {
                        println!("    startedAtTime: {}", run.started_at.as_deref().unwrap_or(""));
                        println!("    endedAtTime:   {}", run.ended_at.as_deref().unwrap_or(""));
                        println!("    used:          {}", run.used.as_deref().unwrap_or("-"));
                    }
                }
            } else if let Some(m) = catalog.coverage().measurement(&id) {
                println!("Measurement {}", m.id);
                println!("  requirement: {}", m.display_requirement());
                if let Some(desc) = &m.requirement_description {
                    println!("  description: {desc}");
                }
                println!(
                    "  score:       {:.2} [{}]",
                    m.score,
                    CoverageGrade::of(m.score).as_str()
                );
                println!("  matched:     {}", m.matched_terms.join(", "));
                println!("  missing:     {}", m.missing.join(", "));
                if !m.reasoning.is_empty() {
                    println!("  reasoning:   {}", m.reasoning);
                }
                if let Some(run_id) = &m.generated_by {
                    println!("  run:         {run_id}");
                    if let Some(run) = catalog.coverage().runs().get(run_id) {
                        println!("    started: {}", run.started_at.as_deref().unwrap_or("-"));
                        println!("    ended:   {}", run.ended_at.as_deref().unwrap_or("-"));
                        println!("    label:   {}", run.label.as_deref().unwrap_or("-"));
                    }
                }
            } else if let Some(r) = catalog.requirements().requirement(&id) {
                println!("Requirement {} ({})", r.id, r.uri);
                println!("  label:       {}", r.label);
                println!("  stage:       {}", r.lifecycle_stage);
                if !r.description.is_empty() {
                    println!("  description: {}", r.description);
                }
                if !r.source.is_empty() {
                    println!("  source:      {}", r.source);
                }
                for (i, q) in r.competency_questions.iter().enumerate() {
                    println!("  CQ{}: {q}", i + 1);
                }
            } else {
                miette::bail!("no mapping, measurement or requirement with id \"{id}\"");
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn print_state(dataset: &str, state: &LoadState) {
    match state {
        LoadState::Ready { source } => println!("{dataset}: ready ({source})"),
        LoadState::Degraded { reason } => println!("{dataset}: degraded ({reason})"),
    }
}

fn print_runs(runs: &[RunOption]) {
    if runs.is_empty() {
        return;
    }
    println!("  runs ({}):", runs.len());
    for run in runs {
        println!("    {}  {}", run.label, run.id);
    }
}

fn print_coverage_summary(view: &CoverageCatalog, run: Option<&str>) {
    let stats = view.stats(run);
    println!(
        "  requirements: {}  average: {:.1}% [{}]  excellent: {}  good: {}",
        stats.total,
        stats.average * 100.0,
        stats.grade().as_str(),
        stats.excellent,
        stats.good
    );
}
