//! kTC Classification Binary
//!
//! Loads a topology from a GraphT file, runs topology control once, checks
//! the post-run constraints, and prints a JSON summary to stdout.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `KTC_CONFIG`: path to a JSON config file (overrides the variables below)
//! - `KTC_ALGORITHM`: `MAXPOWER_TC`, `D_KTC`, or `E_KTC` (default: `D_KTC`)
//! - `KTC_OPERATION_MODE`: `BATCH` or `INCREMENTAL` (default: `BATCH`)
//! - `KTC_K`: stretch factor (default: 1.41)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin ktc_classify -- topology.graphT 1.5
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use ktc_kernel::{
    state_fingerprint, topology_fingerprint, ClassificationEngine, ConstraintViolation,
    EngineConfig, GraphTDocument, LinkState, RunSummary,
};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ktc_classify=info,ktc_kernel=info".into());

    // Logs go to stderr so stdout carries only the summary
    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .init();
    }
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    run: RunSummary,
    topology_fingerprint: String,
    state_fingerprint: String,
    violations: &'a [ConstraintViolation],
    links: BTreeMap<&'a str, LinkState>,
}

fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match std::env::var("KTC_CONFIG") {
        Ok(path) if !path.is_empty() => {
            info!(path = %path, "Loading config file");
            Ok(EngineConfig::from_file(path)?)
        }
        _ => Ok(EngineConfig::from_env()?),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: ktc_classify <graph.graphT> [k]");
        std::process::exit(2);
    };

    let mut config = load_config()?;
    if let Some(k) = args.next() {
        config.k = k.parse().map_err(|_| format!("invalid k: '{}'", k))?;
        config.validate()?;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        algorithm = %config.algorithm,
        mode = %config.operation_mode,
        k = config.k,
        "Starting classification"
    );

    let load_start = Instant::now();
    let document = GraphTDocument::read_file(&path)?;
    let mut engine = ClassificationEngine::from_config(&config)?;
    document.apply_to_engine(&mut engine)?;
    info!(
        path = %path,
        nodes = engine.node_count(),
        links = engine.link_count(),
        latency_ms = load_start.elapsed().as_millis() as u64,
        "Topology loaded"
    );

    let run_start = Instant::now();
    let run = engine.run(config.k)?;
    let report = engine.check_constraints_after_topology_control();
    info!(
        latency_ms = run_start.elapsed().as_millis() as u64,
        violations = report.len(),
        "Classification finished"
    );
    if !report.is_empty() {
        error!(violations = report.len(), "Classification violates topology constraints");
    }

    let topology = engine.topology();
    let output = Report {
        run,
        topology_fingerprint: topology_fingerprint(topology),
        state_fingerprint: state_fingerprint(topology),
        violations: report.violations(),
        links: topology.links().map(|l| (l.id().as_str(), l.state())).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
