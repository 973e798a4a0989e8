//! Integration tests for QGraph
//!
//! These tests drive generation, persistence, filtering and plotting together,
//! both through the library and through the `qgraph` binary.

use qgraph_collection::{
    CancellationToken, GenerationOrchestrator, GenerationSettings, GenerationSpec,
    GenerationStatus, GraphCollection, PlotAxes, PlotSettings,
};
use qgraph_core::GraphUnit;
use serde_json::{Value, json};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn seeded(threads: usize) -> GenerationSettings {
    GenerationSettings {
        threads: Some(threads),
        seed: Some(11),
        ..GenerationSettings::default()
    }
}

fn qgraph(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qgraph"))
        .args(args)
        .current_dir(dir)
        .env("QGRAPH_CONFIG", dir.join("qgraph.toml"))
        .output()
        .expect("Failed to execute qgraph")
}

/// Generate, persist, reopen and slice a collection end to end
#[test]
fn test_generate_save_filter_merge() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("grid.qgl");

    let specs: Vec<Value> = [1usize, 2]
        .iter()
        .flat_map(|&walkers| {
            [0.1, 0.9]
                .into_iter()
                .map(move |exploration| GenerationSpec::new(walkers, exploration, 40).to_record())
        })
        .collect();

    let orchestrator = GenerationOrchestrator::new(&seeded(2)).unwrap();
    let mut collection = GraphCollection::new();
    let report = orchestrator.generate(&mut collection, &specs, &CancellationToken::new());
    assert_eq!(report.status, GenerationStatus::Completed);
    assert_eq!(collection.size(), 4);
    collection.save(&path).unwrap();

    let mut reopened = GraphCollection::open(&path).unwrap();
    assert_eq!(reopened.size(), 4);
    assert_eq!(reopened.summary().unwrap().len(), 4);

    let explorers = reopened.select("exploration", [0.9]).unwrap();
    let settlers = reopened.exclude("exploration", [0.9]).unwrap();
    assert_eq!(explorers.size(), 2);
    assert_eq!(settlers.size(), 2);

    let mut whole = (&explorers + &settlers).unwrap();
    assert_eq!(whole.size(), 4);
    assert_eq!(whole.summary().unwrap().len(), 4);
    assert!(whole.iter().all(|graph| graph.nodes() == 40));
}

/// Interrupting from an async task keeps what was already appended
#[tokio::test]
async fn test_interrupt_from_async_task() {
    let token = CancellationToken::new();
    let interrupt = token.clone();

    let specs: Vec<Value> = (0..8)
        .map(|_| json!({ "walkers": 1, "exploration": 0.5, "nodes": 300 }))
        .collect();

    let handle = tokio::task::spawn_blocking(move || {
        let orchestrator = GenerationOrchestrator::new(&seeded(1)).unwrap();
        let mut collection = GraphCollection::new();
        let report = orchestrator.generate_with(&mut collection, &specs, &token, |_, _| {
            interrupt.cancel();
        });
        (collection, report)
    });

    let (collection, report) = handle.await.unwrap();
    assert_eq!(report.status, GenerationStatus::Interrupted);
    assert_eq!(report.appended, collection.size());
    assert!(collection.size() >= 1);
    assert!(collection.size() < 8);
}

/// Plotting reads the summary and re-saves the bound file with the
/// computed properties
#[test]
fn test_plot_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plot.qgl");

    let orchestrator = GenerationOrchestrator::new(&seeded(2)).unwrap();
    let mut collection = GraphCollection::new();
    orchestrator.generate_specs(
        &mut collection,
        &[
            GenerationSpec::new(1, 0.2, 25),
            GenerationSpec::new(1, 0.6, 25),
            GenerationSpec::new(3, 0.2, 25),
        ],
        &CancellationToken::new(),
    );
    collection.save(&path).unwrap();

    let mut reopened = GraphCollection::open(&path).unwrap();
    let chart = reopened
        .lineplot(
            &PlotAxes::new("exploration", "leaf fraction").with_hue("walkers"),
            &PlotSettings::default(),
        )
        .unwrap();
    assert_eq!(chart.spec()["data"]["values"].as_array().unwrap().len(), 3);

    let stored = GraphCollection::open(&path).unwrap();
    assert!(stored.iter().all(|graph| graph.analysis().computed() == 4));
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_help_and_version() {
    let temp_dir = TempDir::new().unwrap();

    let help = qgraph(temp_dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&help.stdout);
    assert!(stdout.contains("qgraph"));
    assert!(stdout.contains("generate"));

    let version = qgraph(temp_dir.path(), &["version"]);
    assert!(version.status.success());
    assert!(String::from_utf8_lossy(&version.stdout).contains(env!("CARGO_PKG_VERSION")));
}

/// Run every subcommand against files in a scratch directory
#[test]
fn test_cli_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    std::fs::write(
        dir.join("qgraph.toml"),
        "[generation]\nthreads = 2\nseed = 5\n\n[plot]\nwidth = 320\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("specs.yaml"),
        "- { walkers: 1, exploration: 0.1, nodes: 30 }\n\
         - { walkers: 2, exploration: 0.5, nodes: 30 }\n\
         - { walkers: 2, exploration: 0.9, nodes: 30 }\n",
    )
    .unwrap();

    let generated = qgraph(dir, &["generate", "--specs", "specs.yaml", "--out", "all.qgl"]);
    assert!(generated.status.success(), "{:?}", generated);
    assert!(dir.join("all.qgl").exists());

    let listed = qgraph(dir, &["list", "all.qgl"]);
    let listing = String::from_utf8_lossy(&listed.stdout);
    assert!(listing.contains("exploration"));
    assert_eq!(listing.lines().count(), 4);

    let summary = qgraph(dir, &["summary", "all.qgl", "--json"]);
    let rows: Vec<Value> = serde_json::from_slice(&summary.stdout).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row["nodes"] == 30));

    let filtered = qgraph(
        dir,
        &["filter", "all.qgl", "--out", "two.qgl", "--select", "walkers=2"],
    );
    assert!(filtered.status.success(), "{:?}", filtered);
    assert_eq!(GraphCollection::open(dir.join("two.qgl")).unwrap().size(), 2);

    let merged = qgraph(dir, &["merge", "all.qgl", "two.qgl", "--out", "both.qgl"]);
    assert!(merged.status.success(), "{:?}", merged);
    assert_eq!(GraphCollection::open(dir.join("both.qgl")).unwrap().size(), 5);

    let plotted = qgraph(
        dir,
        &["plot", "both.qgl", "-x", "exploration", "-y", "diameter", "--out", "chart.json"],
    );
    assert!(plotted.status.success(), "{:?}", plotted);
    let chart: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("chart.json")).unwrap()).unwrap();
    assert_eq!(chart["width"], 320);

    let appended = qgraph(
        dir,
        &["generate", "--specs", "specs.yaml", "--out", "all.qgl", "--append"],
    );
    assert!(appended.status.success(), "{:?}", appended);
    assert_eq!(GraphCollection::open(dir.join("all.qgl")).unwrap().size(), 6);
}

/// Bad inputs fail with a non-zero exit code and leave no output behind
#[test]
fn test_cli_rejects_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    std::fs::write(dir.join("specs.json"), r#"[{"walkers": 1, "exploration": 0.3, "nodes": 9}]"#)
        .unwrap();

    let wrong_extension = qgraph(dir, &["generate", "--specs", "specs.json", "--out", "out.npy"]);
    assert!(!wrong_extension.status.success());
    assert!(!dir.join("out.npy").exists());

    let generated = qgraph(dir, &["generate", "--specs", "specs.json", "--out", "one.qgl"]);
    assert!(generated.status.success(), "{:?}", generated);

    let unknown = qgraph(
        dir,
        &["filter", "one.qgl", "--out", "none.qgl", "--select", "girth=3"],
    );
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("girth"));
}
