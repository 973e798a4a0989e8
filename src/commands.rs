//! CLI command implementations

use anyhow::Context;
use qgraph_collection::{
    CancellationToken, GenerationOrchestrator, GenerationStatus, GraphCollection, PlotAxes,
    PropertyValue, Settings,
};
use qgraph_core::GraphUnit;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub async fn generate(
    settings: Settings,
    specs_path: PathBuf,
    out: PathBuf,
    append: bool,
) -> anyhow::Result<()> {
    let specs = load_specs(&specs_path)?;
    tracing::info!("Loaded {} specs from {}", specs.len(), specs_path.display());

    let mut collection = if append && out.exists() {
        GraphCollection::open(&out)?
    } else {
        GraphCollection::new()
    };

    // Ctrl-C stops the run; whatever finished by then is still saved.
    let token = CancellationToken::new();
    let listener = spawn_interrupt_listener(token.clone());

    let (mut collection, report) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let orchestrator = GenerationOrchestrator::new(&settings.generation)?;
        let report = orchestrator.generate_with(&mut collection, &specs, &token, |index, graph| {
            tracing::debug!(
                "Spec {} done: {} walkers, exploration {}, {} nodes",
                index,
                graph.walkers(),
                graph.exploration(),
                graph.nodes()
            );
        });
        Ok((collection, report))
    })
    .await??;
    // Generation is over; nothing is left to cancel.
    listener.abort();

    for failure in &report.failures {
        eprintln!("spec {} skipped: {}", failure.index, failure.error);
    }
    collection.save(&out)?;

    match report.status {
        GenerationStatus::Completed => {}
        GenerationStatus::Interrupted => eprintln!("generation interrupted"),
        GenerationStatus::TimedOut => eprintln!("generation timed out"),
    }
    println!(
        "{} of {} graphs generated; {} now holds {}",
        report.appended,
        report.submitted,
        out.display(),
        collection.size()
    );
    Ok(())
}

pub fn list(file: &Path) -> anyhow::Result<()> {
    let collection = GraphCollection::open(file)?;
    print!("{collection}");
    Ok(())
}

pub fn summary(file: &Path, json: bool) -> anyhow::Result<()> {
    let mut collection = GraphCollection::open(file)?;
    let table = collection.summary()?;
    if json {
        println!("{}", serde_json::to_string_pretty(table.rows())?);
    } else {
        print!("{table}");
    }
    Ok(())
}

pub fn filter(file: &Path, out: &Path, select: &[String], exclude: &[String]) -> anyhow::Result<()> {
    let mut current = GraphCollection::open(file)?;
    let before = current.size();

    for condition in select {
        let (property, values) = parse_condition(condition)?;
        current = current.select(&property, values)?;
    }
    for condition in exclude {
        let (property, values) = parse_condition(condition)?;
        current = current.exclude(&property, values)?;
    }

    current.save(out)?;
    println!("kept {} of {} graphs in {}", current.size(), before, out.display());
    Ok(())
}

pub fn merge(first: &Path, second: &Path, out: &Path) -> anyhow::Result<()> {
    let first = GraphCollection::open(first)?;
    let second = GraphCollection::open(second)?;
    let mut merged = (&first + &second)?;
    merged.save(out)?;
    println!("{} graphs written to {}", merged.size(), out.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn plot(
    settings: &Settings,
    file: &Path,
    x: String,
    y: String,
    hue: Option<String>,
    style: Option<String>,
    out: &Path,
    open: bool,
) -> anyhow::Result<()> {
    let mut axes = PlotAxes::new(x, y);
    if let Some(hue) = hue {
        axes = axes.with_hue(hue);
    }
    if let Some(style) = style {
        axes = axes.with_style(style);
    }

    let mut collection = GraphCollection::open(file)?;
    let chart = collection.lineplot(&axes, &settings.plot)?;
    chart.save(out)?;
    tracing::info!("Chart written to {}", out.display());

    if open {
        open::that(out).with_context(|| format!("cannot open {}", out.display()))?;
    }
    Ok(())
}

/// Cancel `token` on the first Ctrl-C until the returned task is aborted.
fn spawn_interrupt_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping generation");
            token.cancel();
        }
    })
}

/// Read a JSON or YAML array of spec records.
fn load_specs(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read specs from {}", path.display()))?;
    let specs: Vec<Value> = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
        _ => serde_json::from_str(&text)?,
    };
    Ok(specs)
}

/// Split `property=v1,v2` into the property name and its values.
fn parse_condition(condition: &str) -> anyhow::Result<(String, Vec<PropertyValue>)> {
    let Some((property, values)) = condition.split_once('=') else {
        anyhow::bail!("expected PROPERTY=VALUES, got `{condition}`");
    };
    let values = values
        .split(',')
        .map(|value| value.trim().parse::<PropertyValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((property.trim().to_string(), values))
}
