//! Parallel batch generation of graphs
//!
//! Specs are grown on a dedicated rayon pool; every finished graph travels
//! back over a channel and is appended by the calling thread as soon as it
//! arrives, so the collection only ever sees single-threaded mutation and its
//! row order is completion order. Cancellation is cooperative: queued tasks
//! that have not started are skipped, in-flight tasks are abandoned and their
//! results dropped, and everything appended so far stays.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use qgraph_core::QGraph;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::collection::GraphCollection;
use crate::config::GenerationSettings;
use crate::error::{CollectionError, Result};

/// What to grow: `nodes` nodes driven by `walkers` walkers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSpec {
    pub walkers: usize,
    pub exploration: f64,
    pub nodes: usize,
}

impl GenerationSpec {
    pub fn new(walkers: usize, exploration: f64, nodes: usize) -> Self {
        GenerationSpec {
            walkers,
            exploration,
            nodes,
        }
    }

    /// Parse a spec record such as `{"walkers": 1, "exploration": 0.1, "nodes": 100}`.
    pub fn from_record(record: &Value) -> Result<Self> {
        let object = record.as_object().ok_or_else(|| CollectionError::TypeMismatch {
            expected: "a spec object",
            found: record.to_string(),
        })?;

        let walkers = unsigned(object, "walkers")?;
        let nodes = unsigned(object, "nodes")?;
        let exploration = required(object, "exploration")?.as_f64().ok_or_else(|| {
            CollectionError::TypeMismatch {
                expected: "a number for `exploration`",
                found: object["exploration"].to_string(),
            }
        })?;

        if nodes == 0 {
            return Err(CollectionError::Construction(
                "a graph has at least one node".to_string(),
            ));
        }
        Ok(GenerationSpec::new(walkers, exploration, nodes))
    }

    pub fn to_record(&self) -> Value {
        json!({
            "walkers": self.walkers,
            "exploration": self.exploration,
            "nodes": self.nodes,
        })
    }

    /// Build the one-node graph and grow it to `nodes` nodes.
    pub fn grow(&self, rng: &mut StdRng) -> Result<QGraph> {
        let mut graph = QGraph::with_rng(self.walkers, self.exploration, rng)?;
        // The first node is already there.
        graph.grow_with(self.nodes.saturating_sub(1), rng);
        Ok(graph)
    }
}

fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value> {
    match object.get(field) {
        Some(Value::Null) | None => Err(CollectionError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn unsigned(object: &Map<String, Value>, field: &'static str) -> Result<usize> {
    let value = required(object, field)?;
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| CollectionError::TypeMismatch {
            expected: "a non-negative integer",
            found: format!("{field} = {value}"),
        })
}

/// Shared flag used to interrupt a generation run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    /// Every spec was either appended or reported as a failure.
    Completed,
    /// Stopped by the cancellation token.
    Interrupted,
    /// No task finished within the configured timeout.
    TimedOut,
}

/// A spec that could not be grown; the rest of the batch is unaffected.
#[derive(Debug)]
pub struct TaskFailure {
    /// Position of the spec in the submitted batch.
    pub index: usize,
    pub error: CollectionError,
}

#[derive(Debug)]
pub struct GenerationReport {
    pub submitted: usize,
    pub appended: usize,
    pub failures: Vec<TaskFailure>,
    pub status: GenerationStatus,
}

struct TaskOutcome {
    index: usize,
    result: Result<QGraph>,
}

/// A task that panicked is reported like any other failed spec.
fn panic_failure(payload: &(dyn Any + Send)) -> CollectionError {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    CollectionError::Construction(format!("task panicked: {message}"))
}

/// Grows batches of specs in parallel and feeds them into a collection.
pub struct GenerationOrchestrator {
    pool: rayon::ThreadPool,
    seed: Option<u64>,
    poll_interval: Duration,
    task_timeout: Option<Duration>,
}

impl GenerationOrchestrator {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let threads = settings.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("qgraph-grow-{i}"))
            .build()
            .map_err(|e| CollectionError::Construction(format!("worker pool: {e}")))?;

        tracing::debug!("Generation pool started with {} workers", threads);
        Ok(GenerationOrchestrator {
            pool,
            seed: settings.seed,
            poll_interval: settings.poll_interval(),
            task_timeout: settings.task_timeout(),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Grow one graph per spec record and append each to `collection` as it
    /// completes.
    pub fn generate(
        &self,
        collection: &mut GraphCollection,
        specs: &[Value],
        token: &CancellationToken,
    ) -> GenerationReport {
        self.generate_with(collection, specs, token, |_, _| {})
    }

    /// Like [`GenerationOrchestrator::generate`] for typed specs.
    pub fn generate_specs(
        &self,
        collection: &mut GraphCollection,
        specs: &[GenerationSpec],
        token: &CancellationToken,
    ) -> GenerationReport {
        let records: Vec<Value> = specs.iter().map(GenerationSpec::to_record).collect();
        self.generate(collection, &records, token)
    }

    /// Like [`GenerationOrchestrator::generate`], calling `observer` with the
    /// spec index and the graph right after each append.
    pub fn generate_with<F>(
        &self,
        collection: &mut GraphCollection,
        specs: &[Value],
        token: &CancellationToken,
        mut observer: F,
    ) -> GenerationReport
    where
        F: FnMut(usize, &Arc<QGraph>),
    {
        let mut report = GenerationReport {
            submitted: specs.len(),
            appended: 0,
            failures: Vec::new(),
            status: GenerationStatus::Completed,
        };
        if specs.is_empty() {
            return report;
        }

        tracing::info!("Generating {} graphs on {} workers", specs.len(), self.workers());

        // Raised when this run stops early, so queued tasks skip their work.
        let abandoned = CancellationToken::new();
        let receiver = self.dispatch(specs, token, &abandoned);

        report.status = match self.drain(&receiver, collection, token, &mut report, &mut observer) {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!("{}; stopping gracefully", error);
                GenerationStatus::Interrupted
            }
        };
        if report.status != GenerationStatus::Completed {
            abandoned.cancel();
        }

        tracing::info!(
            appended = report.appended,
            failed = report.failures.len(),
            status = ?report.status,
            "Generation finished"
        );
        report
    }

    fn dispatch(
        &self,
        specs: &[Value],
        token: &CancellationToken,
        abandoned: &CancellationToken,
    ) -> Receiver<TaskOutcome> {
        let (sender, receiver) = mpsc::channel();

        for (index, record) in specs.iter().enumerate() {
            let sender = sender.clone();
            let record = record.clone();
            let token = token.clone();
            let abandoned = abandoned.clone();
            let seed = self.seed.map(|seed| seed.wrapping_add(index as u64));

            self.pool.spawn(move || {
                if token.is_cancelled() || abandoned.is_cancelled() {
                    return;
                }
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    let mut rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(seed),
                        None => StdRng::from_entropy(),
                    };
                    GenerationSpec::from_record(&record).and_then(|spec| spec.grow(&mut rng))
                }))
                .unwrap_or_else(|payload| Err(panic_failure(payload.as_ref())));
                // The receiver is gone once the run has been abandoned.
                let _ = sender.send(TaskOutcome { index, result });
            });
        }

        receiver
    }

    fn drain<F>(
        &self,
        receiver: &Receiver<TaskOutcome>,
        collection: &mut GraphCollection,
        token: &CancellationToken,
        report: &mut GenerationReport,
        observer: &mut F,
    ) -> Result<GenerationStatus>
    where
        F: FnMut(usize, &Arc<QGraph>),
    {
        let mut idle = Duration::ZERO;
        loop {
            if token.is_cancelled() {
                return Err(CollectionError::Interrupted {
                    appended: report.appended,
                });
            }

            match receiver.recv_timeout(self.poll_interval) {
                Ok(TaskOutcome {
                    index,
                    result: Ok(graph),
                }) => {
                    idle = Duration::ZERO;
                    let graph = Arc::new(graph);
                    collection.append(Arc::clone(&graph));
                    report.appended += 1;
                    tracing::info!(
                        index,
                        id = %graph.id(),
                        nodes = graph.node_count(),
                        "Graph appended ({}/{})",
                        report.appended,
                        report.submitted
                    );
                    observer(index, &graph);
                }
                Ok(TaskOutcome {
                    index,
                    result: Err(error),
                }) => {
                    idle = Duration::ZERO;
                    tracing::warn!("Spec {} skipped: {}", index, error);
                    report.failures.push(TaskFailure { index, error });
                }
                Err(RecvTimeoutError::Timeout) => {
                    idle += self.poll_interval;
                    if let Some(limit) = self.task_timeout {
                        if idle >= limit {
                            tracing::warn!(
                                "No graph finished within {:?}; abandoning {} outstanding specs",
                                limit,
                                report.submitted - report.appended - report.failures.len()
                            );
                            return Ok(GenerationStatus::TimedOut);
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(GenerationStatus::Completed),
            }
        }
    }
}
