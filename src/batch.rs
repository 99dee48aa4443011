//! Batch golden generation over independent jobs.
//!
//! Jobs share nothing but the registry, so they can run in any order. With
//! the `parallel` feature they run on rayon's pool; otherwise one after
//! another. Results always come back in input order, and a failing job
//! never stops the rest of the batch.
//!
//! # Feature Flag
//!
//! ```toml
//! [dependencies]
//! goldvec = { version = "0.1", features = ["parallel"] }
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SimError;
use crate::golden::{GoldenSet, Generator};
use crate::kernel::MissingInputPolicy;
use crate::registry::ModelRegistry;
use crate::types::{ComponentId, WaveformSet};

/// One golden generation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimJob {
    pub component: ComponentId,
    pub inputs: WaveformSet,
    pub n_ticks: usize,
}

impl SimJob {
    pub fn new(component: impl Into<ComponentId>, inputs: WaveformSet, n_ticks: usize) -> Self {
        Self {
            component: component.into(),
            inputs,
            n_ticks,
        }
    }
}

/// Result of one job.
#[derive(Debug)]
pub struct JobOutcome {
    /// Position of the job in the submitted batch
    pub index: usize,
    pub component: ComponentId,
    pub result: Result<GoldenSet, SimError>,
}

impl JobOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Counters for the batch runner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Jobs that produced a golden set
    pub succeeded: u64,
    /// Failed jobs keyed by error kind
    pub failed: BTreeMap<String, u64>,
}

impl BatchStats {
    /// Total failed jobs.
    pub fn failed_total(&self) -> u64 {
        self.failed.values().sum()
    }
}

/// Runs batches of jobs against one registry.
///
/// # Example
///
/// ```
/// use goldvec::batch::{BatchRunner, SimJob};
/// use goldvec::registry::ModelRegistry;
/// use goldvec::types::WaveformSet;
///
/// let registry = ModelRegistry::builtin();
/// let runner = BatchRunner::new(&registry);
///
/// let outcomes = runner.run(vec![
///     SimJob::new("CX556", WaveformSet::new(), 8),
///     SimJob::new("CX999", WaveformSet::new(), 8),
/// ]);
/// assert!(outcomes[0].is_ok());
/// assert!(!outcomes[1].is_ok());
/// assert_eq!(runner.stats().succeeded, 1);
/// ```
pub struct BatchRunner<'r> {
    generator: Generator<'r>,
    stats: RwLock<BatchStats>,
    /// Number of worker threads (0 = auto)
    num_threads: usize,
}

impl<'r> BatchRunner<'r> {
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self {
            generator: Generator::new(registry),
            stats: RwLock::new(BatchStats::default()),
            num_threads: 0,
        }
    }

    /// Sets the missing-input policy for every job.
    pub fn with_policy(mut self, policy: MissingInputPolicy) -> Self {
        self.generator = self.generator.with_policy(policy);
        self
    }

    /// Sets the number of worker threads.
    ///
    /// Pass 0 for automatic detection. Ignored without the `parallel`
    /// feature.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Runs every job and returns their outcomes in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn run(&self, jobs: Vec<SimJob>) -> Vec<JobOutcome> {
        jobs.into_iter()
            .enumerate()
            .map(|(index, job)| self.run_one(index, job))
            .collect()
    }

    /// Runs every job on the rayon pool and returns their outcomes in input
    /// order.
    #[cfg(feature = "parallel")]
    pub fn run(&self, jobs: Vec<SimJob>) -> Vec<JobOutcome> {
        if self.num_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.num_threads)
                .build_global()
                .ok(); // already configured
        }

        jobs.into_par_iter()
            .enumerate()
            .map(|(index, job)| self.run_one(index, job))
            .collect()
    }

    fn run_one(&self, index: usize, job: SimJob) -> JobOutcome {
        let result = self
            .generator
            .generate(&job.component, &job.inputs, job.n_ticks);

        let mut stats = self.stats.write();
        match &result {
            Ok(_) => stats.succeeded += 1,
            Err(e) => {
                tracing::warn!(job = index, component = %job.component, error = %e, "job failed");
                *stats.failed.entry(e.kind().to_string()).or_insert(0) += 1;
            }
        }

        JobOutcome {
            index,
            component: job.component,
            result,
        }
    }

    pub fn stats(&self) -> BatchStats {
        self.stats.read().clone()
    }

    /// Exports batch and kernel counters as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        let stats = self.stats.read();
        serde_json::json!({
            "batch": {
                "succeeded": stats.succeeded,
                "failed": stats.failed,
                "parallel": cfg!(feature = "parallel"),
            },
            "kernel": self.generator.kernel().export_stats(),
        })
    }
}
