//! Golden output generation.
//!
//! A golden run is a kernel run whose outputs are paired with the test
//! vectors synthesized from them, using the component's timing hints.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::kernel::{Kernel, MissingInputPolicy};
use crate::mask::{synthesize, TestVector};
use crate::registry::ModelRegistry;
use crate::types::{ComponentId, SignalName, WaveformSet};
use crate::waveform::Waveform;

/// Expected values and test vector of one output signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenTrace {
    pub signal: SignalName,
    pub values: Waveform,
    pub test: TestVector,
}

/// All golden traces of one run, in declared output order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenSet {
    pub component: ComponentId,
    pub n_ticks: usize,
    pub traces: Vec<GoldenTrace>,
}

impl GoldenSet {
    /// Trace of one output signal.
    pub fn get(&self, signal: &str) -> Option<&GoldenTrace> {
        self.traces.iter().find(|t| t.signal == signal)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GoldenTrace> {
        self.traces.iter()
    }
}

impl<'a> IntoIterator for &'a GoldenSet {
    type Item = &'a GoldenTrace;
    type IntoIter = std::slice::Iter<'a, GoldenTrace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

/// Produces golden sets from a registry.
pub struct Generator<'r> {
    kernel: Kernel<'r>,
}

impl<'r> Generator<'r> {
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self {
            kernel: Kernel::new(registry),
        }
    }

    /// Sets the kernel's missing-input policy.
    pub fn with_policy(mut self, policy: MissingInputPolicy) -> Self {
        self.kernel = self.kernel.with_policy(policy);
        self
    }

    /// The kernel runs go through.
    pub fn kernel(&self) -> &Kernel<'r> {
        &self.kernel
    }

    /// Simulates `component` and synthesizes a test vector per output.
    pub fn generate(
        &self,
        component: &str,
        inputs: &WaveformSet,
        n_ticks: usize,
    ) -> SimResult<GoldenSet> {
        let output = self.kernel.simulate(component, inputs, n_ticks)?;
        let timing = self
            .kernel
            .registry()
            .describe(component)
            .map(|desc| desc.timing)
            .unwrap_or_default();

        let traces = output
            .into_traces()
            .into_iter()
            .map(|(signal, values)| {
                let test = synthesize(&values, timing);
                GoldenTrace {
                    signal,
                    values,
                    test,
                }
            })
            .collect();

        Ok(GoldenSet {
            component: component.to_string(),
            n_ticks,
            traces,
        })
    }
}
