//! Tick simulation kernel.
//!
//! The `Kernel` runs one component model over ticks `0..n`, feeding it the
//! input waveforms and collecting one waveform per declared output. Each call
//! builds a fresh model instance from the registry, so runs never share
//! state and may be executed concurrently from several threads.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{ModelError, SimError, SimResult};
use crate::model::{Model, ModelDesc, TickInputs};
use crate::registry::ModelRegistry;
use crate::types::{ComponentId, SignalName, WaveformSet};
use crate::waveform::Waveform;

/// What to do with a declared input that has no waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInputPolicy {
    /// Refuse the run before tick 0
    #[default]
    Reject,
    /// Read the input as 0 on every tick
    TreatAsLow,
}

/// Counters accumulated across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelStats {
    /// Runs attempted
    pub runs: u64,
    /// Runs that produced output
    pub completed: u64,
    /// Runs rejected or faulted
    pub failed: u64,
    /// Ticks simulated by completed runs
    pub ticks_simulated: u64,
}

/// Output waveforms of one run, in declared output order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimOutput {
    /// Component that produced the run
    pub component: ComponentId,
    /// Tick count of every waveform
    pub n_ticks: usize,
    traces: Vec<(SignalName, Waveform)>,
}

impl SimOutput {
    /// Waveform of one output signal.
    pub fn get(&self, signal: &str) -> Option<&Waveform> {
        self.traces
            .iter()
            .find(|(name, _)| name == signal)
            .map(|(_, wave)| wave)
    }

    /// Iterates over `(signal, waveform)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Waveform)> {
        self.traces.iter().map(|(name, wave)| (name.as_str(), wave))
    }

    /// Number of output signals.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Returns true if the model declares no outputs.
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Consumes the output, yielding `(signal, waveform)` pairs.
    pub fn into_traces(self) -> Vec<(SignalName, Waveform)> {
        self.traces
    }
}

/// Simulation kernel over a model registry.
///
/// # Example
///
/// ```
/// use goldvec::kernel::Kernel;
/// use goldvec::registry::ModelRegistry;
/// use goldvec::types::WaveformSet;
/// use goldvec::waveform::Waveform;
///
/// let registry = ModelRegistry::builtin();
/// let kernel = Kernel::new(&registry);
///
/// let mut inputs = WaveformSet::new();
/// inputs.insert("CLK".into(), Waveform::from_bits("01101"));
/// inputs.insert("D".into(), Waveform::from_bits("00111"));
///
/// let output = kernel.simulate("CX74", &inputs, 5).unwrap();
/// assert_eq!(output.get("Q").unwrap().to_bits(), "00001");
/// ```
pub struct Kernel<'r> {
    registry: &'r ModelRegistry,
    policy: MissingInputPolicy,
    stats: RwLock<KernelStats>,
}

impl<'r> Kernel<'r> {
    /// Creates a kernel that rejects runs with missing inputs.
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self {
            registry,
            policy: MissingInputPolicy::default(),
            stats: RwLock::new(KernelStats::default()),
        }
    }

    /// Sets the missing-input policy.
    pub fn with_policy(mut self, policy: MissingInputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the registry this kernel runs against.
    pub fn registry(&self) -> &'r ModelRegistry {
        self.registry
    }

    /// Returns the missing-input policy.
    pub fn policy(&self) -> MissingInputPolicy {
        self.policy
    }

    /// Runs `component` for `n_ticks` ticks.
    ///
    /// # Arguments
    /// * `component` - Registry identifier
    /// * `inputs` - Waveforms by signal name; each must be `n_ticks` long
    /// * `n_ticks` - Number of ticks to simulate
    ///
    /// # Errors
    /// `UnknownComponent`, `LengthMismatch` or `MissingInput` before the run
    /// starts; `ModelFault` if the model fails at some tick.
    pub fn simulate(
        &self,
        component: &str,
        inputs: &WaveformSet,
        n_ticks: usize,
    ) -> SimResult<SimOutput> {
        self.stats.write().runs += 1;

        let result = self.run(component, inputs, n_ticks);

        let mut stats = self.stats.write();
        match &result {
            Ok(_) => {
                stats.completed += 1;
                stats.ticks_simulated += n_ticks as u64;
            }
            Err(_) => stats.failed += 1,
        }
        result
    }

    fn run(&self, component: &str, inputs: &WaveformSet, n_ticks: usize) -> SimResult<SimOutput> {
        let (desc, mut model) = self
            .registry
            .instantiate(component)
            .ok_or_else(|| SimError::UnknownComponent(component.to_string()))?;

        let lines = self.bind_inputs(desc, inputs, n_ticks)?;

        tracing::debug!(component, n_ticks, outputs = desc.outputs.len(), "simulating");

        let traces = drive(desc, model.as_mut(), &lines, n_ticks)?;
        Ok(SimOutput {
            component: desc.id.clone(),
            n_ticks,
            traces: desc.outputs.iter().cloned().zip(traces).collect(),
        })
    }

    /// Pairs every declared input with its waveform.
    fn bind_inputs<'a>(
        &self,
        desc: &'a ModelDesc,
        inputs: &'a WaveformSet,
        n_ticks: usize,
    ) -> SimResult<Vec<(&'a str, Option<&'a Waveform>)>> {
        if let Some((signal, wave)) = inputs.iter().find(|(_, w)| w.len() != n_ticks) {
            return Err(SimError::LengthMismatch {
                component: desc.id.clone(),
                signal: signal.clone(),
                expected: n_ticks,
                actual: wave.len(),
            });
        }

        desc.inputs
            .iter()
            .map(|name| match (inputs.get(name), self.policy) {
                (Some(wave), _) => Ok((name.as_str(), Some(wave))),
                (None, MissingInputPolicy::TreatAsLow) => {
                    tracing::debug!(component = %desc.id, signal = %name, "input missing, reading low");
                    Ok((name.as_str(), None))
                }
                (None, MissingInputPolicy::Reject) => Err(SimError::MissingInput {
                    component: desc.id.clone(),
                    signal: name.clone(),
                }),
            })
            .collect()
    }

    /// Returns a snapshot of the run counters.
    pub fn stats(&self) -> KernelStats {
        self.stats.read().clone()
    }

    /// Exports the run counters as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        let stats = self.stats.read();
        serde_json::json!({
            "runs": stats.runs,
            "completed": stats.completed,
            "failed": stats.failed,
            "ticks_simulated": stats.ticks_simulated,
            "policy": self.policy,
        })
    }
}

/// Folds `model` over ticks `0..n_ticks`.
fn drive(
    desc: &ModelDesc,
    model: &mut dyn Model,
    lines: &[(&str, Option<&Waveform>)],
    n_ticks: usize,
) -> SimResult<Vec<Waveform>> {
    let fault = |tick, source| SimError::ModelFault {
        component: desc.id.clone(),
        tick,
        source,
    };

    let mut traces: Vec<Vec<bool>> = vec![Vec::with_capacity(n_ticks); desc.outputs.len()];

    model.init();
    for tick in 0..n_ticks {
        let view = TickInputs::new(tick, lines);
        let values = panic::catch_unwind(AssertUnwindSafe(|| model.on_tick(&view)))
            .unwrap_or_else(|payload| Err(ModelError::Panicked(panic_message(payload.as_ref()))))
            .map_err(|source| fault(tick, source))?;

        if values.len() != traces.len() {
            return Err(fault(
                tick,
                ModelError::OutputArity {
                    expected: traces.len(),
                    actual: values.len(),
                },
            ));
        }
        for (trace, value) in traces.iter_mut().zip(values) {
            trace.push(value);
        }
    }

    Ok(traces.into_iter().map(Waveform::new).collect())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
