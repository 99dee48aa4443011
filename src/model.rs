//! Component model definitions and the `Model` trait.
//!
//! A component model is the hand-authored behaviour of one catalog entry. The
//! static half (`ModelDesc`) names its signals and timing hints; the dynamic
//! half implements `Model` and holds whatever state one run needs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ModelError, ModelResult};
use crate::types::{ComponentId, PinIndex, SignalName, Tick};
use crate::waveform::Waveform;

/// The behaviour class of a model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Outputs depend only on the inputs of the current tick
    Combinational,
    /// Level-sensitive set/reset storage
    Latch,
    /// State updates on a rising clock edge
    EdgeTriggered,
    /// Addressed read/write storage
    Memory,
    /// Outputs are a function of the tick index alone
    Oscillator,
    /// Combines an input with a delayed copy of itself
    DelayLine,
    /// Anything registered from outside the built-in catalog
    Custom(String),
}

/// Timing hints consumed by the mask synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingHints {
    /// Initial ticks during which outputs are not yet meaningful
    #[serde(default)]
    pub warmup_ticks: usize,
    /// Ticks after an output transition, including the transition tick, during
    /// which the new value is not yet guaranteed stable
    #[serde(default = "default_stability_ticks")]
    pub stability_ticks: usize,
}

fn default_stability_ticks() -> usize {
    1
}

impl Default for TimingHints {
    fn default() -> Self {
        Self {
            warmup_ticks: 0,
            stability_ticks: default_stability_ticks(),
        }
    }
}

impl TimingHints {
    /// Creates hints with explicit values.
    pub fn new(warmup_ticks: usize, stability_ticks: usize) -> Self {
        Self {
            warmup_ticks,
            stability_ticks,
        }
    }

    /// Replaces the stability window.
    pub fn with_stability(mut self, ticks: usize) -> Self {
        self.stability_ticks = ticks;
        self
    }

    /// Replaces the warm-up window.
    pub fn with_warmup(mut self, ticks: usize) -> Self {
        self.warmup_ticks = ticks;
        self
    }
}

/// Static description of a catalog entry.
///
/// Describes the model's identity, its interface and timing hints. The
/// behaviour itself is provided by a type implementing [`Model`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDesc {
    /// Catalog key
    pub id: ComponentId,
    /// Behaviour class
    pub kind: ModelKind,
    /// One-line human description
    #[serde(default)]
    pub title: String,
    /// Declared input signals, in declaration order
    pub inputs: Vec<SignalName>,
    /// Declared output signals; a model returns its values in this order
    pub outputs: Vec<SignalName>,
    /// Board pin of each signal, used when reading level files
    #[serde(default)]
    pub pins: BTreeMap<SignalName, PinIndex>,
    /// Hints for don't-care synthesis
    #[serde(default)]
    pub timing: TimingHints,
}

impl ModelDesc {
    /// Creates an empty description with default timing hints.
    pub fn new(id: impl Into<ComponentId>, kind: ModelKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            pins: BTreeMap::new(),
            timing: TimingHints::default(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Declares an input signal sitting on `pin`.
    pub fn with_input(mut self, name: impl Into<SignalName>, pin: PinIndex) -> Self {
        let name = name.into();
        self.pins.insert(name.clone(), pin);
        self.inputs.push(name);
        self
    }

    /// Declares an output signal sitting on `pin`.
    pub fn with_output(mut self, name: impl Into<SignalName>, pin: PinIndex) -> Self {
        let name = name.into();
        self.pins.insert(name.clone(), pin);
        self.outputs.push(name);
        self
    }

    /// Overrides the stability window.
    pub fn with_stability(mut self, ticks: usize) -> Self {
        self.timing.stability_ticks = ticks;
        self
    }

    /// Overrides the warm-up window.
    pub fn with_warmup(mut self, ticks: usize) -> Self {
        self.timing.warmup_ticks = ticks;
        self
    }

    /// Returns true if `name` is a declared input.
    pub fn declares_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|s| s == name)
    }

    /// Input signal on `pin`, if any.
    pub fn input_at_pin(&self, pin: PinIndex) -> Option<&str> {
        self.inputs
            .iter()
            .find(|name| self.pins.get(*name) == Some(&pin))
            .map(String::as_str)
    }

    /// Output signal on `pin`, if any.
    pub fn output_at_pin(&self, pin: PinIndex) -> Option<&str> {
        self.outputs
            .iter()
            .find(|name| self.pins.get(*name) == Some(&pin))
            .map(String::as_str)
    }
}

/// Read-only view of the input values at one tick.
///
/// Built by the kernel. Each line is a declared input paired with its
/// waveform; a line without a waveform reads low.
pub struct TickInputs<'a> {
    tick: Tick,
    lines: &'a [(&'a str, Option<&'a Waveform>)],
}

impl<'a> TickInputs<'a> {
    /// Creates a view over `lines` at `tick`.
    pub fn new(tick: Tick, lines: &'a [(&'a str, Option<&'a Waveform>)]) -> Self {
        Self { tick, lines }
    }

    /// The current tick index.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Value of `signal` at the current tick.
    pub fn get(&self, signal: &str) -> ModelResult<bool> {
        match self.lines.iter().find(|(name, _)| *name == signal) {
            Some((_, Some(wave))) => Ok(wave.get(self.tick).unwrap_or(false)),
            Some((_, None)) => Ok(false),
            None => Err(ModelError::MissingInput {
                signal: signal.to_string(),
            }),
        }
    }

    /// Reads several signals as an unsigned integer, least significant first.
    pub fn bus(&self, signals: &[&str]) -> ModelResult<usize> {
        let mut value = 0;
        for (bit, signal) in signals.iter().enumerate() {
            if self.get(signal)? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }
}

/// The trait every component model implements.
///
/// An instance lives for exactly one simulation run. `init` restores the reset
/// state; `on_tick` is then called once per tick, in order, and returns one
/// value per declared output.
pub trait Model: Send {
    /// Resets internal state.
    ///
    /// Called once before tick 0.
    fn init(&mut self) {}

    /// Advances one tick.
    ///
    /// # Arguments
    /// * `inputs` - Input values at this tick
    ///
    /// # Returns
    /// Output values in the order of `ModelDesc::outputs`
    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_defaults() {
        let hints = TimingHints::default();
        assert_eq!(hints.warmup_ticks, 0);
        assert_eq!(hints.stability_ticks, 1);

        let hints: TimingHints = serde_json::from_str("{}").unwrap();
        assert_eq!(hints, TimingHints::default());
    }

    #[test]
    fn test_model_desc() {
        let desc = ModelDesc::new("CX74", ModelKind::EdgeTriggered)
            .with_title("D flip-flop")
            .with_input("D", 1)
            .with_input("CLK", 2)
            .with_output("Q", 7)
            .with_output("~Q", 8)
            .with_stability(3);

        assert_eq!(desc.inputs, vec!["D", "CLK"]);
        assert_eq!(desc.outputs, vec!["Q", "~Q"]);
        assert_eq!(desc.timing.stability_ticks, 3);
        assert_eq!(desc.timing.warmup_ticks, 0);
        assert!(desc.declares_input("CLK"));
        assert!(!desc.declares_input("Q"));
    }

    #[test]
    fn test_pin_lookup_separates_directions() {
        // A bidirectional data pin maps to different names per direction.
        let desc = ModelDesc::new("RAM", ModelKind::Memory)
            .with_input("D_in", 7)
            .with_output("D_out", 7);

        assert_eq!(desc.input_at_pin(7), Some("D_in"));
        assert_eq!(desc.output_at_pin(7), Some("D_out"));
        assert_eq!(desc.input_at_pin(3), None);
    }

    #[test]
    fn test_tick_inputs() {
        let a = Waveform::from_bits("01");
        let b = Waveform::from_bits("11");
        let lines = [("A", Some(&a)), ("B", Some(&b)), ("C", None)];

        let inputs = TickInputs::new(1, &lines);
        assert_eq!(inputs.tick(), 1);
        assert_eq!(inputs.get("A"), Ok(true));
        assert_eq!(inputs.get("C"), Ok(false));
        assert_eq!(inputs.bus(&["A", "B", "C"]), Ok(0b011));
        assert_eq!(
            inputs.get("Z"),
            Err(ModelError::MissingInput {
                signal: "Z".to_string()
            })
        );
    }

    struct Toggle {
        state: bool,
    }

    impl Model for Toggle {
        fn init(&mut self) {
            self.state = false;
        }

        fn on_tick(&mut self, _inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
            self.state = !self.state;
            Ok(vec![self.state])
        }
    }

    #[test]
    fn test_model_trait() {
        let mut model = Toggle { state: true };
        model.init();
        let inputs = TickInputs::new(0, &[]);
        assert_eq!(model.on_tick(&inputs), Ok(vec![true]));
        assert_eq!(model.on_tick(&inputs), Ok(vec![false]));
    }
}
