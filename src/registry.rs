//! Component model registry.
//!
//! The registry maps a component identifier to its description and to a
//! factory producing a fresh model instance. Instances are never stored here:
//! every simulation run gets its own, so no state leaks between runs.
//!
//! # Example
//!
//! ```
//! use goldvec::error::ModelResult;
//! use goldvec::model::{Model, ModelDesc, ModelKind, TickInputs};
//! use goldvec::registry::ModelRegistry;
//!
//! // Define a custom model
//! struct Buffer;
//! impl Model for Buffer {
//!     fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
//!         Ok(vec![inputs.get("A")?])
//!     }
//! }
//!
//! // Register it next to the built-in catalog
//! let mut registry = ModelRegistry::builtin();
//! let desc = ModelDesc::new("BUF", ModelKind::Combinational)
//!     .with_input("A", 1)
//!     .with_output("Y", 7);
//! registry.register(desc, || Box::new(Buffer));
//!
//! assert!(registry.instantiate("BUF").is_some());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Model, ModelDesc, ModelKind, TimingHints};
use crate::models::{
    adder_2bit, alu_2bit, and_or4, decoder_2to4, mux_4to1, quad_inverter, triple_nand,
    triple_nor, Combinational, Counter4Bit, DFlipFlop, DivideBy4, DualClock, FrequencyDoubler,
    PowerOnReset, Ram8x1, RsLatch, ShiftRegister4,
};

/// Type alias for model factory functions.
pub type ModelFactory = Arc<dyn Fn() -> Box<dyn Model> + Send + Sync>;

struct RegistryEntry {
    desc: ModelDesc,
    factory: ModelFactory,
}

/// A catalog of component models.
#[derive(Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl ModelRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model under `desc.id`, replacing any previous entry.
    ///
    /// # Arguments
    /// * `desc` - Interface and timing hints
    /// * `factory` - Creates a model instance in its reset state
    pub fn register<F>(&mut self, desc: ModelDesc, factory: F)
    where
        F: Fn() -> Box<dyn Model> + Send + Sync + 'static,
    {
        self.entries.insert(
            desc.id.clone(),
            RegistryEntry {
                desc,
                factory: Arc::new(factory),
            },
        );
    }

    /// Returns the description of a component.
    pub fn describe(&self, id: &str) -> Option<&ModelDesc> {
        self.entries.get(id).map(|e| &e.desc)
    }

    /// Creates a fresh model instance.
    ///
    /// # Returns
    /// `Some((desc, model))` if the component is registered, `None` otherwise
    pub fn instantiate(&self, id: &str) -> Option<(&ModelDesc, Box<dyn Model>)> {
        self.entries
            .get(id)
            .map(|e| (&e.desc, (e.factory)()))
    }

    /// Returns true if a component is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over all descriptions in identifier order.
    pub fn descriptions(&self) -> impl Iterator<Item = &ModelDesc> {
        self.entries.values().map(|e| &e.desc)
    }

    /// Replaces the timing hints of a registered component.
    ///
    /// Returns false if the component is unknown.
    pub fn override_timing(&mut self, id: &str, timing: TimingHints) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.desc.timing = timing;
                true
            }
            None => false,
        }
    }

    /// Unregisters a component.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Creates a registry holding the built-in catalog.
    pub fn builtin() -> Self {
        create_default_registry()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("components", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn combinational(registry: &mut ModelRegistry, desc: ModelDesc, eval: crate::models::EvalFn) {
    registry.register(desc, move || Box::new(Combinational::new(eval)));
}

/// Creates a registry with the built-in catalog.
///
/// Pin numbers follow the level boards: inputs on the left column, outputs on
/// the right.
pub fn create_default_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();

    combinational(
        &mut registry,
        ModelDesc::new("CX04", ModelKind::Combinational)
            .with_title("Four inverters")
            .with_input("A", 1)
            .with_input("B", 2)
            .with_input("C", 3)
            .with_input("D", 4)
            .with_output("~A", 7)
            .with_output("~B", 8)
            .with_output("~C", 9)
            .with_output("~D", 10),
        quad_inverter,
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX08", ModelKind::Combinational)
            .with_title("Four-input AND and OR")
            .with_input("A", 1)
            .with_input("B", 2)
            .with_input("C", 3)
            .with_input("D", 4)
            .with_output("Y0", 7)
            .with_output("Y1", 8),
        and_or4,
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX02", ModelKind::Combinational)
            .with_title("Three NOR gates")
            .with_input("A", 1)
            .with_input("B", 2)
            .with_input("C", 3)
            .with_input("D", 4)
            .with_input("E", 9)
            .with_input("F", 10)
            .with_output("Y0", 7)
            .with_output("Y1", 8)
            .with_output("Y2", 11),
        triple_nor,
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX00", ModelKind::Combinational)
            .with_title("Three NAND gates")
            .with_input("A", 1)
            .with_input("B", 2)
            .with_input("C", 3)
            .with_input("D", 4)
            .with_input("E", 9)
            .with_input("F", 10)
            .with_output("Y0", 7)
            .with_output("Y1", 8)
            .with_output("Y2", 11),
        triple_nand,
    );

    registry.register(
        ModelDesc::new("CXR01", ModelKind::Oscillator)
            .with_title("Power-on reset")
            .with_output("~R", 7),
        || Box::new(PowerOnReset::default()),
    );

    registry.register(
        ModelDesc::new("CX279", ModelKind::Latch)
            .with_title("RS flip-flop")
            .with_input("S", 1)
            .with_input("R", 2)
            .with_output("Q", 7)
            .with_output("~Q", 8)
            .with_stability(2)
            .with_warmup(2),
        || Box::new(RsLatch::new()),
    );

    registry.register(
        ModelDesc::new("CX279E", ModelKind::Latch)
            .with_title("RS flip-flop with enable")
            .with_input("S", 1)
            .with_input("R", 2)
            .with_input("E", 3)
            .with_output("Q", 7)
            .with_output("~Q", 8)
            .with_stability(2)
            .with_warmup(2),
        || Box::new(RsLatch::gated()),
    );

    registry.register(
        ModelDesc::new("CX556", ModelKind::Oscillator)
            .with_title("Dual clock generator")
            .with_output("CL1", 4)
            .with_output("CL2", 8)
            .with_stability(0),
        || Box::new(DualClock),
    );

    registry.register(
        ModelDesc::new("CX74", ModelKind::EdgeTriggered)
            .with_title("D flip-flop")
            .with_input("D", 1)
            .with_input("CLK", 2)
            .with_output("Q", 7)
            .with_output("~Q", 8)
            .with_stability(3),
        || Box::new(DFlipFlop::new()),
    );

    registry.register(
        ModelDesc::new("CXF02", ModelKind::DelayLine)
            .with_title("Frequency doubler")
            .with_input("CLK", 1)
            .with_input("S", 2)
            .with_output("Y", 7)
            .with_stability(0),
        || Box::new(FrequencyDoubler::new()),
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX139", ModelKind::Combinational)
            .with_title("2-to-4 decoder with enable")
            .with_input("A0", 1)
            .with_input("A1", 2)
            .with_input("E", 3)
            .with_output("Y0", 7)
            .with_output("Y1", 8)
            .with_output("Y2", 9)
            .with_output("Y3", 10)
            .with_stability(2),
        decoder_2to4,
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX83", ModelKind::Combinational)
            .with_title("2-bit full adder")
            .with_input("A0", 1)
            .with_input("A1", 2)
            .with_input("B0", 3)
            .with_input("B1", 4)
            .with_input("CI", 5)
            .with_output("S0", 7)
            .with_output("S1", 8)
            .with_output("CO", 9)
            .with_stability(4),
        adder_2bit,
    );

    registry.register(
        ModelDesc::new("CX93", ModelKind::EdgeTriggered)
            .with_title("Divide-by-4 counter")
            .with_input("CLK", 1)
            .with_output("Y", 7)
            .with_stability(2),
        || Box::new(DivideBy4::new()),
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX153", ModelKind::Combinational)
            .with_title("4-to-1 multiplexer")
            .with_input("D0", 1)
            .with_input("D1", 2)
            .with_input("D2", 3)
            .with_input("D3", 4)
            .with_input("S0", 6)
            .with_input("S1", 7)
            .with_output("Y", 8)
            .with_stability(2),
        mux_4to1,
    );

    registry.register(
        ModelDesc::new("CX161", ModelKind::EdgeTriggered)
            .with_title("4-bit counter with synchronous clear")
            .with_input("CLK", 1)
            .with_input("CLR", 2)
            .with_output("Q0", 7)
            .with_output("Q1", 8)
            .with_output("Q2", 9)
            .with_output("Q3", 10)
            .with_stability(2),
        || Box::new(Counter4Bit::new()),
    );

    registry.register(
        ModelDesc::new("CX195", ModelKind::EdgeTriggered)
            .with_title("4-bit shift register")
            .with_input("DIN", 1)
            .with_input("CLK", 2)
            .with_output("Q0", 7)
            .with_output("Q1", 8)
            .with_output("Q2", 9)
            .with_output("Q3", 10)
            .with_stability(2),
        || Box::new(ShiftRegister4::new()),
    );

    // D_in and D_out share the bidirectional data pin.
    registry.register(
        ModelDesc::new("CX6116", ModelKind::Memory)
            .with_title("8x1 bit RAM")
            .with_input("A0", 1)
            .with_input("A1", 2)
            .with_input("A2", 3)
            .with_input("WE", 4)
            .with_input("RE", 5)
            .with_input("D_in", 7)
            .with_output("D_out", 7)
            .with_stability(2),
        || Box::new(Ram8x1::new()),
    );

    combinational(
        &mut registry,
        ModelDesc::new("CX181", ModelKind::Combinational)
            .with_title("2-bit ALU")
            .with_input("A0", 1)
            .with_input("A1", 2)
            .with_input("B0", 3)
            .with_input("B1", 4)
            .with_input("F0", 6)
            .with_input("F1", 7)
            .with_output("Y0", 8)
            .with_output("Y1", 9)
            .with_output("Z", 10)
            .with_stability(2),
        alu_2bit,
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DFlipFlop;

    #[test]
    fn test_registry_basic() {
        let mut registry = ModelRegistry::new();
        assert!(registry.is_empty());

        registry.register(
            ModelDesc::new("DFF", ModelKind::EdgeTriggered),
            || Box::new(DFlipFlop::new()),
        );
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("DFF"));
    }

    #[test]
    fn test_registry_instantiate() {
        let registry = ModelRegistry::builtin();

        let (desc, _model) = registry.instantiate("CX74").unwrap();
        assert_eq!(desc.id, "CX74");

        assert!(registry.instantiate("NonExistent").is_none());
        assert!(registry.describe("NonExistent").is_none());
    }

    #[test]
    fn test_default_registry() {
        let registry = create_default_registry();
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(
            ids,
            vec![
                "CX00", "CX02", "CX04", "CX08", "CX139", "CX153", "CX161", "CX181", "CX195",
                "CX279", "CX279E", "CX556", "CX6116", "CX74", "CX83", "CX93", "CXF02", "CXR01",
            ]
        );
    }

    #[test]
    fn test_builtin_timing_hints() {
        let registry = ModelRegistry::builtin();
        let timing = |id: &str| registry.describe(id).unwrap().timing;

        assert_eq!(timing("CX04"), TimingHints::new(0, 1));
        assert_eq!(timing("CX279"), TimingHints::new(2, 2));
        assert_eq!(timing("CX279E"), TimingHints::new(2, 2));
        assert_eq!(timing("CX556"), TimingHints::new(0, 0));
        assert_eq!(timing("CX74"), TimingHints::new(0, 3));
        assert_eq!(timing("CXF02"), TimingHints::new(0, 0));
        assert_eq!(timing("CX83"), TimingHints::new(0, 4));
        assert_eq!(timing("CX6116"), TimingHints::new(0, 2));
    }

    #[test]
    fn test_every_output_has_a_pin() {
        let registry = ModelRegistry::builtin();
        for desc in registry.descriptions() {
            for name in desc.inputs.iter().chain(&desc.outputs) {
                assert!(desc.pins.contains_key(name), "{}: {} has no pin", desc.id, name);
            }
        }
    }

    #[test]
    fn test_registry_override_timing() {
        let mut registry = ModelRegistry::builtin();
        assert!(registry.override_timing("CX74", TimingHints::new(1, 5)));
        assert_eq!(
            registry.describe("CX74").unwrap().timing,
            TimingHints::new(1, 5)
        );
        assert!(!registry.override_timing("CX999", TimingHints::default()));
    }

    #[test]
    fn test_registry_unregister() {
        let mut registry = ModelRegistry::builtin();
        let before = registry.len();

        assert!(registry.unregister("CX74"));
        assert!(!registry.contains("CX74"));
        assert!(!registry.unregister("CX74")); // Already removed
        assert_eq!(registry.len(), before - 1);
    }
}
