//! Built-in component models.
//!
//! Each type here implements [`Model`](crate::model::Model) for one or more
//! catalog entries; [`ModelRegistry::builtin`](crate::registry::ModelRegistry::builtin)
//! binds them to identifiers, signal names and timing hints.
//!
//! # Available Models
//!
//! ## Combinational
//! - [`Combinational`] wrapping [`quad_inverter`], [`and_or4`], [`triple_nor`],
//!   [`triple_nand`], [`decoder_2to4`], [`adder_2bit`], [`mux_4to1`], [`alu_2bit`]
//!
//! ## Latches
//! - [`RsLatch`] - RS latch, optionally gated by an enable
//!
//! ## Edge-Triggered
//! - [`DFlipFlop`], [`ShiftRegister4`], [`DivideBy4`], [`Counter4Bit`], all built
//!   on [`EdgeDetector`]
//!
//! ## Memory
//! - [`Ram8x1`] - 8 × 1-bit RAM
//!
//! ## Clocks
//! - [`DualClock`], [`PowerOnReset`], [`FrequencyDoubler`]

pub mod clock;
pub mod clocked;
pub mod combinational;
pub mod latch;
pub mod memory;

pub use clock::{DualClock, FrequencyDoubler, PowerOnReset};
pub use clocked::{Counter4Bit, DFlipFlop, DivideBy4, EdgeDetector, ShiftRegister4};
pub use combinational::{
    adder_2bit, alu_2bit, and_or4, decoder_2to4, mux_4to1, quad_inverter, triple_nand,
    triple_nor, Combinational, EvalFn,
};
pub use latch::RsLatch;
pub use memory::Ram8x1;

#[cfg(test)]
pub(crate) mod testing {
    use crate::model::{Model, TickInputs};
    use crate::waveform::Waveform;

    /// Runs `model` directly for `n_ticks` and returns each output as a bit
    /// string.
    pub(crate) fn drive(
        model: &mut dyn Model,
        signals: &[(&str, &str)],
        n_ticks: usize,
    ) -> Vec<String> {
        let waves: Vec<(&str, Waveform)> = signals
            .iter()
            .map(|(name, bits)| (*name, Waveform::from_bits(bits)))
            .collect();
        let lines: Vec<(&str, Option<&Waveform>)> =
            waves.iter().map(|(name, w)| (*name, Some(w))).collect();

        model.init();
        let mut outputs: Vec<String> = Vec::new();
        for t in 0..n_ticks {
            let values = model.on_tick(&TickInputs::new(t, &lines)).unwrap();
            if outputs.is_empty() {
                outputs = vec![String::new(); values.len()];
            }
            for (out, v) in outputs.iter_mut().zip(values) {
                out.push(if v { '1' } else { '0' });
            }
        }
        outputs
    }
}
