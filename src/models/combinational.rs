//! Stateless models.
//!
//! Every model here is a plain function of the inputs at the current tick,
//! wrapped in [`Combinational`] so it can sit in the registry next to the
//! stateful ones.

use crate::error::ModelResult;
use crate::model::{Model, TickInputs};

/// Evaluation function of a combinational model.
pub type EvalFn = fn(&TickInputs<'_>) -> ModelResult<Vec<bool>>;

/// A model with no internal state.
#[derive(Clone, Copy, Debug)]
pub struct Combinational {
    eval: EvalFn,
}

impl Combinational {
    /// Wraps an evaluation function.
    pub fn new(eval: EvalFn) -> Self {
        Self { eval }
    }
}

impl Model for Combinational {
    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        (self.eval)(inputs)
    }
}

/// Four independent inverters.
pub fn quad_inverter(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    Ok(vec![
        !inputs.get("A")?,
        !inputs.get("B")?,
        !inputs.get("C")?,
        !inputs.get("D")?,
    ])
}

/// Four-input AND on `Y0` and four-input OR on `Y1`.
pub fn and_or4(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    let (a, b, c, d) = (
        inputs.get("A")?,
        inputs.get("B")?,
        inputs.get("C")?,
        inputs.get("D")?,
    );
    Ok(vec![a && b && c && d, a || b || c || d])
}

const GATE_PAIRS: [(&str, &str); 3] = [("A", "B"), ("C", "D"), ("E", "F")];

/// Three two-input NOR gates.
pub fn triple_nor(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    GATE_PAIRS
        .iter()
        .map(|(x, y)| -> ModelResult<bool> { Ok(!(inputs.get(x)? || inputs.get(y)?)) })
        .collect()
}

/// Three two-input NAND gates.
pub fn triple_nand(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    GATE_PAIRS
        .iter()
        .map(|(x, y)| -> ModelResult<bool> { Ok(!(inputs.get(x)? && inputs.get(y)?)) })
        .collect()
}

/// 2-to-4 decoder with enable.
pub fn decoder_2to4(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    let enabled = inputs.get("E")?;
    let addr = inputs.bus(&["A0", "A1"])?;
    Ok((0..4).map(|line| enabled && line == addr).collect())
}

/// 2-bit adder with carry in: `{CO, S1, S0} = A + B + CI`.
pub fn adder_2bit(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    let a = inputs.bus(&["A0", "A1"])?;
    let b = inputs.bus(&["B0", "B1"])?;
    let ci = usize::from(inputs.get("CI")?);
    let sum = a + b + ci;
    Ok(vec![sum & 1 != 0, sum & 2 != 0, sum & 4 != 0])
}

/// 4-to-1 multiplexer.
pub fn mux_4to1(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    let select = inputs.bus(&["S0", "S1"])?;
    let data = ["D0", "D1", "D2", "D3"][select];
    Ok(vec![inputs.get(data)?])
}

/// 2-bit logic unit.
///
/// | F1 F0 | Y |
/// |-------|---|
/// | 0 0 | A AND B |
/// | 0 1 | A OR B |
/// | 1 0 | NOT A |
/// | 1 1 | A XOR B |
///
/// `Z` is high when the result is zero.
pub fn alu_2bit(inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
    let a = inputs.bus(&["A0", "A1"])?;
    let b = inputs.bus(&["B0", "B1"])?;
    let result = match inputs.bus(&["F0", "F1"])? {
        0 => a & b,
        1 => a | b,
        2 => !a & 0b11,
        _ => a ^ b,
    };
    Ok(vec![result & 1 != 0, result & 2 != 0, result == 0])
}
