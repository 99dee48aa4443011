//! Edge-triggered models.
//!
//! All of these share [`EdgeDetector`]: the clock is sampled every tick and
//! the model's action runs only on a 0 → 1 transition. The action takes effect
//! on the edge tick itself, so the output of that tick already shows it.

use crate::error::ModelResult;
use crate::model::{Model, TickInputs};

/// Rising-edge detector.
///
/// The clock is taken as low before tick 0, so a clock that starts high fires
/// on tick 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    prev: bool,
}

impl EdgeDetector {
    /// Creates a detector whose previous sample is low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `clk` and reports whether it rose since the previous sample.
    pub fn rising(&mut self, clk: bool) -> bool {
        let rose = clk && !self.prev;
        self.prev = clk;
        rose
    }

    /// Forgets the previous sample.
    pub fn reset(&mut self) {
        self.prev = false;
    }
}

/// Positive edge D flip-flop with `Q` and `~Q`.
#[derive(Debug, Default)]
pub struct DFlipFlop {
    clock: EdgeDetector,
    q: bool,
}

impl DFlipFlop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for DFlipFlop {
    fn init(&mut self) {
        self.clock.reset();
        self.q = false;
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let d = inputs.get("D")?;
        if self.clock.rising(inputs.get("CLK")?) {
            self.q = d;
        }
        Ok(vec![self.q, !self.q])
    }
}

/// 4-bit serial-in shift register: `DIN -> Q0 -> Q1 -> Q2 -> Q3`.
#[derive(Debug, Default)]
pub struct ShiftRegister4 {
    clock: EdgeDetector,
    bits: [bool; 4],
}

impl ShiftRegister4 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for ShiftRegister4 {
    fn init(&mut self) {
        self.clock.reset();
        self.bits = [false; 4];
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let din = inputs.get("DIN")?;
        if self.clock.rising(inputs.get("CLK")?) {
            self.bits.rotate_right(1);
            self.bits[0] = din;
        }
        Ok(self.bits.to_vec())
    }
}

/// Divide-by-4: a mod-4 edge count, `Y` high while the count is 2 or 3.
#[derive(Debug, Default)]
pub struct DivideBy4 {
    clock: EdgeDetector,
    count: u8,
}

impl DivideBy4 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for DivideBy4 {
    fn init(&mut self) {
        self.clock.reset();
        self.count = 0;
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        if self.clock.rising(inputs.get("CLK")?) {
            self.count = (self.count + 1) % 4;
        }
        Ok(vec![self.count >= 2])
    }
}

/// Mod-16 binary counter with synchronous clear.
///
/// On a rising edge `CLR = 1` zeroes the count, otherwise it increments and
/// wraps at 16. `Q0` is the least significant bit.
#[derive(Debug, Default)]
pub struct Counter4Bit {
    clock: EdgeDetector,
    count: u8,
}

impl Counter4Bit {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for Counter4Bit {
    fn init(&mut self) {
        self.clock.reset();
        self.count = 0;
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let clear = inputs.get("CLR")?;
        if self.clock.rising(inputs.get("CLK")?) {
            self.count = if clear { 0 } else { (self.count + 1) % 16 };
        }
        Ok((0..4).map(|bit| self.count & (1 << bit) != 0).collect())
    }
}
