//! Clock sources and clock shaping.

use crate::error::ModelResult;
use crate::model::{Model, TickInputs};
use crate::types::Tick;

/// Square wave of the given half period, high first.
fn square(tick: Tick, half_period: Tick) -> bool {
    (tick / half_period) % 2 == 0
}

/// Free-running dual clock.
///
/// `CL1` has period 4 and `CL2` period 8; both start high at tick 0. No
/// inputs and no state beyond the tick index.
#[derive(Debug, Default)]
pub struct DualClock;

impl Model for DualClock {
    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let t = inputs.tick();
        Ok(vec![square(t, 2), square(t, 4)])
    }
}

/// Power-on reset: `~R` is high for the first `hold_ticks` ticks, then low.
#[derive(Debug)]
pub struct PowerOnReset {
    hold_ticks: Tick,
}

impl PowerOnReset {
    pub fn new(hold_ticks: Tick) -> Self {
        Self { hold_ticks }
    }
}

impl Default for PowerOnReset {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Model for PowerOnReset {
    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        Ok(vec![inputs.tick() < self.hold_ticks])
    }
}

const DOUBLER_LAG: usize = 2;

/// Frequency doubler.
///
/// `S = 0` passes `CLK` through. `S = 1` outputs `CLK` xor `CLK` delayed by
/// two ticks, where the delayed copy reads 0 until two ticks have elapsed.
/// The delay line follows `CLK` on every tick, whatever `S` is.
#[derive(Debug, Default)]
pub struct FrequencyDoubler {
    /// `history[0]` is CLK at t-1, `history[1]` at t-2
    history: [bool; DOUBLER_LAG],
}

impl FrequencyDoubler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for FrequencyDoubler {
    fn init(&mut self) {
        self.history = [false; DOUBLER_LAG];
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let clk = inputs.get("CLK")?;
        let select = inputs.get("S")?;
        let delayed = self.history[DOUBLER_LAG - 1];

        self.history.rotate_right(1);
        self.history[0] = clk;

        Ok(vec![if select { clk ^ delayed } else { clk }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::drive;

    #[test]
    fn test_dual_clock() {
        let out = drive(&mut DualClock, &[], 16);
        assert_eq!(out[0], "1100110011001100");
        assert_eq!(out[1], "1111000011110000");
    }

    #[test]
    fn test_power_on_reset() {
        let out = drive(&mut PowerOnReset::default(), &[], 8);
        assert_eq!(out[0], "11110000");

        let out = drive(&mut PowerOnReset::default(), &[], 2);
        assert_eq!(out[0], "11");
    }

    #[test]
    fn test_doubler_passthrough() {
        let out = drive(
            &mut FrequencyDoubler::new(),
            &[("CLK", "00110011"), ("S", "00000000")],
            8,
        );
        assert_eq!(out[0], "00110011");
    }

    #[test]
    fn test_doubler_doubles() {
        // Period-8 clock becomes period 4.
        let out = drive(
            &mut FrequencyDoubler::new(),
            &[("CLK", "1111000011110000"), ("S", "1111111111111111")],
            16,
        );
        assert_eq!(out[0], "1100110011001100");
    }

    #[test]
    fn test_doubler_delay_tracks_clk_while_passing_through() {
        // CLK history from the S = 0 ticks is still used once S rises.
        let out = drive(
            &mut FrequencyDoubler::new(),
            &[("CLK", "1100"), ("S", "0011")],
            4,
        );
        // t2: 0 ^ clk[0]=1 -> 1, t3: 0 ^ clk[1]=1 -> 1
        assert_eq!(out[0], "1111");
    }
}
