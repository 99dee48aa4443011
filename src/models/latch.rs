//! Level-sensitive set/reset latches.

use crate::error::ModelResult;
use crate::model::{Model, TickInputs};

/// An RS latch, optionally gated by an `E` input.
///
/// | S R | next |
/// |-----|------|
/// | 1 0 | 1 |
/// | 0 1 | 0 |
/// | 0 0 | hold |
/// | 1 1 | hold |
///
/// When gated, `E = 0` holds regardless of `S` and `R`. Outputs are `Q` and
/// `~Q`.
#[derive(Debug, Default)]
pub struct RsLatch {
    gated: bool,
    state: bool,
}

impl RsLatch {
    /// Creates an ungated latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a latch gated by `E`.
    pub fn gated() -> Self {
        Self {
            gated: true,
            state: false,
        }
    }
}

impl Model for RsLatch {
    fn init(&mut self) {
        self.state = false;
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let set = inputs.get("S")?;
        let reset = inputs.get("R")?;
        let enabled = !self.gated || inputs.get("E")?;

        if enabled {
            match (set, reset) {
                (true, false) => self.state = true,
                (false, true) => self.state = false,
                _ => {}
            }
        }

        Ok(vec![self.state, !self.state])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::drive;

    #[test]
    fn test_set_reset_hold() {
        let out = drive(
            &mut RsLatch::new(),
            &[("S", "011001100011"), ("R", "000011010001")],
            12,
        );
        assert_eq!(out[0], "011100100011");
        assert_eq!(out[1], "100011011100");
    }

    #[test]
    fn test_enable_gates_updates() {
        let out = drive(
            &mut RsLatch::gated(),
            &[("S", "11110000"), ("R", "00001111"), ("E", "00110011")],
            8,
        );
        assert_eq!(out[0], "00111100");
    }

    #[test]
    fn test_init_resets_state() {
        let mut latch = RsLatch::new();
        assert_eq!(drive(&mut latch, &[("S", "1"), ("R", "0")], 1)[0], "1");
        assert_eq!(drive(&mut latch, &[("S", "0"), ("R", "0")], 1)[0], "0");
    }
}
