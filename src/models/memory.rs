//! Addressed storage.

use crate::error::ModelResult;
use crate::model::{Model, TickInputs};

const CELLS: usize = 8;

/// 8 × 1-bit RAM.
///
/// `A2 A1 A0` select a cell. `WE` and `RE` are mutually prioritized rather
/// than simultaneous:
///
/// - `WE = 1, RE = 0`: the cell takes `D_in`, `D_out` is 0
/// - `WE = 0, RE = 1`: `D_out` shows the cell
/// - otherwise: no write, `D_out` is 0
#[derive(Debug, Default)]
pub struct Ram8x1 {
    cells: [bool; CELLS],
}

impl Ram8x1 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for Ram8x1 {
    fn init(&mut self) {
        self.cells = [false; CELLS];
    }

    fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
        let addr = inputs.bus(&["A0", "A1", "A2"])?;
        let write = inputs.get("WE")?;
        let read = inputs.get("RE")?;
        let data = inputs.get("D_in")?;

        let out = match (write, read) {
            (true, false) => {
                self.cells[addr] = data;
                false
            }
            (false, true) => self.cells[addr],
            _ => false,
        };
        Ok(vec![out])
    }
}
