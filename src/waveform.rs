//! Boolean waveforms.
//!
//! A `Waveform` is the value of one signal at every tick of a run. Level files
//! store waveforms as strings of `'0'` and `'1'` characters, so that is also the
//! serialized form used here.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Tick;

/// An ordered sequence of boolean values, one per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Waveform {
    values: Vec<bool>,
}

impl Waveform {
    /// Creates a waveform from raw values.
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Creates a waveform that is low for `n_ticks` ticks.
    pub fn low(n_ticks: usize) -> Self {
        Self {
            values: vec![false; n_ticks],
        }
    }

    /// Parses a bit string such as `"0110"`.
    ///
    /// `'1'` is high; every other character is low, matching how level files
    /// have always been read.
    pub fn from_bits(bits: &str) -> Self {
        bits.chars().map(|c| c == '1').collect()
    }

    /// Renders the waveform as a bit string.
    pub fn to_bits(&self) -> String {
        self.values.iter().map(|&v| if v { '1' } else { '0' }).collect()
    }

    /// Number of ticks.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a zero-length waveform.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `tick`, or `None` past the end.
    pub fn get(&self, tick: Tick) -> Option<bool> {
        self.values.get(tick).copied()
    }

    /// Borrows the underlying values.
    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }

    /// Iterates over the values in tick order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.values.iter().copied()
    }

    /// Ticks `i >= 1` where the value differs from the value at `i - 1`.
    pub fn transitions(&self) -> impl Iterator<Item = Tick> + '_ {
        self.values
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(i, _)| i + 1)
    }
}

impl From<Vec<bool>> for Waveform {
    fn from(values: Vec<bool>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<bool> for Waveform {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bits())
    }
}

impl Serialize for Waveform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bits())
    }
}

impl<'de> Deserialize<'de> for Waveform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = String::deserialize(deserializer)?;
        Ok(Self::from_bits(&bits))
    }
}
