//! Don't-care mask synthesis.
//!
//! Turns a golden output waveform into a test vector: a tri-state symbol per
//! tick saying either "the output must be 0/1 here" or "anything goes". Ticks
//! in the warm-up window and in the stability window after every transition
//! of the golden waveform are don't-care.
//!
//! # Example
//!
//! ```
//! use goldvec::mask::synthesize;
//! use goldvec::model::TimingHints;
//! use goldvec::waveform::Waveform;
//!
//! let golden = Waveform::from_bits("0001111000");
//! let test = synthesize(&golden, TimingHints::new(0, 2));
//! assert_eq!(test.to_string(), "000xx11xx0");
//! assert_eq!(test.to_level_string(), "???xx??xx?");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::model::TimingHints;
use crate::waveform::Waveform;

/// One tick of a test vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestSymbol {
    /// The output must be 0
    Low,
    /// The output must be 1
    High,
    /// Any value is accepted
    DontCare,
}

impl TestSymbol {
    /// The defined symbol for a value.
    pub fn defined(value: bool) -> Self {
        if value {
            TestSymbol::High
        } else {
            TestSymbol::Low
        }
    }

    /// Returns true unless this is `DontCare`.
    pub fn is_checked(self) -> bool {
        self != TestSymbol::DontCare
    }

    /// The required value, if any.
    pub fn expected(self) -> Option<bool> {
        match self {
            TestSymbol::Low => Some(false),
            TestSymbol::High => Some(true),
            TestSymbol::DontCare => None,
        }
    }

    /// `'0'`, `'1'` or `'x'`.
    pub fn as_char(self) -> char {
        match self {
            TestSymbol::Low => '0',
            TestSymbol::High => '1',
            TestSymbol::DontCare => 'x',
        }
    }
}

/// A per-tick mask aligned with one output waveform.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestVector {
    symbols: Vec<TestSymbol>,
}

impl TestVector {
    /// Creates a vector from symbols.
    pub fn new(symbols: Vec<TestSymbol>) -> Self {
        Self { symbols }
    }

    /// Number of ticks.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true for a zero-length vector.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Borrows the symbols.
    pub fn symbols(&self) -> &[TestSymbol] {
        &self.symbols
    }

    /// Symbol at `tick`, or `None` past the end.
    pub fn get(&self, tick: usize) -> Option<TestSymbol> {
        self.symbols.get(tick).copied()
    }

    /// Number of don't-care ticks.
    pub fn dont_care_count(&self) -> usize {
        self.symbols.iter().filter(|s| !s.is_checked()).count()
    }

    /// Number of checked ticks.
    pub fn checked_count(&self) -> usize {
        self.len() - self.dont_care_count()
    }

    /// Renders the mask the way level files store it: `'?'` for a checked
    /// tick and `'x'` for don't-care. The expected values live separately in
    /// the waveform string.
    pub fn to_level_string(&self) -> String {
        self.symbols
            .iter()
            .map(|s| if s.is_checked() { '?' } else { 'x' })
            .collect()
    }

    /// Rebuilds a vector from a stored mask and the waveform it belongs to.
    ///
    /// `'x'` is don't-care; any other character, or a missing one when the
    /// mask is shorter than the waveform, checks the waveform's value.
    pub fn from_level_string(mask: &str, values: &Waveform) -> Self {
        let mut chars = mask.chars();
        values
            .iter()
            .map(|v| match chars.next() {
                Some('x') => TestSymbol::DontCare,
                _ => TestSymbol::defined(v),
            })
            .collect()
    }
}

impl FromIterator<TestSymbol> for TestVector {
    fn from_iter<I: IntoIterator<Item = TestSymbol>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

impl Serialize for TestVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TestVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.chars()
            .map(|c| match c {
                '0' => Ok(TestSymbol::Low),
                '1' => Ok(TestSymbol::High),
                'x' => Ok(TestSymbol::DontCare),
                other => Err(<D::Error as serde::de::Error>::custom(format!(
                    "invalid test symbol '{other}'"
                ))),
            })
            .collect()
    }
}

/// Derives the test vector of `waveform`.
///
/// 1. every tick starts as the waveform's own value;
/// 2. ticks `[0, warmup_ticks)` become don't-care;
/// 3. each transition at tick `i` (value differs from `i - 1`) makes
///    `i .. i + stability_ticks` don't-care, clamped to the end.
///
/// Transitions are found on the waveform itself, never on the partially
/// masked result, so overlapping windows each run their full length.
pub fn synthesize(waveform: &Waveform, timing: TimingHints) -> TestVector {
    let n = waveform.len();
    let mut symbols: Vec<TestSymbol> = waveform.iter().map(TestSymbol::defined).collect();

    for symbol in symbols.iter_mut().take(timing.warmup_ticks) {
        *symbol = TestSymbol::DontCare;
    }

    for edge in waveform.transitions() {
        let end = edge.saturating_add(timing.stability_ticks).min(n);
        for symbol in &mut symbols[edge..end] {
            *symbol = TestSymbol::DontCare;
        }
    }

    TestVector::new(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: &str, warmup: usize, stability: usize) -> String {
        synthesize(&Waveform::from_bits(bits), TimingHints::new(warmup, stability)).to_string()
    }

    #[test]
    fn test_default_hints_mask_transition_tick_only() {
        assert_eq!(mask("0011", 0, 1), "00x1");
        assert_eq!(mask("0110", 0, 1), "0x1x");
    }

    #[test]
    fn test_stable_waveform_is_fully_defined() {
        assert_eq!(mask("0000", 0, 3), "0000");
        assert_eq!(mask("1111", 0, 3), "1111");
    }

    #[test]
    fn test_warmup() {
        assert_eq!(mask("1111", 2, 1), "xx11");
        assert_eq!(mask("11", 5, 1), "xx");
    }

    #[test]
    fn test_window_clamped_at_end() {
        assert_eq!(mask("00001", 0, 3), "0000x");
    }

    #[test]
    fn test_overlapping_windows_use_unmasked_values() {
        // Transitions at 2 and 3; the second window runs its full length.
        assert_eq!(mask("0010000", 0, 3), "00xxxx0");
    }

    #[test]
    fn test_zero_stability() {
        assert_eq!(mask("0101", 0, 0), "0101");
        assert_eq!(mask("0101", 1, 0), "x101");
    }

    #[test]
    fn test_empty() {
        let test = synthesize(&Waveform::default(), TimingHints::new(3, 2));
        assert!(test.is_empty());
        assert_eq!(test.to_level_string(), "");
    }

    #[test]
    fn test_counts() {
        let test = synthesize(&Waveform::from_bits("000111"), TimingHints::new(1, 2));
        assert_eq!(test.to_string(), "x00xx1");
        assert_eq!(test.dont_care_count(), 3);
        assert_eq!(test.checked_count(), 3);
    }

    #[test]
    fn test_level_string_round_trip() {
        let values = Waveform::from_bits("0110");
        let test = synthesize(&values, TimingHints::default());
        assert_eq!(test.to_level_string(), "?x?x");
        assert_eq!(TestVector::from_level_string("?x?x", &values), test);
    }

    #[test]
    fn test_short_level_string_checks_remaining_ticks() {
        let values = Waveform::from_bits("0110");
        let test = TestVector::from_level_string("x", &values);
        assert_eq!(test.to_string(), "x110");

        let test = TestVector::from_level_string("", &values);
        assert_eq!(test.to_string(), "0110");
    }

    #[test]
    fn test_serde() {
        let test = synthesize(&Waveform::from_bits("0011"), TimingHints::default());
        let json = serde_json::to_string(&test).unwrap();
        assert_eq!(json, "\"00x1\"");

        let back: TestVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, test);

        assert!(serde_json::from_str::<TestVector>("\"01?\"").is_err());
    }
}
