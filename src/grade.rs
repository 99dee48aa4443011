//! Scoring an actual output against a golden trace.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mask::TestVector;
use crate::waveform::Waveform;

/// Accuracy threshold a level must reach to pass.
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.98;

/// Checked and matching tick counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub checked: usize,
    pub correct: usize,
}

impl Grade {
    /// Fraction of checked ticks that matched; `None` when nothing was
    /// checked.
    pub fn accuracy(&self) -> Option<f64> {
        (self.checked > 0).then(|| self.correct as f64 / self.checked as f64)
    }

    /// Sums two grades, e.g. across the outputs of one level.
    pub fn merge(self, other: Grade) -> Grade {
        Grade {
            checked: self.checked + other.checked,
            correct: self.correct + other.correct,
        }
    }

    /// Pass or fail against `threshold`. A grade with no checked ticks has
    /// no verdict.
    pub fn passes(&self, threshold: f64) -> Option<bool> {
        self.accuracy().map(|accuracy| accuracy >= threshold)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accuracy() {
            Some(accuracy) => write!(
                f,
                "{}/{} ({:.1}%)",
                self.correct,
                self.checked,
                accuracy * 100.0
            ),
            None => write!(f, "0/0 (n/a)"),
        }
    }
}

/// Grades `actual` against `expected`, skipping the don't-care ticks of
/// `test`. Ticks past the end of `test` are checked; ticks past the shorter of
/// `expected` and `actual` are ignored.
pub fn grade(expected: &Waveform, test: &TestVector, actual: &Waveform) -> Grade {
    expected
        .iter()
        .zip(actual.iter())
        .enumerate()
        .filter(|(tick, _)| test.get(*tick).map_or(true, |s| s.is_checked()))
        .fold(Grade::default(), |acc, (_, (want, got))| Grade {
            checked: acc.checked + 1,
            correct: acc.correct + usize::from(want == got),
        })
}
