//! Level documents.
//!
//! A level file is a JSON document naming a component, the board's pin
//! labels, and one waveform per connected pin. Input waveforms drive the
//! golden run; output waveforms store the expected values and test vector
//! the player's circuit is graded against. A rewrite only touches the
//! `values` and `test` strings of output rows; everything else in the file,
//! key order included, is written back as it was read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::error::SimError;
use crate::golden::{GoldenSet, Generator};
use crate::grade::{grade, Grade};
use crate::mask::TestVector;
use crate::model::ModelDesc;
use crate::registry::ModelRegistry;
use crate::types::{PinIndex, SignalName, WaveformSet};
use crate::waveform::Waveform;

/// Errors that can occur while processing a level.
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;

/// Pin labels that never carry a signal.
const UNCONNECTED_PINS: [&str; 2] = ["vcc", "nc"];

fn default_true() -> bool {
    true
}

/// One waveform row of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelWaveform {
    pub pin_index: PinIndex,

    #[serde(default = "default_true")]
    pub is_input: bool,

    /// Bit string, `'1'` high
    #[serde(default)]
    pub values: String,

    /// Level-form test vector, `'?'` checked and `'x'` don't-care
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LevelWaveform {
    /// Stored test string, empty when absent.
    pub fn test_str(&self) -> &str {
        self.test.as_deref().unwrap_or("")
    }
}

/// A level document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Component identifier
    #[serde(default)]
    pub name: String,

    /// Board pin labels by pin index
    #[serde(default)]
    pub pins: Vec<String>,

    #[serde(default)]
    pub waveforms: Vec<LevelWaveform>,

    /// Accuracy needed to pass this level, overriding the configured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_threshold: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Document as read, written back by `to_json`
    #[serde(skip)]
    document: Value,
}

/// Difference between a stored output waveform and its golden trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformChange {
    /// Position in `Level::waveforms`
    pub waveform_index: usize,
    pub signal: SignalName,
    pub pin_index: PinIndex,
    pub old_values: String,
    pub new_values: String,
    pub old_test: String,
    pub new_test: String,
}

const PREVIEW_CHARS: usize = 50;

fn preview(s: &str) -> String {
    if s.chars().count() > PREVIEW_CHARS {
        let head: String = s.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

impl fmt::Display for WaveformChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (pin {})", self.signal, self.pin_index)?;
        writeln!(f, "    old: {}", preview(&self.old_values))?;
        writeln!(f, "    new: {}", preview(&self.new_values))?;
        write!(f, "    tst: {}", preview(&self.new_test))
    }
}

impl Level {
    /// Parses a level from JSON text.
    pub fn from_json(json: &str) -> LevelResult<Self> {
        let document: Value = serde_json::from_str(json)?;
        let mut level = Level::deserialize(&document)?;
        level.document = document;
        Ok(level)
    }

    /// Loads a level file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LevelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Renders the level as 2-space indented JSON with a trailing newline.
    ///
    /// A parsed level renders its original document, so only edits made
    /// through [`Level::apply`] show up. A level built in code renders its
    /// fields.
    pub fn to_json(&self) -> LevelResult<String> {
        let mut json = if self.document.is_object() {
            serde_json::to_string_pretty(&self.document)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        json.push('\n');
        Ok(json)
    }

    /// Writes the level file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> LevelResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Signal on `pin`: the model's own name for it first, then the board
    /// label. Unconnected pins resolve to nothing.
    fn resolve<'a>(&'a self, by_model: Option<&'a str>, pin: PinIndex) -> Option<&'a str> {
        by_model
            .or_else(|| self.pins.get(pin).map(String::as_str))
            .filter(|name| !UNCONNECTED_PINS.contains(name))
    }

    /// Collects the input waveforms by signal name, and the tick count.
    ///
    /// The tick count is the length of the last input waveform read, or
    /// `default_ticks` when the level has none.
    pub fn input_waveforms(&self, desc: &ModelDesc, default_ticks: usize) -> (WaveformSet, usize) {
        let mut inputs = WaveformSet::new();
        let mut n_ticks = default_ticks;

        for wf in self.waveforms.iter().filter(|wf| wf.is_input) {
            let Some(signal) = self.resolve(desc.input_at_pin(wf.pin_index), wf.pin_index) else {
                continue;
            };
            n_ticks = wf.values.len();
            inputs.insert(signal.to_string(), Waveform::from_bits(&wf.values));
        }

        (inputs, n_ticks)
    }

    /// Output rows paired with the signal they carry.
    fn outputs<'a>(
        &'a self,
        desc: &'a ModelDesc,
    ) -> impl Iterator<Item = (usize, &'a str, &'a LevelWaveform)> + 'a {
        self.waveforms
            .iter()
            .enumerate()
            .filter(|(_, wf)| !wf.is_input)
            .filter_map(move |(index, wf)| {
                self.resolve(desc.output_at_pin(wf.pin_index), wf.pin_index)
                    .map(|signal| (index, signal, wf))
            })
    }

    /// Compares the stored outputs with `golden`.
    ///
    /// Returns one change per output row whose values or test string differ
    /// from the golden trace. Rows for signals the golden set lacks are left
    /// alone.
    pub fn reconcile(&self, desc: &ModelDesc, golden: &GoldenSet) -> Vec<WaveformChange> {
        self.outputs(desc)
            .filter_map(|(index, signal, wf)| {
                let trace = golden.get(signal)?;
                let new_values = trace.values.to_bits();
                let new_test = trace.test.to_level_string();

                if wf.values == new_values && wf.test_str() == new_test {
                    return None;
                }
                Some(WaveformChange {
                    waveform_index: index,
                    signal: signal.to_string(),
                    pin_index: wf.pin_index,
                    old_values: wf.values.clone(),
                    new_values,
                    old_test: wf.test_str().to_string(),
                    new_test,
                })
            })
            .collect()
    }

    /// Writes `changes` into the waveform rows.
    pub fn apply(&mut self, changes: &[WaveformChange]) {
        for change in changes {
            if let Some(wf) = self.waveforms.get_mut(change.waveform_index) {
                wf.values = change.new_values.clone();
                wf.test = Some(change.new_test.clone());
            }

            let row = self
                .document
                .get_mut("waveforms")
                .and_then(|rows| rows.get_mut(change.waveform_index))
                .and_then(Value::as_object_mut);
            if let Some(row) = row {
                row.insert("values".into(), Value::String(change.new_values.clone()));
                row.insert("test".into(), Value::String(change.new_test.clone()));
            }
        }
    }

    /// Grades `actual` output waveforms against the stored expectations.
    ///
    /// Outputs missing from `actual` are graded against an all-low
    /// waveform.
    pub fn grade(&self, desc: &ModelDesc, actual: &WaveformSet) -> Grade {
        self.outputs(desc)
            .map(|(_, signal, wf)| {
                let expected = Waveform::from_bits(&wf.values);
                let test = TestVector::from_level_string(wf.test_str(), &expected);
                let low = Waveform::low(expected.len());
                grade(&expected, &test, actual.get(signal).unwrap_or(&low))
            })
            .fold(Grade::default(), Grade::merge)
    }

    /// Threshold for this level: its own, else `default`.
    pub fn threshold(&self, default: f64) -> f64 {
        self.accuracy_threshold.unwrap_or(default)
    }

    /// Grades `actual` and decides pass or fail against [`Level::threshold`].
    /// `None` when every stored tick is a don't-care.
    pub fn passes(&self, desc: &ModelDesc, actual: &WaveformSet, default: f64) -> Option<bool> {
        self.grade(desc, actual).passes(self.threshold(default))
    }
}

/// What processing did to one level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    /// Stored outputs already match
    Unchanged,
    /// Outputs were (or, on a dry run, would be) rewritten
    Modified(Vec<WaveformChange>),
    /// The level could not be generated
    Skipped(String),
}

impl LevelOutcome {
    pub fn is_modified(&self) -> bool {
        matches!(self, LevelOutcome::Modified(_))
    }
}

/// Regenerates the golden outputs of level files.
pub struct LevelProcessor<'r> {
    generator: Generator<'r>,
    default_ticks: usize,
    pass_threshold: f64,
    dry_run: bool,
}

impl<'r> LevelProcessor<'r> {
    /// Creates a processor using the policy, tick default, pass threshold
    /// and dry-run flag of `config`.
    pub fn new(registry: &'r ModelRegistry, config: &GeneratorConfig) -> Self {
        Self {
            generator: Generator::new(registry).with_policy(config.generator.missing_inputs),
            default_ticks: config.generator.default_ticks,
            pass_threshold: config.generator.pass_threshold,
            dry_run: config.levels.dry_run,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn generator(&self) -> &Generator<'r> {
        &self.generator
    }

    pub fn pass_threshold(&self) -> f64 {
        self.pass_threshold
    }

    fn describe(&self, level: &Level) -> Result<&'r ModelDesc, SimError> {
        self.generator
            .kernel()
            .registry()
            .describe(&level.name)
            .ok_or_else(|| SimError::UnknownComponent(level.name.clone()))
    }

    /// Grades `actual` against `level` and decides pass or fail, using the
    /// configured threshold where the level sets none.
    ///
    /// Returns the grade and the verdict, which is `None` when no tick was
    /// checked.
    pub fn check(&self, level: &Level, actual: &WaveformSet) -> LevelResult<(Grade, Option<bool>)> {
        let desc = self.describe(level)?;
        let grade = level.grade(desc, actual);
        Ok((grade, grade.passes(level.threshold(self.pass_threshold))))
    }

    /// Runs the golden simulation for `level`.
    pub fn golden(&self, level: &Level) -> LevelResult<GoldenSet> {
        let desc = self.describe(level)?;
        let (inputs, n_ticks) = level.input_waveforms(desc, self.default_ticks);
        Ok(self.generator.generate(&level.name, &inputs, n_ticks)?)
    }

    /// Loads, regenerates and (unless dry-running) rewrites one level file.
    ///
    /// # Errors
    /// Only for unreadable or malformed files. A level without a model, or
    /// whose simulation fails, is reported as `Skipped`.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> LevelResult<LevelOutcome> {
        let path = path.as_ref();
        let mut level = Level::from_file(path)?;

        let Some(desc) = self.generator.kernel().registry().describe(&level.name) else {
            tracing::warn!(path = %path.display(), "no model for {}, skipping", level.name);
            return Ok(LevelOutcome::Skipped(format!("no model for {}", level.name)));
        };

        let golden = match self.golden(&level) {
            Ok(golden) => golden,
            Err(LevelError::Sim(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "simulation error, skipping");
                return Ok(LevelOutcome::Skipped(format!("simulation error: {e}")));
            }
            Err(e) => return Err(e),
        };

        let changes = level.reconcile(desc, &golden);
        if changes.is_empty() {
            tracing::debug!(path = %path.display(), "unchanged");
            return Ok(LevelOutcome::Unchanged);
        }

        for change in &changes {
            tracing::info!(
                path = %path.display(),
                signal = %change.signal,
                pin = change.pin_index,
                "output changed"
            );
        }

        if !self.dry_run {
            level.apply(&changes);
            level.to_file(path)?;
        }
        Ok(LevelOutcome::Modified(changes))
    }
}
