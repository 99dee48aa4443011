//! Run reports for level processing.
//!
//! A `RunReport` collects the outcome of every processed level together with
//! the kernel counters, and exports them as JSON, CSV or a readable summary.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::kernel::KernelStats;
use crate::level::LevelOutcome;

/// Outcome of one level file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub path: String,
    /// "unchanged", "modified", "skipped" or "error"
    pub status: String,
    /// Output rows that changed
    pub changes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate report of a level run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub levels: Vec<LevelEntry>,
    pub kernel: KernelStats,
    /// Total wall-clock time in milliseconds
    pub wall_time_ms: f64,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Records the outcome of one level.
    pub fn record(&mut self, path: &Path, outcome: &LevelOutcome) {
        let (status, changes, reason) = match outcome {
            LevelOutcome::Unchanged => ("unchanged", 0, None),
            LevelOutcome::Modified(changes) => ("modified", changes.len(), None),
            LevelOutcome::Skipped(reason) => ("skipped", 0, Some(reason.clone())),
        };
        self.levels.push(LevelEntry {
            path: path.display().to_string(),
            status: status.to_string(),
            changes,
            reason,
        });
    }

    /// Records a level that could not be read or written.
    pub fn record_error(&mut self, path: &Path, error: impl std::fmt::Display) {
        self.levels.push(LevelEntry {
            path: path.display().to_string(),
            status: "error".to_string(),
            changes: 0,
            reason: Some(error.to_string()),
        });
    }

    fn count(&self, status: &str) -> usize {
        self.levels.iter().filter(|l| l.status == status).count()
    }

    /// Levels that were (or would be) rewritten.
    pub fn modified(&self) -> usize {
        self.count("modified")
    }

    pub fn unchanged(&self) -> usize {
        self.count("unchanged")
    }

    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn errors(&self) -> usize {
        self.count("error")
    }

    /// Exports the report to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports the report to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Writes the report to `path`: CSV for a `.csv` extension, JSON
    /// otherwise.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "csv") {
            std::fs::write(path, self.to_csv())
        } else {
            self.to_json_file(path)
        }
    }

    /// Exports one row per level to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("path,status,changes\n");
        for level in &self.levels {
            csv.push_str(&format!("{},{},{}\n", level.path, level.status, level.changes));
        }
        csv
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Golden Generation Report ===")?;
        writeln!(w)?;
        if self.dry_run {
            writeln!(w, "(dry run)")?;
        }
        writeln!(w, "Levels: {}", self.levels.len())?;
        writeln!(w, "Modified: {}", self.modified())?;
        writeln!(w, "Unchanged: {}", self.unchanged())?;
        writeln!(w, "Skipped: {}", self.skipped())?;
        writeln!(w, "Errors: {}", self.errors())?;
        writeln!(w)?;

        writeln!(w, "--- Kernel ---")?;
        writeln!(w, "Runs: {}", self.kernel.runs)?;
        writeln!(w, "Completed: {}", self.kernel.completed)?;
        writeln!(w, "Failed: {}", self.kernel.failed)?;
        writeln!(w, "Ticks simulated: {}", self.kernel.ticks_simulated)?;
        writeln!(w, "Wall time: {:.2} ms", self.wall_time_ms)?;

        let notes: Vec<_> = self.levels.iter().filter(|l| l.reason.is_some()).collect();
        if !notes.is_empty() {
            writeln!(w)?;
            writeln!(w, "--- Skipped / Errors ---")?;
            for level in notes {
                writeln!(
                    w,
                    "{}: {}",
                    level.path,
                    level.reason.as_deref().unwrap_or_default()
                )?;
            }
        }
        Ok(())
    }

    /// Returns the summary as a string.
    pub fn summary(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_summary(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::WaveformChange;

    fn change() -> WaveformChange {
        WaveformChange {
            waveform_index: 2,
            signal: "Q".into(),
            pin_index: 7,
            old_values: String::new(),
            new_values: "0001".into(),
            old_test: String::new(),
            new_test: "???x".into(),
        }
    }

    fn sample() -> RunReport {
        let mut report = RunReport::new(false);
        report.record(Path::new("levels/a.json"), &LevelOutcome::Unchanged);
        report.record(
            Path::new("levels/b.json"),
            &LevelOutcome::Modified(vec![change(), change()]),
        );
        report.record(
            Path::new("levels/c.json"),
            &LevelOutcome::Skipped("no model for ZZ99".into()),
        );
        report.record_error(Path::new("levels/d.json"), "JSON error: EOF");
        report.kernel.runs = 2;
        report.kernel.completed = 2;
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.levels.len(), 4);
        assert_eq!(report.modified(), 1);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.errors(), 1);
        assert_eq!(report.levels[1].changes, 2);
    }

    #[test]
    fn test_json_export() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["levels"][1]["status"], "modified");
        assert_eq!(value["levels"][2]["reason"], "no model for ZZ99");
        assert!(value["levels"][0].get("reason").is_none());
        assert_eq!(value["kernel"]["completed"], 2);
    }

    #[test]
    fn test_csv_export() {
        let csv = sample().to_csv();
        assert!(csv.starts_with("path,status,changes\n"));
        assert!(csv.contains("levels/b.json,modified,2"));
    }

    #[test]
    fn test_file_format_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample();

        let csv = dir.path().join("report.csv");
        report.to_file(&csv).unwrap();
        assert_eq!(std::fs::read_to_string(&csv).unwrap(), report.to_csv());

        let json = dir.path().join("report.json");
        report.to_file(&json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["levels"][3]["status"], "error");
    }

    #[test]
    fn test_summary_output() {
        let summary = sample().summary();
        assert!(summary.contains("=== Golden Generation Report ==="));
        assert!(summary.contains("Modified: 1"));
        assert!(summary.contains("levels/c.json: no model for ZZ99"));
        assert!(!summary.contains("(dry run)"));
        assert!(RunReport::new(true).summary().contains("(dry run)"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5.0);
    }
}
