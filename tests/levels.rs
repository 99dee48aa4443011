//! Integration tests for level file processing.
//!
//! These tests run the level processor over files in a temporary directory
//! and check reconciliation, configuration overrides, reports and grading.

use std::path::Path;

use goldvec::{
    GeneratorConfig, GeneratorConfigBuilder, Grade, Level, LevelOutcome, LevelProcessor,
    ModelRegistry, RunReport, TimingOverride, Waveform, WaveformSet, DEFAULT_PASS_THRESHOLD,
};

// ============================================================================
// Fixtures
// ============================================================================

const DIVIDER_LEVEL: &str = r#"{
  "name": "CX93",
  "pins": ["vcc", "CLK", "nc", "nc", "nc", "nc", "nc", "Y"],
  "waveforms": [
    { "pin_index": 1, "is_input": true, "values": "0101010101010101" },
    { "pin_index": 7, "is_input": false, "values": "0000000000000000", "test": "????????????????" }
  ],
  "hint": "Count to four."
}"#;

const SOLVED_DIVIDER_LEVEL: &str = r#"{
  "name": "CX93",
  "pins": ["vcc", "CLK", "nc", "nc", "nc", "nc", "nc", "Y"],
  "waveforms": [
    { "pin_index": 1, "is_input": true, "values": "01010101" },
    { "pin_index": 7, "is_input": false, "values": "00011110", "test": "???xx??x" }
  ]
}"#;

const UNKNOWN_LEVEL: &str = r#"{ "name": "SANDBOX", "pins": [], "waveforms": [] }"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Processing
// ============================================================================

#[test]
fn test_process_directory_of_levels() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write(dir.path(), "01_divider.json", DIVIDER_LEVEL),
        write(dir.path(), "02_solved.json", SOLVED_DIVIDER_LEVEL),
        write(dir.path(), "03_sandbox.json", UNKNOWN_LEVEL),
    ];

    let registry = ModelRegistry::builtin();
    let config = GeneratorConfig::default();
    let processor = LevelProcessor::new(&registry, &config);
    let mut report = RunReport::new(false);

    for path in &files {
        let outcome = processor.process(path).unwrap();
        report.record(path, &outcome);
    }
    report.kernel = processor.generator().kernel().stats();

    assert_eq!(report.modified(), 1);
    assert_eq!(report.unchanged(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.kernel.completed, 2);

    let rewritten = Level::from_file(&files[0]).unwrap();
    let y = &rewritten.waveforms[1];
    assert_eq!(y.values, "0001111000011110");
    assert_eq!(y.test.as_deref(), Some("???xx??xx??xx??x"));
    assert_eq!(rewritten.extra["hint"], "Count to four.");

    let text = std::fs::read_to_string(&files[0]).unwrap();
    assert!(text.ends_with("}\n"));
    assert!(text.contains("\n    {\n      \"pin_index\": 1,"));

    // Untouched files keep their exact bytes.
    assert_eq!(std::fs::read_to_string(&files[1]).unwrap(), SOLVED_DIVIDER_LEVEL);
    assert_eq!(std::fs::read_to_string(&files[2]).unwrap(), UNKNOWN_LEVEL);
}

#[test]
fn test_timing_override_changes_test_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "solved.json", SOLVED_DIVIDER_LEVEL);

    let mut registry = ModelRegistry::builtin();
    let config = GeneratorConfigBuilder::new()
        .dry_run(true)
        .timing(
            "CX93",
            TimingOverride {
                warmup_ticks: Some(1),
                stability_ticks: Some(1),
            },
        )
        .build()
        .unwrap();
    config.apply_to(&mut registry).unwrap();

    let processor = LevelProcessor::new(&registry, &config);
    match processor.process(&path).unwrap() {
        LevelOutcome::Modified(changes) => {
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].signal, "Y");
            assert_eq!(changes[0].old_values, changes[0].new_values);
            assert_eq!(changes[0].old_test, "???xx??x");
            assert_eq!(changes[0].new_test, "x??x???x");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOLVED_DIVIDER_LEVEL);
}

#[test]
fn test_config_file_drives_processor() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write(
        dir.path(),
        "goldvec.yaml",
        "generator:\n  missing_inputs: treat_as_low\nlevels:\n  dry_run: true\n",
    );
    let config = GeneratorConfig::from_file(&config_path).unwrap();

    // CLR is not on the board; it reads low.
    let level_path = write(
        dir.path(),
        "counter.json",
        r#"{ "name": "CX161", "pins": [],
             "waveforms": [
               { "pin_index": 1, "values": "0101" },
               { "pin_index": 7, "is_input": false, "values": "", "test": "" }
             ] }"#,
    );

    let registry = ModelRegistry::builtin();
    let processor = LevelProcessor::new(&registry, &config);
    assert!(processor.is_dry_run());

    match processor.process(&level_path).unwrap() {
        LevelOutcome::Modified(changes) => {
            assert_eq!(changes[0].signal, "Q0");
            assert_eq!(changes[0].new_values, "0110");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_rewrite_keeps_document_layout() {
    let original = r#"{
  "name": "CX93",
  "order": 3,
  "pins": [
    "vcc",
    "CLK",
    "nc",
    "nc",
    "nc",
    "nc",
    "nc",
    "Y"
  ],
  "specification": [
    "Divide the clock by four."
  ],
  "waveforms": [
    {
      "pin_index": 1,
      "values": "01010101"
    },
    {
      "display": true,
      "pin_index": 7,
      "is_input": false,
      "values": "00000000",
      "test": "????????"
    }
  ],
  "accuracy_threshold": 0.97
}
"#;
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "divider.json", original);

    let registry = ModelRegistry::builtin();
    let processor = LevelProcessor::new(&registry, &GeneratorConfig::default());
    assert!(processor.process(&path).unwrap().is_modified());

    let expected = original
        .replace("\"00000000\"", "\"00011110\"")
        .replace("\"????????\"", "\"???xx??x\"");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
}

// ============================================================================
// Grading
// ============================================================================

#[test]
fn test_grade_player_outputs() {
    let registry = ModelRegistry::builtin();
    let desc = registry.describe("CX93").unwrap();
    let level = Level::from_json(SOLVED_DIVIDER_LEVEL).unwrap();

    // Late by one tick: only the don't-care ticks differ.
    let mut actual = WaveformSet::new();
    actual.insert("Y".into(), Waveform::from_bits("00001111"));
    let g = level.grade(desc, &actual);
    assert_eq!(g, Grade { checked: 5, correct: 5 });
    assert_eq!(g.passes(DEFAULT_PASS_THRESHOLD), Some(true));

    actual.insert("Y".into(), Waveform::from_bits("00000000"));
    let g = level.grade(desc, &actual);
    assert_eq!(g, Grade { checked: 5, correct: 3 });
    assert_eq!(g.passes(DEFAULT_PASS_THRESHOLD), Some(false));
}

#[test]
fn test_level_threshold_and_configured_fallback() {
    let registry = ModelRegistry::builtin();
    let desc = registry.describe("CX93").unwrap();
    let mut actual = WaveformSet::new();
    // Wrong on 2 of 5 checked ticks.
    actual.insert("Y".into(), Waveform::from_bits("00000000"));

    let level = Level::from_json(SOLVED_DIVIDER_LEVEL).unwrap();
    assert_eq!(level.passes(desc, &actual, 0.6), Some(true));
    assert_eq!(level.passes(desc, &actual, DEFAULT_PASS_THRESHOLD), Some(false));

    let config = GeneratorConfigBuilder::new().pass_threshold(0.5).build().unwrap();
    let processor = LevelProcessor::new(&registry, &config);
    assert_eq!(processor.check(&level, &actual).unwrap().1, Some(true));

    let strict = Level::from_json(&SOLVED_DIVIDER_LEVEL.replace(
        "\n  ]\n}",
        "\n  ],\n  \"accuracy_threshold\": 0.9\n}",
    ))
    .unwrap();
    assert_eq!(strict.accuracy_threshold, Some(0.9));
    assert_eq!(processor.check(&strict, &actual).unwrap().1, Some(false));
}
