//! goldvec CLI: regenerates the golden outputs and test vectors of level
//! files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use goldvec::{
    init_logging, GeneratorConfig, LevelOutcome, LevelProcessor, ModelRegistry, RunReport, Timer,
};

/// Regenerate golden output waveforms and test vectors for level files.
#[derive(Parser, Debug)]
#[command(name = "goldvec", version, about)]
struct Cli {
    /// Level JSON files (default: every *.json in the levels directory)
    files: Vec<PathBuf>,

    /// Show changes without writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// YAML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory searched when no files are given
    #[arg(long)]
    levels_dir: Option<PathBuf>,

    /// Print the component catalog and exit
    #[arg(long)]
    list: bool,

    /// Write a run report to this path (CSV for *.csv, JSON otherwise)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print a run summary after processing
    #[arg(short, long)]
    summary: bool,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match GeneratorConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => GeneratorConfig::default(),
    };
    config.levels.dry_run |= cli.dry_run;
    if let Some(dir) = &cli.levels_dir {
        config.levels.dir = dir.clone();
    }

    let level = if cli.verbose { "debug" } else { config.generator.log_level.as_str() };
    init_logging(level);

    let mut registry = ModelRegistry::builtin();
    if let Err(e) = config.apply_to(&mut registry) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    if cli.list {
        print_catalog(&registry);
        return ExitCode::SUCCESS;
    }

    let files = if cli.files.is_empty() {
        find_levels(&config.levels.dir)
    } else {
        cli.files.clone()
    };
    if files.is_empty() {
        println!("No level files found!");
        return ExitCode::FAILURE;
    }

    let report = run(&registry, &config, &files);
    if cli.summary {
        println!();
        print!("{}", report.summary());
    }

    if let Some(path) = &cli.report {
        if let Err(e) = report.to_file(path) {
            eprintln!("error: {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    if report.errors() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(registry: &ModelRegistry, config: &GeneratorConfig, files: &[PathBuf]) -> RunReport {
    let dry_run = config.levels.dry_run;
    let processor = LevelProcessor::new(registry, config);
    let mut report = RunReport::new(dry_run);
    let timer = Timer::start();

    println!("Processing {} level files...", files.len());
    if dry_run {
        println!("(dry run - no files will be modified)");
    }
    println!();

    for path in files {
        let name = display_name(path);
        match processor.process(path) {
            Ok(outcome) => {
                match &outcome {
                    LevelOutcome::Modified(changes) => {
                        for change in changes {
                            println!("  {name}: {change}");
                        }
                    }
                    LevelOutcome::Skipped(reason) => println!("  {name}: {reason}, skipping"),
                    LevelOutcome::Unchanged => {}
                }
                report.record(path, &outcome);
            }
            Err(e) => {
                eprintln!("  {name}: {e}");
                report.record_error(path, &e);
            }
        }
    }

    report.kernel = processor.generator().kernel().stats();
    report.wall_time_ms = timer.elapsed_ms();

    println!();
    println!(
        "{} {} files.",
        if dry_run { "Would modify" } else { "Modified" },
        report.modified()
    );
    report
}

/// Every `*.json` directly inside `dir`, sorted.
fn find_levels(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "levels directory not readable");
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_catalog(registry: &ModelRegistry) {
    for desc in registry.descriptions() {
        println!(
            "{:<8} {:<32} in: {:<20} out: {:<16} warmup {} stability {}",
            desc.id,
            desc.title,
            desc.inputs.join(","),
            desc.outputs.join(","),
            desc.timing.warmup_ticks,
            desc.timing.stability_ticks,
        );
    }
}
