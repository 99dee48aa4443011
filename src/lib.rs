//! # goldvec
//!
//! Golden waveform and test vector generation for a catalog of small
//! digital-logic components.
//!
//! Given a component identifier and its input waveforms, goldvec simulates
//! the component tick by tick and produces, for every output, the expected
//! waveform plus a test vector marking the ticks where any value is
//! acceptable (warm-up and settling after transitions).
//!
//! ## Building Blocks
//!
//! - **Registry** ([`registry`]): component identifiers mapped to a
//!   descriptor (signals, pins, timing hints) and a model factory.
//! - **Kernel** ([`kernel`]): runs one fresh model instance over ticks
//!   `0..n`, rejecting malformed input and catching model faults.
//! - **Mask synthesis** ([`mask`]): derives the test vector of a waveform.
//! - **Golden sets** ([`golden`]): kernel run plus synthesis per output.
//! - **Levels** ([`level`]): reads and rewrites the JSON level files the
//!   golden data is stored in; [`grade`] scores a circuit against them.
//!
//! ## Features
//!
//! - `parallel` - Run [`batch`] jobs on rayon's thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use goldvec::{Generator, ModelRegistry, Waveform, WaveformSet};
//!
//! let registry = ModelRegistry::builtin();
//! let generator = Generator::new(&registry);
//!
//! let mut inputs = WaveformSet::new();
//! inputs.insert("CLK".into(), Waveform::from_bits("0101010101010101"));
//!
//! let golden = generator.generate("CX93", &inputs, 16).unwrap();
//! let y = golden.get("Y").unwrap();
//! assert_eq!(y.values.to_bits(), "0001111000011110");
//! assert_eq!(y.test.to_level_string(), "???xx??xx??xx??x");
//! ```
//!
//! ## Custom Components
//!
//! ```rust
//! use goldvec::{Model, ModelDesc, ModelKind, ModelRegistry, ModelResult, TickInputs};
//!
//! struct Inverter;
//!
//! impl Model for Inverter {
//!     fn on_tick(&mut self, inputs: &TickInputs<'_>) -> ModelResult<Vec<bool>> {
//!         Ok(vec![!inputs.get("A")?])
//!     }
//! }
//!
//! let mut registry = ModelRegistry::builtin();
//! registry.register(
//!     ModelDesc::new("INV", ModelKind::Combinational)
//!         .with_input("A", 1)
//!         .with_output("Y", 7),
//!     || Box::new(Inverter),
//! );
//! assert!(registry.contains("INV"));
//! ```

pub mod types;
pub mod waveform;
pub mod error;
pub mod model;
pub mod models;
pub mod registry;
pub mod kernel;
pub mod mask;
pub mod golden;
pub mod grade;
pub mod batch;
pub mod config;
pub mod level;
pub mod report;

// Re-export commonly used types
pub use types::{ComponentId, PinIndex, SignalName, Tick, WaveformSet};
pub use waveform::Waveform;
pub use error::{ModelError, ModelResult, SimError, SimResult};
pub use model::{Model, ModelDesc, ModelKind, TickInputs, TimingHints};
pub use registry::{create_default_registry, ModelFactory, ModelRegistry};
pub use kernel::{Kernel, KernelStats, MissingInputPolicy, SimOutput};
pub use mask::{synthesize, TestSymbol, TestVector};
pub use golden::{GoldenSet, GoldenTrace, Generator};
pub use grade::{grade, Grade, DEFAULT_PASS_THRESHOLD};
pub use batch::{BatchRunner, BatchStats, JobOutcome, SimJob};
pub use config::{ConfigError, GeneratorConfig, GeneratorConfigBuilder, TimingOverride};
pub use level::{Level, LevelError, LevelOutcome, LevelProcessor, WaveformChange};
pub use report::{RunReport, Timer};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// goldvec::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
