//! Core type definitions shared across the crate.

use std::collections::BTreeMap;

use crate::waveform::Waveform;

/// Discrete simulation step, indexed from 0.
///
/// Ticks are the only notion of time: there is no propagation delay and no
/// sub-tick ordering.
pub type Tick = usize;

/// Catalog key of a component model (e.g. `"CX74"`).
pub type ComponentId = String;

/// Name of an input or output signal, scoped to one component.
pub type SignalName = String;

/// Physical pin position on a level board.
pub type PinIndex = usize;

/// Input waveforms for one run, keyed by signal name.
pub type WaveformSet = BTreeMap<SignalName, Waveform>;
