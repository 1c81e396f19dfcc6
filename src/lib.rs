//! ReverbCheckr - Estimate reverberation decay from recorded room responses
//!
//! Measures how long sound takes to die away in a room: per-band RT60,
//! dominant frequency, and the resonance frequency with the longest decay.
//!
//! ## Features
//!
//! - **Per-band RT60**: Butterworth bandpass, Schroeder integration, threshold crossings
//! - **Measurement presets**: T20 (-5..-25 dB), T30 (-5..-35 dB), EDT (0..-10 dB)
//! - **Peak frequency**: Windowed real FFT of the whole recording
//! - **Resonance scan**: Spectrogram-slice RT60 over a probe grid, evaluated in parallel
//! - **Frequency cycling**: Step through 250 / 1000 / 1750 Hz with an explicit session value
//!
//! ## Module Structure
//!
//! - `core` - Buffers, DSP, decay analysis, the engine and the decoder
//! - `cli` - Command-line interface
//! - `config` - Presets and analysis configuration
//! - `detection` - Result types
//! - `testgen` - Synthetic test signals and WAV export
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reverbcheckr::{decode_audio, ReverbAnalysisEngine, MeasurementPreset};
//!
//! let engine = ReverbAnalysisEngine::builder()
//!     .preset(MeasurementPreset::T30)
//!     .build()?;
//! let decoded = decode_audio(path)?;
//! let report = engine.analyze(&decoded.buffer)?;
//!
//! for band in &report.rt60_by_band {
//!     println!("{}: {:?}", band.label, band.result.value_seconds);
//! }
//! ```

// Core analysis functionality
pub mod core;

// Command-line interface
pub mod cli;

// Configuration and presets
pub mod config;

// Result types
pub mod detection;

pub mod error;

// Synthetic signals
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use config::{AnalysisConfig, ConfigBuilder, MeasurementPreset, NamedBand};
pub use core::analysis::{
    CycleTarget, DecayMode, DecaySpan, FrequencyCycle, ProbeGrid, ScanCancellation,
};
pub use core::{
    decode_audio, AudioBuffer, DecayCurve, DecodedAudio, EngineBuilder, FrequencyBand,
    ReverbAnalysisEngine,
};
pub use detection::{
    AnalysisReport, BandRt60, PeakFrequencyResult, ResonanceScanResult, Rt60Result,
};
pub use error::{ReverbError, Result};
