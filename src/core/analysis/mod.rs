//! Decay estimation algorithms
//!
//! - Energy decay curves (Schroeder integration or raw energy)
//! - Threshold-crossing RT60 measurement
//! - Full-band spectral peak detection
//! - Spectrogram-slice decay curves
//! - Resonance scanning over a probe grid
//! - Manual frequency cycling

mod cycle;
mod decay_threshold;
mod energy_decay;
mod peak_frequency;
mod resonance;
mod spectrogram_decay;

pub use cycle::{CycleTarget, FrequencyCycle};
pub use decay_threshold::{DecayMeasurement, DecaySpan, DecayThresholdLocator};
pub use energy_decay::{DecayMode, EnergyDecayBuilder};
pub use peak_frequency::SpectralPeakFinder;
pub use resonance::{ProbeGrid, ResonanceScanner, ScanCancellation};
pub use spectrogram_decay::{Spectrogram, SpectrogramSettings, TimeFrequencyDecaySampler};
