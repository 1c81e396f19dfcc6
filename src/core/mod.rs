//! Core analysis and decoding modules

pub mod analysis;
pub mod analyzer;
pub mod buffer;
pub mod decoder;
pub mod dsp;

pub use analyzer::{EngineBuilder, ReverbAnalysisEngine};
pub use buffer::{AudioBuffer, DecayCurve, FrequencyBand};
pub use decoder::{decode_audio, DecodedAudio};
