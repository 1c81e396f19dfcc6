// src/error.rs
//
// Error taxonomy for the decay estimation engine.

use thiserror::Error;

/// Errors raised by the analysis components.
///
/// A decay that never crosses its thresholds is not an error; it is reported
/// as an absent value on [`crate::Rt60Result`].
#[derive(Debug, Clone, Error)]
pub enum ReverbError {
    /// Band edges violate `0 < low < high < nyquist`
    #[error("invalid band {low_hz} Hz - {high_hz} Hz (nyquist {nyquist} Hz)")]
    InvalidBand {
        low_hz: f64,
        high_hz: f64,
        nyquist: f64,
    },

    /// Zero-length sample buffer
    #[error("audio buffer contains no samples")]
    EmptySignal,

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Probe grid is empty, unordered, or outside (0, nyquist)
    #[error("invalid probe grid: {0}")]
    InvalidGrid(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// FFT planning or execution failed
    #[error("transform failed: {0}")]
    Transform(String),

    /// Resonance scan stopped by its cancellation token
    #[error("analysis cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ReverbError>;
