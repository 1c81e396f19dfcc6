//! Analysis result types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::buffer::FrequencyBand;

/// Which curve producer an RT60 value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecayMethod {
    /// Band-filtered energy decay curve
    AmplitudeIntegration,
    /// Single spectrogram bin over time
    SpectrogramSlice,
}

impl DecayMethod {
    pub fn description(&self) -> &'static str {
        match self {
            DecayMethod::AmplitudeIntegration => "amplitude integration",
            DecayMethod::SpectrogramSlice => "spectrogram slice",
        }
    }
}

/// What an RT60 value was measured over
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayTarget {
    Band(FrequencyBand),
    Bin { frequency_hz: f64 },
}

/// RT60 estimate for one band or bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rt60Result {
    /// `None` when the decay never crossed both thresholds
    pub value_seconds: Option<f64>,
    pub method: DecayMethod,
    pub target: DecayTarget,
}

impl Rt60Result {
    pub fn is_defined(&self) -> bool {
        self.value_seconds.is_some()
    }
}

/// RT60 for one labelled band of a report
#[derive(Debug, Clone, Serialize)]
pub struct BandRt60 {
    pub label: String,
    pub result: Rt60Result,
    /// `value - target` when a target RT60 is configured and the value is defined
    pub difference_seconds: Option<f64>,
}

/// A band that could not be measured
#[derive(Debug, Clone, Serialize)]
pub struct BandFailure {
    pub label: String,
    pub reason: String,
}

/// Dominant full-band frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakFrequencyResult {
    pub frequency_hz: f64,
    /// Relative magnitude (window-normalized, not calibrated)
    pub magnitude: f64,
    /// Achievable precision, one FFT bin
    pub resolution_hz: f64,
}

/// RT60 at one scanned probe frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeResult {
    pub frequency_hz: f64,
    pub rt60_seconds: Option<f64>,
}

/// Probe frequency with the longest decay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResonanceScanResult {
    pub frequency_hz: f64,
    pub rt60_seconds: f64,
}

/// Everything the engine measures for one buffer
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub rt60_by_band: Vec<BandRt60>,
    pub band_errors: Vec<BandFailure>,
    pub peak_frequency: PeakFrequencyResult,
    pub resonance: Option<ResonanceScanResult>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// RT60 for a band label
    pub fn rt60(&self, label: &str) -> Option<&Rt60Result> {
        self.rt60_by_band
            .iter()
            .find(|b| b.label == label)
            .map(|b| &b.result)
    }

    /// True when no band produced a defined decay
    pub fn all_undefined(&self) -> bool {
        self.rt60_by_band.iter().all(|b| !b.result.is_defined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rt60_serializes_undefined_as_null() {
        let result = Rt60Result {
            value_seconds: None,
            method: DecayMethod::AmplitudeIntegration,
            target: DecayTarget::Band(FrequencyBand::new(20.0, 250.0)),
        };
        let json = serde_json::to_value(result).unwrap();
        assert!(json["value_seconds"].is_null());
        assert_eq!(json["method"], "amplitude-integration");
        assert_eq!(json["target"]["kind"], "band");
        assert_eq!(json["target"]["low_hz"], 20.0);
    }

    #[test]
    fn test_zero_is_distinct_from_undefined() {
        let target = DecayTarget::Bin { frequency_hz: 1000.0 };
        let zero = Rt60Result {
            value_seconds: Some(0.0),
            method: DecayMethod::SpectrogramSlice,
            target,
        };
        let undefined = Rt60Result { value_seconds: None, ..zero };
        assert!(zero.is_defined());
        assert!(!undefined.is_defined());
        assert_ne!(zero, undefined);
    }
}
