//! Result types for reverberation analysis

mod result;

pub use result::{
    AnalysisReport, BandFailure, BandRt60, DecayMethod, DecayTarget, PeakFrequencyResult,
    ProbeResult, ResonanceScanResult, Rt60Result,
};
