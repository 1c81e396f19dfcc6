//! Configuration module for ReverbCheckr

mod profiles;

pub use profiles::{
    default_bands, AnalysisConfig, ConfigBuilder, MeasurementPreset, NamedBand, ResonanceSettings,
};
