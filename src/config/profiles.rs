// src/config/profiles.rs
//
// Measurement presets and the engine configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::analysis::{DecayMode, DecaySpan, ProbeGrid, SpectrogramSettings};
use crate::core::buffer::FrequencyBand;
use crate::core::dsp::{FilterOrder, WindowType};
use crate::error::{ReverbError, Result};

/// Preset measurement standards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementPreset {
    /// -5 dB to -25 dB, extrapolated x3
    T20,
    /// -5 dB to -35 dB, extrapolated x2
    T30,
    /// Early decay time: 0 dB to -10 dB, extrapolated x6
    Edt,
    /// User-defined settings
    Custom,
}

impl MeasurementPreset {
    pub fn all() -> Vec<Self> {
        vec![Self::T20, Self::T30, Self::Edt]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "t20" | "rt20" | "standard" => Some(Self::T20),
            "t30" | "rt30" => Some(Self::T30),
            "edt" | "early" => Some(Self::Edt),
            _ => None,
        }
    }

    pub fn span(&self) -> DecaySpan {
        match self {
            MeasurementPreset::T20 | MeasurementPreset::Custom => DecaySpan::T20,
            MeasurementPreset::T30 => DecaySpan::T30,
            MeasurementPreset::Edt => DecaySpan::EDT,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MeasurementPreset::T20 => "RT60 from the -5..-25 dB decay (x3)",
            MeasurementPreset::T30 => "RT60 from the -5..-35 dB decay (x2)",
            MeasurementPreset::Edt => "Early decay time, 0..-10 dB (x6)",
            MeasurementPreset::Custom => "User-defined decay span",
        }
    }
}

/// A band with its report label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBand {
    pub label: String,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl NamedBand {
    pub fn new(label: impl Into<String>, low_hz: f64, high_hz: f64) -> Self {
        Self {
            label: label.into(),
            low_hz,
            high_hz,
        }
    }

    pub fn band(&self) -> FrequencyBand {
        FrequencyBand::new(self.low_hz, self.high_hz)
    }
}

/// Low 20-250 Hz, mid 250-2000 Hz, high 2000-20000 Hz
pub fn default_bands() -> Vec<NamedBand> {
    vec![
        NamedBand::new("low", 20.0, 250.0),
        NamedBand::new("mid", 250.0, 2000.0),
        NamedBand::new("high", 2000.0, 20000.0),
    ]
}

/// Resonance scan settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub grid: ProbeGrid,
}

impl Default for ResonanceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            grid: ProbeGrid::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub preset: MeasurementPreset,
    pub bands: Vec<NamedBand>,
    pub filter_order: FilterOrder,
    pub decay_mode: DecayMode,
    pub span: DecaySpan,
    pub peak_window: WindowType,
    pub spectrogram: SpectrogramSettings,
    pub resonance: ResonanceSettings,
    /// Peak-normalize the buffer before analysis
    pub normalize: bool,
    /// Reference RT60 for per-band differences
    pub target_rt60: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_preset(MeasurementPreset::T20)
    }
}

impl AnalysisConfig {
    /// Create configuration from preset
    pub fn from_preset(preset: MeasurementPreset) -> Self {
        Self {
            preset,
            bands: default_bands(),
            filter_order: FilterOrder::Two,
            decay_mode: DecayMode::Schroeder,
            span: preset.span(),
            peak_window: WindowType::Hann,
            spectrogram: SpectrogramSettings::default(),
            resonance: ResonanceSettings::default(),
            normalize: true,
            target_rt60: None,
        }
    }

    /// Load a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that does not depend on the sample rate.
    ///
    /// Band edges are checked per band at analysis time, against the
    /// buffer's Nyquist frequency.
    pub fn validate(&self) -> Result<()> {
        self.span.validate()?;

        if self.spectrogram.window_size < 2 || self.spectrogram.overlap >= self.spectrogram.window_size {
            return Err(ReverbError::InvalidConfig(format!(
                "spectrogram window {} with overlap {}",
                self.spectrogram.window_size, self.spectrogram.overlap
            )));
        }

        if self.resonance.enabled {
            self.resonance.grid.frequencies()?;
        }

        if let Some(target) = self.target_rt60 {
            if !(target.is_finite() && target > 0.0) {
                return Err(ReverbError::InvalidConfig(format!(
                    "target RT60 must be positive, got {}",
                    target
                )));
            }
        }

        Ok(())
    }
}

/// Builder for custom configurations
pub struct ConfigBuilder {
    config: AnalysisConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    pub fn from_preset(preset: MeasurementPreset) -> Self {
        Self {
            config: AnalysisConfig::from_preset(preset),
        }
    }

    pub fn from_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn bands(mut self, bands: Vec<NamedBand>) -> Self {
        self.config.bands = bands;
        self
    }

    pub fn band(mut self, label: impl Into<String>, low_hz: f64, high_hz: f64) -> Self {
        self.config.bands.push(NamedBand::new(label, low_hz, high_hz));
        self
    }

    pub fn filter_order(mut self, order: FilterOrder) -> Self {
        self.config.filter_order = order;
        self
    }

    pub fn decay_mode(mut self, mode: DecayMode) -> Self {
        self.config.decay_mode = mode;
        self
    }

    pub fn span(mut self, start_offset_db: f64, end_offset_db: f64) -> Self {
        self.config.span = DecaySpan::new(start_offset_db, end_offset_db);
        self.config.preset = MeasurementPreset::Custom;
        self
    }

    pub fn peak_window(mut self, window: WindowType) -> Self {
        self.config.peak_window = window;
        self
    }

    pub fn spectrogram(mut self, window_size: usize, overlap: usize) -> Self {
        self.config.spectrogram.window_size = window_size;
        self.config.spectrogram.overlap = overlap;
        self
    }

    pub fn resonance(mut self, enabled: bool) -> Self {
        self.config.resonance.enabled = enabled;
        self
    }

    pub fn probe_grid(mut self, start_hz: f64, stop_hz: f64, step_hz: f64) -> Self {
        self.config.resonance.grid = ProbeGrid {
            start_hz,
            stop_hz,
            step_hz,
        };
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    pub fn target_rt60(mut self, seconds: Option<f64>) -> Self {
        self.config.target_rt60 = seconds;
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
