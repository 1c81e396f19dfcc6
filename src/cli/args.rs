//! CLI argument model with preset support

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AnalysisConfig, MeasurementPreset};
use crate::core::analysis::{DecayMode, ProbeGrid};
use crate::core::dsp::FilterOrder;

#[derive(Parser, Debug)]
#[command(name = "reverbcheckr", version)]
#[command(about = "Estimate RT60, peak frequency and resonance of recorded room responses")]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze audio files or directories
    Analyze(AnalyzeArgs),
    /// Write a synthetic test signal
    Generate {
        #[command(subcommand)]
        signal: GenerateSignal,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Measurement preset (t20, t30, edt)
    #[arg(long, env = "REVERBCHECKR_PRESET")]
    pub preset: Option<String>,

    /// JSON configuration file; flags given here override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bandpass filter order (2 or 4)
    #[arg(long)]
    pub order: Option<u32>,

    /// Decay curve mode (schroeder, instantaneous)
    #[arg(long)]
    pub mode: Option<String>,

    /// Skip the resonance scan
    #[arg(long)]
    pub no_resonance: bool,

    /// First resonance probe frequency in Hz
    #[arg(long)]
    pub grid_start: Option<f64>,

    /// Last resonance probe frequency in Hz
    #[arg(long)]
    pub grid_stop: Option<f64>,

    /// Resonance probe spacing in Hz
    #[arg(long)]
    pub grid_step: Option<f64>,

    /// Spectrogram window length in samples
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Spectrogram window overlap in samples
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Target RT60 in seconds; reports per-band differences
    #[arg(long)]
    pub target_rt60: Option<f64>,

    /// Analyze without peak-normalizing the input
    #[arg(long)]
    pub no_normalize: bool,

    /// Also report RT60 at 250, 1000 and 1750 Hz
    #[arg(long)]
    pub cycle: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    /// Build the analysis configuration: config file (or preset defaults), then flags
    pub fn to_config(&self) -> Result<AnalysisConfig> {
        let preset = self
            .preset
            .as_deref()
            .map(|name| {
                MeasurementPreset::from_name(name).ok_or_else(|| anyhow!("Unknown preset: {}", name))
            })
            .transpose()?;

        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::from_preset(preset.unwrap_or(MeasurementPreset::T20)),
        };

        if let Some(preset) = preset {
            config.preset = preset;
            config.span = preset.span();
        }

        if let Some(order) = self.order {
            config.filter_order = FilterOrder::from_number(order)
                .ok_or_else(|| anyhow!("Unsupported filter order: {} (use 2 or 4)", order))?;
        }

        if let Some(mode) = &self.mode {
            config.decay_mode =
                DecayMode::from_name(mode).ok_or_else(|| anyhow!("Unknown decay mode: {}", mode))?;
        }

        if self.no_resonance {
            config.resonance.enabled = false;
        }

        let grid = config.resonance.grid;
        config.resonance.grid = ProbeGrid {
            start_hz: self.grid_start.unwrap_or(grid.start_hz),
            stop_hz: self.grid_stop.unwrap_or(grid.stop_hz),
            step_hz: self.grid_step.unwrap_or(grid.step_hz),
        };

        if let Some(size) = self.window_size {
            config.spectrogram.window_size = size;
            // Keep the default half overlap unless one was given
            if self.overlap.is_none() {
                config.spectrogram.overlap = size / 2;
            }
        }
        if let Some(overlap) = self.overlap {
            config.spectrogram.overlap = overlap;
        }

        if self.target_rt60.is_some() {
            config.target_rt60 = self.target_rt60;
        }

        if self.no_normalize {
            config.normalize = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GenerateSignal {
    /// Constant sine tone
    Sine {
        /// Output WAV path
        output: PathBuf,
        #[arg(long, default_value_t = 1000.0)]
        frequency: f64,
        #[arg(long, default_value_t = 0.8)]
        amplitude: f32,
        /// Duration in seconds
        #[arg(long, default_value_t = 2.0)]
        duration: f64,
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,
        /// 16, 24 or 32 (float)
        #[arg(long, default_value_t = 16)]
        bits: u16,
    },
    /// Exponentially decaying noise (or tones) with a known RT60
    Decay {
        /// Output WAV path
        output: PathBuf,
        /// Time to reach -60 dB, in seconds
        #[arg(long, default_value_t = 1.2)]
        rt60: f64,
        /// Duration in seconds
        #[arg(long, default_value_t = 2.0)]
        duration: f64,
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,
        /// Noise seed
        #[arg(long, default_value_t = 1)]
        seed: u32,
        /// Comma-separated tone frequencies in Hz instead of noise
        #[arg(long, value_delimiter = ',')]
        tones: Vec<f64>,
        /// 16, 24 or 32 (float)
        #[arg(long, default_value_t = 16)]
        bits: u16,
    },
}
