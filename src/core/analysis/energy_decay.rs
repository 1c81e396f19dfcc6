// src/core/analysis/energy_decay.rs
//
// Energy decay curves in dB, per sample.

use serde::{Deserialize, Serialize};

use crate::core::buffer::{power_to_db, AudioBuffer, DecayCurve, ENERGY_EPSILON};

/// How sample energy is turned into a decay curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// Schroeder backward integration of squared samples
    #[default]
    Schroeder,
    /// Raw squared samples
    Instantaneous,
}

impl DecayMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "schroeder" | "integrated" => Some(Self::Schroeder),
            "instantaneous" | "energy" | "raw" => Some(Self::Instantaneous),
            _ => None,
        }
    }
}

/// Builds a per-sample decay curve from a (usually band-filtered) buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyDecayBuilder {
    mode: DecayMode,
}

impl EnergyDecayBuilder {
    pub fn new(mode: DecayMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DecayMode {
        self.mode
    }

    pub fn build(&self, buffer: &AudioBuffer) -> DecayCurve {
        let time_step = 1.0 / buffer.sample_rate() as f64;
        let levels = match self.mode {
            DecayMode::Instantaneous => instantaneous_levels(buffer.samples()),
            DecayMode::Schroeder => schroeder_levels(buffer.samples()),
        };
        DecayCurve::from_levels(levels, time_step)
    }
}

fn instantaneous_levels(samples: &[f32]) -> Vec<f64> {
    samples
        .iter()
        .map(|&s| power_to_db((s as f64) * (s as f64)))
        .collect()
}

/// Reverse cumulative sum of energy, normalized to its start value.
///
/// The result is non-increasing, so its peak is always the first point.
fn schroeder_levels(samples: &[f32]) -> Vec<f64> {
    let mut edc = Vec::with_capacity(samples.len());
    let mut sum = 0.0f64;
    for &s in samples.iter().rev() {
        sum += (s as f64) * (s as f64);
        edc.push(sum);
    }
    edc.reverse();

    let total = edc.first().copied().unwrap_or(0.0);
    let scale = if total > ENERGY_EPSILON { 1.0 / total } else { 1.0 };

    edc.iter().map(|&e| power_to_db(e * scale)).collect()
}
