// src/core/buffer.rs
//
// Value types shared by every analysis stage: the mono sample buffer,
// frequency bands and decay curves.

use serde::{Deserialize, Serialize};

use crate::error::{ReverbError, Result};

/// Peak magnitude below which a buffer is treated as silent during normalization.
pub const NORMALIZATION_FLOOR: f32 = 1e-10;

/// Added to every energy/power value before taking `10 * log10`.
/// Puts the floor of a decay curve at -100 dB instead of -inf.
pub const ENERGY_EPSILON: f64 = 1e-10;

/// Convert an energy or power value to decibels with the epsilon floor.
#[inline]
pub fn power_to_db(power: f64) -> f64 {
    10.0 * (power + ENERGY_EPSILON).log10()
}

/// Single-channel audio owned by the caller for one analysis call.
///
/// Stages never mutate a buffer; filters and normalization return new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Wrap mono samples. Fails on an empty buffer or a zero sample rate.
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ReverbError::InvalidSampleRate(sample_rate));
        }
        if samples.is_empty() {
            return Err(ReverbError::EmptySignal);
        }
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed buffer; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn peak_amplitude(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    /// Peak-normalize to [-1, 1].
    ///
    /// Buffers whose peak is at or below [`NORMALIZATION_FLOOR`] (including
    /// NaN-free silence) come back as all zeros.
    pub fn normalized(&self) -> AudioBuffer {
        let peak = self.peak_amplitude();
        let samples = if peak > NORMALIZATION_FLOOR {
            self.samples.iter().map(|s| s / peak).collect()
        } else {
            vec![0.0; self.samples.len()]
        };
        AudioBuffer {
            sample_rate: self.sample_rate,
            samples,
        }
    }

    /// Same sample rate, new content. Used by stages that transform samples.
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> AudioBuffer {
        debug_assert_eq!(samples.len(), self.samples.len());
        AudioBuffer {
            sample_rate: self.sample_rate,
            samples,
        }
    }
}

/// A band-limiting range in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Check `0 < low_hz < high_hz < nyquist(sample_rate)`.
    ///
    /// Bounds are never swapped: a reversed band is an error.
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        let nyquist = sample_rate as f64 / 2.0;
        let ordered = self.low_hz.is_finite()
            && self.high_hz.is_finite()
            && self.low_hz > 0.0
            && self.low_hz < self.high_hz
            && self.high_hz < nyquist;

        if ordered {
            Ok(())
        } else {
            Err(ReverbError::InvalidBand {
                low_hz: self.low_hz,
                high_hz: self.high_hz,
                nyquist,
            })
        }
    }

    /// Geometric center frequency.
    pub fn center_hz(&self) -> f64 {
        (self.low_hz * self.high_hz).sqrt()
    }
}

/// Level-over-time trace, one point per sample or per spectrogram frame.
///
/// Times start at 0 and increase by a constant step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayCurve {
    time_step: f64,
    levels_db: Vec<f64>,
}

impl DecayCurve {
    /// Build from dB levels spaced `time_step` seconds apart.
    pub fn from_levels(levels_db: Vec<f64>, time_step: f64) -> Self {
        debug_assert!(time_step > 0.0);
        Self {
            time_step,
            levels_db,
        }
    }

    pub fn len(&self) -> usize {
        self.levels_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels_db.is_empty()
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn levels_db(&self) -> &[f64] {
        &self.levels_db
    }

    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.time_step
    }

    /// `(time_seconds, level_db)` pairs in time order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels_db
            .iter()
            .enumerate()
            .map(move |(i, &level)| (self.time_at(i), level))
    }

    /// Index and level of the first maximum.
    pub fn peak(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &level) in self.levels_db.iter().enumerate() {
            match best {
                Some((_, peak)) if level <= peak => {}
                _ => best = Some((i, level)),
            }
        }
        best
    }
}
