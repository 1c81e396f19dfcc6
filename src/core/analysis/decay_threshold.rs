// src/core/analysis/decay_threshold.rs
//
// Threshold-crossing decay measurement with RT60 extrapolation.
//
// Crossings are searched forward from the curve's peak only. A point before
// the peak, or a "closest level" match elsewhere in the curve, is never used.

use serde::{Deserialize, Serialize};

use crate::core::buffer::DecayCurve;
use crate::error::{ReverbError, Result};

/// dB offsets below the curve peak that bound the measured decay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecaySpan {
    pub start_offset_db: f64,
    pub end_offset_db: f64,
}

impl DecaySpan {
    /// -5 dB to -25 dB, extrapolated x3
    pub const T20: DecaySpan = DecaySpan::new(-5.0, -25.0);
    /// -5 dB to -35 dB, extrapolated x2
    pub const T30: DecaySpan = DecaySpan::new(-5.0, -35.0);
    /// 0 dB to -10 dB, extrapolated x6
    pub const EDT: DecaySpan = DecaySpan::new(0.0, -10.0);

    pub const fn new(start_offset_db: f64, end_offset_db: f64) -> Self {
        Self {
            start_offset_db,
            end_offset_db,
        }
    }

    /// Width of the span in dB
    pub fn width_db(&self) -> f64 {
        (self.end_offset_db - self.start_offset_db).abs()
    }

    /// Factor turning the span's decay time into RT60
    pub fn extrapolation_factor(&self) -> f64 {
        60.0 / self.width_db()
    }

    pub fn validate(&self) -> Result<()> {
        let finite = self.start_offset_db.is_finite() && self.end_offset_db.is_finite();
        if !finite || self.start_offset_db > 0.0 || self.end_offset_db >= self.start_offset_db {
            return Err(ReverbError::InvalidConfig(format!(
                "decay span must satisfy end < start <= 0 dB, got {} / {}",
                self.start_offset_db, self.end_offset_db
            )));
        }
        Ok(())
    }
}

impl Default for DecaySpan {
    fn default() -> Self {
        Self::T20
    }
}

/// Raw crossing data behind an RT60 value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayMeasurement {
    pub peak_index: usize,
    pub peak_db: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub t_start: f64,
    pub t_end: f64,
    /// `t_end - t_start`
    pub span_seconds: f64,
    pub rt60_seconds: f64,
}

/// Finds threshold crossings on a decay curve and derives RT60
#[derive(Debug, Clone, Copy)]
pub struct DecayThresholdLocator {
    span: DecaySpan,
}

impl Default for DecayThresholdLocator {
    fn default() -> Self {
        Self {
            span: DecaySpan::default(),
        }
    }
}

impl DecayThresholdLocator {
    pub fn new(span: DecaySpan) -> Result<Self> {
        span.validate()?;
        Ok(Self { span })
    }

    pub fn span(&self) -> DecaySpan {
        self.span
    }

    /// Measure the decay, or `None` when either threshold is never reached
    /// after the peak.
    pub fn locate(&self, curve: &DecayCurve) -> Option<DecayMeasurement> {
        let (peak_index, peak_db) = curve.peak()?;
        let levels = curve.levels_db();

        let start_threshold = peak_db + self.span.start_offset_db;
        let end_threshold = peak_db + self.span.end_offset_db;

        let start_index = (peak_index..levels.len()).find(|&i| levels[i] <= start_threshold)?;
        let end_index = (start_index..levels.len()).find(|&i| levels[i] <= end_threshold)?;

        let t_start = curve.time_at(start_index);
        let t_end = curve.time_at(end_index);
        let span_seconds = t_end - t_start;

        Some(DecayMeasurement {
            peak_index,
            peak_db,
            start_index,
            end_index,
            t_start,
            t_end,
            span_seconds,
            rt60_seconds: span_seconds * self.span.extrapolation_factor(),
        })
    }

    /// RT60 only
    pub fn rt60(&self, curve: &DecayCurve) -> Option<f64> {
        self.locate(curve).map(|m| m.rt60_seconds)
    }
}
