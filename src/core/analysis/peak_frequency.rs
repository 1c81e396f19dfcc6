// src/core/analysis/peak_frequency.rs
//
// Dominant frequency of the full-band signal from a single windowed FFT.

use crate::core::buffer::AudioBuffer;
use crate::core::dsp::{magnitude_spectrum, WindowType};
use crate::detection::PeakFrequencyResult;
use crate::error::Result;

/// Windowed-FFT peak detector.
///
/// Precision is one bin, `sample_rate / n_samples` Hz; the reported
/// frequency is always an exact bin center.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralPeakFinder {
    window: WindowType,
}

impl SpectralPeakFinder {
    pub fn new(window: WindowType) -> Self {
        Self { window }
    }

    pub fn find_peak(&self, buffer: &AudioBuffer) -> Result<PeakFrequencyResult> {
        let spectrum = magnitude_spectrum(buffer.samples(), buffer.sample_rate(), self.window)?;

        // First maximum wins on ties; an all-zero spectrum reports bin 0
        let (bin, magnitude) = spectrum
            .magnitudes
            .iter()
            .enumerate()
            .fold((0usize, f64::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });

        let result = PeakFrequencyResult {
            frequency_hz: spectrum.bin_frequency(bin),
            magnitude: magnitude.max(0.0),
            resolution_hz: spectrum.bin_width_hz,
        };

        log::debug!(
            "Peak frequency {:.2} Hz (bin {}, resolution {:.3} Hz)",
            result.frequency_hz,
            bin,
            result.resolution_hz
        );

        Ok(result)
    }
}
