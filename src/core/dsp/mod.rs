//! Digital Signal Processing utilities

pub mod fft;
pub mod filters;
pub mod windows;

pub use fft::{magnitude_spectrum, MagnitudeSpectrum};
pub use filters::{bandpass, BandpassFilter, FilterOrder};
pub use windows::{create_window, WindowType};

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{ReverbError, Result};

/// Short-time Fourier analyzer producing power frames
pub struct StftAnalyzer {
    fft_size: usize,
    hop_size: usize,
    window: Vec<f64>,
    power_scale: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl StftAnalyzer {
    /// `overlap` is in samples and must be smaller than `fft_size`.
    pub fn new(fft_size: usize, overlap: usize, window_fn: WindowType) -> Result<Self> {
        if fft_size < 2 {
            return Err(ReverbError::InvalidConfig(format!(
                "spectrogram window must be at least 2 samples, got {}",
                fft_size
            )));
        }
        if overlap >= fft_size {
            return Err(ReverbError::InvalidConfig(format!(
                "spectrogram overlap {} must be smaller than window {}",
                overlap, fft_size
            )));
        }

        let window = window_fn.generate(fft_size);
        let window_sum: f64 = window.iter().sum();
        let power_scale = if window_sum > 0.0 {
            1.0 / (window_sum * window_sum)
        } else {
            1.0
        };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            fft_size,
            hop_size: fft_size - overlap,
            window,
            power_scale,
            fft,
        })
    }

    /// Number of frames for a signal of `len` samples.
    ///
    /// A signal shorter than one window still yields a single zero-padded frame.
    pub fn num_frames(&self, len: usize) -> usize {
        len.saturating_sub(self.fft_size) / self.hop_size + 1
    }

    /// Power spectrum `|X[k]|^2` for bins `0..=fft_size/2` of one frame
    pub fn compute_power_spectrum(&self, samples: &[f32]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s as f64 * w, 0.0))
            .collect();

        // Pad if necessary
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.fft_size / 2 + 1]
            .iter()
            .map(|c| c.norm_sqr() * self.power_scale)
            .collect()
    }

    /// Compute power frames for the entire signal
    pub fn compute_spectrogram(&self, samples: &[f32]) -> Vec<Vec<f64>> {
        let num_frames = self.num_frames(samples.len());
        let mut spectrogram = Vec::with_capacity(num_frames);

        for i in 0..num_frames {
            let start = i * self.hop_size;
            let end = (start + self.fft_size).min(samples.len());
            spectrogram.push(self.compute_power_spectrum(&samples[start..end]));
        }

        spectrogram
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }
}

impl WindowType {
    /// Generate window coefficients
    pub fn generate(&self, size: usize) -> Vec<f64> {
        create_window(size, *self)
    }
}
