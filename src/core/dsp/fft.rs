//! Whole-buffer real FFT with windowing

use realfft::RealFftPlanner;

use super::windows::{create_window, WindowType};
use crate::error::{ReverbError, Result};

/// Windowed magnitude spectrum of an entire signal.
#[derive(Debug, Clone)]
pub struct MagnitudeSpectrum {
    /// `|X[k]|` for the non-negative frequency bins, normalized by the window sum
    pub magnitudes: Vec<f64>,
    /// Width of one bin in Hz (`sample_rate / n_samples`)
    pub bin_width_hz: f64,
}

impl MagnitudeSpectrum {
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_width_hz
    }
}

/// Compute the magnitude spectrum of `samples` over its full length.
///
/// Only bins `0 .. (n + 1) / 2` are returned: for even `n` the Nyquist bin
/// belongs to the negative half, matching the usual `fftfreq` layout.
pub fn magnitude_spectrum(
    samples: &[f32],
    sample_rate: u32,
    window_type: WindowType,
) -> Result<MagnitudeSpectrum> {
    let n = samples.len();
    if n == 0 {
        return Err(ReverbError::EmptySignal);
    }

    let window = create_window(n, window_type);
    let window_sum: f64 = window.iter().sum();
    let scale = if window_sum > 0.0 { 1.0 / window_sum } else { 1.0 };

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(n);

    let mut input = r2c.make_input_vec();
    for (slot, (&s, &w)) in input.iter_mut().zip(samples.iter().zip(window.iter())) {
        *slot = s as f64 * w;
    }
    let mut output = r2c.make_output_vec();
    r2c.process(&mut input, &mut output)
        .map_err(|e| ReverbError::Transform(e.to_string()))?;

    let magnitudes = output
        .iter()
        .take((n + 1) / 2)
        .map(|c| c.norm() * scale)
        .collect();

    Ok(MagnitudeSpectrum {
        magnitudes,
        bin_width_hz: sample_rate as f64 / n as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bin_layout() {
        let even = magnitude_spectrum(&[0.0; 8], 8000, WindowType::Hann).unwrap();
        assert_eq!(even.magnitudes.len(), 4);
        assert_eq!(even.bin_width_hz, 1000.0);

        let odd = magnitude_spectrum(&[0.0; 9], 9000, WindowType::Hann).unwrap();
        assert_eq!(odd.magnitudes.len(), 5);
    }

    #[test]
    fn test_sine_amplitude_scaling() {
        let n = 4096;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 64.0 * i as f64 / n as f64).sin() as f32)
            .collect();
        let spectrum = magnitude_spectrum(&samples, n as u32, WindowType::Hann).unwrap();
        // Unit sine lands at ~0.5 after window-sum normalization
        assert!((spectrum.magnitudes[64] - 0.5).abs() < 0.01);
    }
}
