// src/core/analysis/spectrogram_decay.rs
//
// Decay curve of a single spectrogram bin.

use serde::{Deserialize, Serialize};

use crate::core::buffer::{power_to_db, AudioBuffer, DecayCurve};
use crate::core::dsp::{StftAnalyzer, WindowType};
use crate::error::Result;

/// Spectrogram geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramSettings {
    /// FFT length in samples
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Samples shared by consecutive frames
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    #[serde(default)]
    pub window: WindowType,
}

fn default_window_size() -> usize {
    1024
}

fn default_overlap() -> usize {
    512
}

impl Default for SpectrogramSettings {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            overlap: default_overlap(),
            window: WindowType::Hann,
        }
    }
}

/// Power frames of one buffer, ready to be sliced at any target frequency
#[derive(Debug, Clone)]
pub struct Spectrogram {
    sample_rate: u32,
    window_size: usize,
    hop_size: usize,
    frames: Vec<Vec<f64>>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.window_size / 2 + 1
    }

    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / self.window_size as f64
    }

    /// The first bin whose center lies strictly above `target_hz`.
    ///
    /// Targets at or beyond the last bin center select the last bin.
    pub fn bin_for(&self, target_hz: f64) -> usize {
        (0..self.num_bins())
            .find(|&bin| self.bin_frequency(bin) > target_hz)
            .unwrap_or(self.num_bins() - 1)
    }

    /// Power of the selected bin across frames, in dB.
    ///
    /// Frame `i` is placed at `i * hop / sample_rate` seconds.
    pub fn decay_curve(&self, target_hz: f64) -> DecayCurve {
        let bin = self.bin_for(target_hz);
        let levels = self.frames.iter().map(|frame| power_to_db(frame[bin])).collect();
        DecayCurve::from_levels(levels, self.hop_size as f64 / self.sample_rate as f64)
    }
}

/// Produces decay curves for narrow frequency bins via a spectrogram
pub struct TimeFrequencyDecaySampler {
    settings: SpectrogramSettings,
    stft: StftAnalyzer,
}

impl TimeFrequencyDecaySampler {
    pub fn new(settings: SpectrogramSettings) -> Result<Self> {
        let stft = StftAnalyzer::new(settings.window_size, settings.overlap, settings.window)?;
        Ok(Self { settings, stft })
    }

    pub fn settings(&self) -> SpectrogramSettings {
        self.settings
    }

    /// Compute the spectrogram once so several targets can share it
    pub fn spectrogram(&self, buffer: &AudioBuffer) -> Spectrogram {
        let frames = self.stft.compute_spectrogram(buffer.samples());
        log::debug!(
            "Spectrogram: {} frames x {} bins (window {}, hop {})",
            frames.len(),
            self.stft.fft_size() / 2 + 1,
            self.stft.fft_size(),
            self.stft.hop_size()
        );

        Spectrogram {
            sample_rate: buffer.sample_rate(),
            window_size: self.stft.fft_size(),
            hop_size: self.stft.hop_size(),
            frames,
        }
    }

    /// Decay curve of the bin selected for `target_hz`
    pub fn sample(&self, buffer: &AudioBuffer, target_hz: f64) -> DecayCurve {
        self.spectrogram(buffer).decay_curve(target_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::DecayThresholdLocator;
    use std::f64::consts::PI;

    fn decaying_tone(freq: f64, rt60: f64, sample_rate: u32, secs: f64) -> AudioBuffer {
        let n = (secs * sample_rate as f64) as usize;
        let samples = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                let envelope = 10f64.powf(-3.0 * t / rt60);
                (envelope * (2.0 * PI * freq * t).sin()) as f32
            })
            .collect();
        AudioBuffer::new(sample_rate, samples).unwrap()
    }

    #[test]
    fn test_bin_selection_is_first_above_target() {
        let sampler = TimeFrequencyDecaySampler::new(SpectrogramSettings::default()).unwrap();
        let buffer = AudioBuffer::new(1024, vec![0.0; 2048]).unwrap();
        let spectrogram = sampler.spectrogram(&buffer);

        // 1 Hz bins
        assert_eq!(spectrogram.bin_for(100.0), 101);
        assert_eq!(spectrogram.bin_for(100.4), 101);
        assert_eq!(spectrogram.bin_for(99.9), 100);
        assert_eq!(spectrogram.bin_for(0.0), 1);
        assert_eq!(spectrogram.bin_for(5000.0), 512);
    }

    #[test]
    fn test_time_axis_uses_hop() {
        let settings = SpectrogramSettings {
            window_size: 256,
            overlap: 192,
            window: WindowType::Hann,
        };
        let sampler = TimeFrequencyDecaySampler::new(settings).unwrap();
        let buffer = AudioBuffer::new(8000, vec![0.0; 8000]).unwrap();
        let curve = sampler.sample(&buffer, 1000.0);

        assert_eq!(curve.len(), (8000 - 256) / 64 + 1);
        assert_eq!(curve.time_at(0), 0.0);
        assert!((curve.time_step() - 0.008).abs() < 1e-12);
        assert!(curve.levels_db().iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_tone_decay_recovered() {
        let buffer = decaying_tone(1000.0, 0.8, 44100, 1.5);
        let sampler = TimeFrequencyDecaySampler::new(SpectrogramSettings::default()).unwrap();
        let curve = sampler.sample(&buffer, 1000.0);

        let rt60 = DecayThresholdLocator::default().rt60(&curve).unwrap();
        assert!((rt60 - 0.8).abs() < 0.08, "rt60 {}", rt60);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = SpectrogramSettings {
            window_size: 512,
            overlap: 512,
            window: WindowType::Hann,
        };
        assert!(TimeFrequencyDecaySampler::new(settings).is_err());
    }
}
