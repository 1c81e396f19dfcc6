// src/testgen/mod.rs
//
// Synthetic signal generation for ReverbCheckr.
// Sine tones, exponentially decaying "room responses" and WAV export,
// used by the `generate` subcommand and by the test suites.

use anyhow::{bail, Context};
use std::f64::consts::PI;
use std::path::Path;

use crate::core::buffer::AudioBuffer;
use crate::error::{ReverbError, Result};

/// ln(1000): an amplitude envelope `exp(-DECAY_60DB * t / rt60)` is at -60 dB at `t = rt60`
pub const DECAY_60DB: f64 = 6.907_755_278_982_137;

/// Seeded white-noise source (xorshift32)
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    state: u32,
}

impl NoiseGenerator {
    pub fn new(seed: u32) -> Self {
        // xorshift never leaves the all-zero state
        Self {
            state: if seed == 0 { 0x1234_5678 } else { seed },
        }
    }

    /// Next sample, uniform in [-1, 1]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
    }
}

/// Amplitude of an exponential decay that reaches -60 dB at `rt60` seconds
pub fn decay_envelope(t: f64, rt60: f64) -> f64 {
    (-DECAY_60DB * t / rt60).exp()
}

fn sample_count(duration_secs: f64, sample_rate: u32) -> usize {
    (duration_secs.max(0.0) * sample_rate as f64).round() as usize
}

fn check_rt60(rt60: f64) -> Result<()> {
    if rt60.is_finite() && rt60 > 0.0 {
        Ok(())
    } else {
        Err(ReverbError::InvalidConfig(format!("RT60 must be positive, got {}", rt60)))
    }
}

/// Constant-amplitude sine
pub fn sine_wave(
    frequency_hz: f64,
    amplitude: f32,
    duration_secs: f64,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    let n = sample_count(duration_secs, sample_rate);
    let sr = sample_rate as f64;
    let samples = (0..n)
        .map(|i| amplitude * (2.0 * PI * frequency_hz * i as f64 / sr).sin() as f32)
        .collect();
    AudioBuffer::new(sample_rate, samples)
}

/// White noise under an exponential envelope reaching -60 dB at `rt60`
pub fn decaying_noise(rt60: f64, duration_secs: f64, sample_rate: u32, seed: u32) -> Result<AudioBuffer> {
    check_rt60(rt60)?;
    let mut noise = NoiseGenerator::new(seed);
    let sr = sample_rate as f64;
    let samples = (0..sample_count(duration_secs, sample_rate))
        .map(|i| noise.next_sample() * decay_envelope(i as f64 / sr, rt60) as f32)
        .collect();
    AudioBuffer::new(sample_rate, samples)
}

/// Sum of sines, each decaying with its own RT60, scaled so the sum stays within [-1, 1]
pub fn decaying_partials(partials: &[(f64, f64)], duration_secs: f64, sample_rate: u32) -> Result<AudioBuffer> {
    if partials.is_empty() {
        return Err(ReverbError::EmptySignal);
    }
    for &(_, rt60) in partials {
        check_rt60(rt60)?;
    }

    let sr = sample_rate as f64;
    let gain = 1.0 / partials.len() as f64;
    let samples = (0..sample_count(duration_secs, sample_rate))
        .map(|i| {
            let t = i as f64 / sr;
            let sum: f64 = partials
                .iter()
                .map(|&(freq, rt60)| (2.0 * PI * freq * t).sin() * decay_envelope(t, rt60))
                .sum();
            (sum * gain) as f32
        })
        .collect();
    AudioBuffer::new(sample_rate, samples)
}

/// Sum of sines sharing one decay envelope
pub fn decaying_tones(frequencies: &[f64], rt60: f64, duration_secs: f64, sample_rate: u32) -> Result<AudioBuffer> {
    let partials: Vec<(f64, f64)> = frequencies.iter().map(|&f| (f, rt60)).collect();
    decaying_partials(&partials, duration_secs, sample_rate)
}

/// Write a mono WAV: 32 bits is float, 16 or 24 bits is integer PCM
pub fn write_wav(path: &Path, buffer: &AudioBuffer, bits_per_sample: u16) -> anyhow::Result<()> {
    let sample_format = match bits_per_sample {
        32 => hound::SampleFormat::Float,
        16 | 24 => hound::SampleFormat::Int,
        other => bail!("Unsupported bit depth: {} (use 16, 24 or 32)", other),
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
        sample_format,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    if sample_format == hound::SampleFormat::Float {
        for &sample in buffer.samples() {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for &sample in buffer.samples() {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    log::info!(
        "Wrote {} samples ({}-bit) to {}",
        buffer.len(),
        bits_per_sample,
        path.display()
    );
    Ok(())
}
