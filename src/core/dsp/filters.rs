//! Band-limiting filters built from cascaded biquad sections

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::core::buffer::{AudioBuffer, FrequencyBand};
use crate::error::Result;

/// Order of the band-pass response on each skirt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOrder {
    /// One high-pass and one low-pass section
    #[default]
    Two,
    /// Two cascaded sections per skirt (4th-order Butterworth)
    Four,
}

impl FilterOrder {
    pub fn from_number(order: u32) -> Option<Self> {
        match order {
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Butterworth section Q values
    fn section_qs(&self) -> &'static [f64] {
        match self {
            FilterOrder::Two => &[FRAC_1_SQRT_2],
            FilterOrder::Four => &[0.541_196_1, 1.306_563],
        }
    }
}

/// Second-order IIR section, transposed direct form II
#[derive(Debug, Clone, Copy, Default)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn from_coefficients(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn lowpass(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * frequency / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b1 = 1.0 - cos_w0;
        Self::from_coefficients(
            b1 / 2.0,
            b1,
            b1 / 2.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        )
    }

    fn highpass(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * frequency / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b0 = (1.0 + cos_w0) / 2.0;
        Self::from_coefficients(
            b0,
            -(1.0 + cos_w0),
            b0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        )
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }
}

/// Causal band-pass filter: high-pass cascade at `low_hz`, then low-pass
/// cascade at `high_hz`.
///
/// The output is a single forward pass and carries the filter's phase delay.
/// Decay timing downstream is measured on exactly this trace.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    band: FrequencyBand,
    order: FilterOrder,
    sample_rate: u32,
    highpass: Vec<Biquad>,
    lowpass: Vec<Biquad>,
}

impl BandpassFilter {
    /// Design a filter for `band` at `sample_rate`.
    ///
    /// Fails with `InvalidBand` unless `0 < low_hz < high_hz < nyquist`.
    pub fn new(band: FrequencyBand, sample_rate: u32, order: FilterOrder) -> Result<Self> {
        band.validate(sample_rate)?;

        let fs = sample_rate as f64;
        let highpass = order
            .section_qs()
            .iter()
            .map(|&q| Biquad::highpass(band.low_hz, q, fs))
            .collect();
        let lowpass = order
            .section_qs()
            .iter()
            .map(|&q| Biquad::lowpass(band.high_hz, q, fs))
            .collect();

        Ok(Self {
            band,
            order,
            sample_rate,
            highpass,
            lowpass,
        })
    }

    pub fn band(&self) -> FrequencyBand {
        self.band
    }

    pub fn order(&self) -> FilterOrder {
        self.order
    }

    /// Filter a whole buffer from rest. The input is left untouched.
    pub fn filter(&self, buffer: &AudioBuffer) -> Result<AudioBuffer> {
        if buffer.sample_rate() != self.sample_rate {
            // Design is rate-specific; re-derive for the buffer's rate.
            return Self::new(self.band, buffer.sample_rate(), self.order)?.filter(buffer);
        }

        let mut highpass = self.highpass.clone();
        let mut lowpass = self.lowpass.clone();

        let output = buffer
            .samples()
            .iter()
            .map(|&s| {
                let mut sample = s as f64;
                for section in highpass.iter_mut().chain(lowpass.iter_mut()) {
                    sample = section.process(sample);
                }
                sample as f32
            })
            .collect();

        Ok(buffer.with_samples(output))
    }
}

/// Design and apply in one step.
pub fn bandpass(buffer: &AudioBuffer, band: FrequencyBand, order: FilterOrder) -> Result<AudioBuffer> {
    BandpassFilter::new(band, buffer.sample_rate(), order)?.filter(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReverbError;

    fn sine(freq: f64, sample_rate: u32, len: usize) -> AudioBuffer {
        let samples = (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect();
        AudioBuffer::new(sample_rate, samples).unwrap()
    }

    fn rms(samples: &[f32]) -> f64 {
        (samples.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_reversed_band_rejected() {
        let err = BandpassFilter::new(FrequencyBand::new(2000.0, 250.0), 44100, FilterOrder::Two)
            .unwrap_err();
        assert!(matches!(err, ReverbError::InvalidBand { low_hz, high_hz, .. }
            if low_hz == 2000.0 && high_hz == 250.0));
    }

    #[test]
    fn test_equal_bounds_and_nyquist_rejected() {
        assert!(BandpassFilter::new(FrequencyBand::new(500.0, 500.0), 44100, FilterOrder::Two).is_err());
        assert!(BandpassFilter::new(FrequencyBand::new(500.0, 22050.0), 44100, FilterOrder::Four).is_err());
        assert!(BandpassFilter::new(FrequencyBand::new(-10.0, 200.0), 44100, FilterOrder::Two).is_err());
    }

    #[test]
    fn test_passband_and_stopband() {
        let band = FrequencyBand::new(250.0, 2000.0);
        let in_band = bandpass(&sine(700.0, 44100, 44100), band, FilterOrder::Four).unwrap();
        let below = bandpass(&sine(40.0, 44100, 44100), band, FilterOrder::Four).unwrap();
        let above = bandpass(&sine(12000.0, 44100, 44100), band, FilterOrder::Four).unwrap();

        // Skip the start-up transient
        let tail = 4410..;
        let pass = rms(&in_band.samples()[tail.clone()]);
        assert!(pass > 0.6, "passband rms {}", pass);
        assert!(rms(&below.samples()[tail.clone()]) < pass * 0.05);
        assert!(rms(&above.samples()[tail]) < pass * 0.05);
    }

    #[test]
    fn test_filter_is_causal() {
        // Silence followed by an impulse: nothing may appear before the impulse
        let mut samples = vec![0.0f32; 1000];
        samples[500] = 1.0;
        let buffer = AudioBuffer::new(8000, samples).unwrap();
        let out = bandpass(&buffer, FrequencyBand::new(100.0, 1000.0), FilterOrder::Two).unwrap();

        assert!(out.samples()[..500].iter().all(|&s| s == 0.0));
        assert!(out.samples()[500..].iter().any(|&s| s != 0.0));
        assert_eq!(out.len(), buffer.len());
    }
}
