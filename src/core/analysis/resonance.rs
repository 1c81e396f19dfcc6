// src/core/analysis/resonance.rs
//
// Resonance search: the probe frequency with the longest spectrogram-slice decay.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::decay_threshold::DecayThresholdLocator;
use super::spectrogram_decay::TimeFrequencyDecaySampler;
use crate::core::buffer::AudioBuffer;
use crate::detection::{ProbeResult, ResonanceScanResult};
use crate::error::{ReverbError, Result};

/// Evenly spaced probe frequencies, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeGrid {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub step_hz: f64,
}

impl Default for ProbeGrid {
    fn default() -> Self {
        Self {
            start_hz: 50.0,
            stop_hz: 5000.0,
            step_hz: 50.0,
        }
    }
}

impl ProbeGrid {
    pub fn frequencies(&self) -> Result<Vec<f64>> {
        let ordered = self.start_hz.is_finite()
            && self.stop_hz.is_finite()
            && self.step_hz.is_finite()
            && self.start_hz > 0.0
            && self.step_hz > 0.0
            && self.stop_hz >= self.start_hz;
        if !ordered {
            return Err(ReverbError::InvalidGrid(format!(
                "start {} Hz, stop {} Hz, step {} Hz",
                self.start_hz, self.stop_hz, self.step_hz
            )));
        }

        // Small slack so 50..=5000 step 50 keeps its last point
        let count = ((self.stop_hz - self.start_hz) / self.step_hz + 1e-9).floor() as usize + 1;
        Ok((0..count)
            .map(|i| self.start_hz + i as f64 * self.step_hz)
            .collect())
    }
}

/// Shared flag for stopping a scan between probes
#[derive(Debug, Clone, Default)]
pub struct ScanCancellation {
    cancelled: Arc<AtomicBool>,
}

impl ScanCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs the spectrogram-slice decay measurement over a probe grid
pub struct ResonanceScanner {
    sampler: TimeFrequencyDecaySampler,
    locator: DecayThresholdLocator,
    cancellation: Option<ScanCancellation>,
}

impl ResonanceScanner {
    pub fn new(sampler: TimeFrequencyDecaySampler, locator: DecayThresholdLocator) -> Self {
        Self {
            sampler,
            locator,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, cancellation: ScanCancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Grid must be non-empty, strictly ascending and inside `(0, nyquist)`.
    fn validate_grid(grid: &[f64], sample_rate: u32) -> Result<()> {
        let nyquist = sample_rate as f64 / 2.0;
        if grid.is_empty() {
            return Err(ReverbError::InvalidGrid("no probe frequencies".to_string()));
        }
        if let Some(&f) = grid.iter().find(|&&f| !(f > 0.0 && f < nyquist)) {
            return Err(ReverbError::InvalidGrid(format!(
                "probe {} Hz outside (0, {}) Hz",
                f, nyquist
            )));
        }
        if grid.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ReverbError::InvalidGrid(
                "probe frequencies must be strictly ascending".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-probe RT60 in grid order. Undefined decays stay `None`.
    pub fn scan_probes(&self, buffer: &AudioBuffer, grid: &[f64]) -> Result<Vec<ProbeResult>> {
        Self::validate_grid(grid, buffer.sample_rate())?;

        let spectrogram = self.sampler.spectrogram(buffer);

        grid.par_iter()
            .map(|&frequency_hz| {
                if self.cancellation.as_ref().is_some_and(|c| c.is_cancelled()) {
                    return Err(ReverbError::Cancelled);
                }
                let curve = spectrogram.decay_curve(frequency_hz);
                Ok(ProbeResult {
                    frequency_hz,
                    rt60_seconds: self.locator.rt60(&curve),
                })
            })
            .collect()
    }

    /// Probe with the longest defined RT60, lowest frequency on ties.
    ///
    /// `None` when no probe produced a defined decay.
    pub fn scan(&self, buffer: &AudioBuffer, grid: &[f64]) -> Result<Option<ResonanceScanResult>> {
        let probes = self.scan_probes(buffer, grid)?;
        let best = strongest_probe(&probes);

        match &best {
            Some(best) => log::info!(
                "Resonance at {:.0} Hz (RT60 {:.3} s) over {} probes",
                best.frequency_hz,
                best.rt60_seconds,
                probes.len()
            ),
            None => log::warn!("No probe produced a measurable decay"),
        }

        Ok(best)
    }
}

fn strongest_probe(probes: &[ProbeResult]) -> Option<ResonanceScanResult> {
    let mut best: Option<ResonanceScanResult> = None;
    for probe in probes {
        let Some(rt60) = probe.rt60_seconds else {
            continue;
        };
        if best.as_ref().map_or(true, |b| rt60 > b.rt60_seconds) {
            best = Some(ResonanceScanResult {
                frequency_hz: probe.frequency_hz,
                rt60_seconds: rt60,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::SpectrogramSettings;

    fn scanner() -> ResonanceScanner {
        ResonanceScanner::new(
            TimeFrequencyDecaySampler::new(SpectrogramSettings::default()).unwrap(),
            DecayThresholdLocator::default(),
        )
    }

    #[test]
    fn test_default_grid() {
        let grid = ProbeGrid::default().frequencies().unwrap();
        assert_eq!(grid.len(), 100);
        assert_eq!(grid[0], 50.0);
        assert_eq!(grid[99], 5000.0);
    }

    #[test]
    fn test_bad_grids() {
        assert!(ProbeGrid { start_hz: 0.0, stop_hz: 100.0, step_hz: 10.0 }.frequencies().is_err());
        assert!(ProbeGrid { start_hz: 100.0, stop_hz: 50.0, step_hz: 10.0 }.frequencies().is_err());
        assert!(ProbeGrid { start_hz: 50.0, stop_hz: 100.0, step_hz: 0.0 }.frequencies().is_err());

        let buffer = AudioBuffer::new(8000, vec![0.0; 4096]).unwrap();
        let s = scanner();
        assert!(matches!(s.scan(&buffer, &[]), Err(ReverbError::InvalidGrid(_))));
        assert!(matches!(s.scan(&buffer, &[500.0, 400.0]), Err(ReverbError::InvalidGrid(_))));
        assert!(matches!(s.scan(&buffer, &[500.0, 4000.0]), Err(ReverbError::InvalidGrid(_))));
    }

    #[test]
    fn test_undefined_probes_skipped() {
        let probes = vec![
            ProbeResult { frequency_hz: 100.0, rt60_seconds: None },
            ProbeResult { frequency_hz: 200.0, rt60_seconds: Some(0.4) },
            ProbeResult { frequency_hz: 300.0, rt60_seconds: Some(0.9) },
            ProbeResult { frequency_hz: 400.0, rt60_seconds: Some(0.9) },
        ];
        let best = strongest_probe(&probes).unwrap();
        assert_eq!(best.frequency_hz, 300.0);
        assert_eq!(best.rt60_seconds, 0.9);

        assert!(strongest_probe(&probes[..1]).is_none());
    }

    #[test]
    fn test_silence_has_no_resonance() {
        let buffer = AudioBuffer::new(8000, vec![0.0; 8000]).unwrap();
        let result = scanner().scan(&buffer, &[100.0, 500.0, 1000.0]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_cancelled_scan() {
        let cancellation = ScanCancellation::new();
        cancellation.cancel();
        let s = scanner().with_cancellation(cancellation);
        let buffer = AudioBuffer::new(8000, vec![0.1; 8000]).unwrap();
        assert!(matches!(s.scan(&buffer, &[100.0, 200.0]), Err(ReverbError::Cancelled)));
    }
}
