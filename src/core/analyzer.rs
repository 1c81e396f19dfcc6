// src/core/analyzer.rs
//
// High-level analysis API with builder pattern.

use chrono::Utc;

use super::analysis::{
    DecayThresholdLocator, EnergyDecayBuilder, FrequencyCycle, ResonanceScanner,
    ScanCancellation, SpectralPeakFinder, TimeFrequencyDecaySampler,
};
use super::buffer::{AudioBuffer, DecayCurve, FrequencyBand};
use super::dsp::BandpassFilter;
use crate::config::{AnalysisConfig, MeasurementPreset};
use crate::detection::{
    AnalysisReport, BandFailure, BandRt60, DecayMethod, DecayTarget, PeakFrequencyResult,
    ProbeResult, ResonanceScanResult, Rt60Result,
};
use crate::error::{ReverbError, Result};

/// Builder for ReverbAnalysisEngine configuration
pub struct EngineBuilder {
    config: AnalysisConfig,
    cancellation: Option<ScanCancellation>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            cancellation: None,
        }
    }

    pub fn preset(mut self, preset: MeasurementPreset) -> Self {
        self.config = AnalysisConfig::from_preset(preset);
        self
    }

    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resonance(mut self, enabled: bool) -> Self {
        self.config.resonance.enabled = enabled;
        self
    }

    pub fn cancellation(mut self, cancellation: ScanCancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn build(self) -> Result<ReverbAnalysisEngine> {
        self.config.validate()?;
        Ok(ReverbAnalysisEngine {
            locator: DecayThresholdLocator::new(self.config.span)?,
            config: self.config,
            cancellation: self.cancellation,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-band RT60, peak frequency and resonance for one buffer
pub struct ReverbAnalysisEngine {
    config: AnalysisConfig,
    locator: DecayThresholdLocator,
    cancellation: Option<ScanCancellation>,
}

impl ReverbAnalysisEngine {
    /// Create engine with custom configuration
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        EngineBuilder::new().config(config).build()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn prepare(&self, buffer: &AudioBuffer) -> AudioBuffer {
        if self.config.normalize {
            buffer.normalized()
        } else {
            buffer.clone()
        }
    }

    /// Run full analysis
    pub fn analyze(&self, buffer: &AudioBuffer) -> Result<AnalysisReport> {
        let prepared = self.prepare(buffer);
        log::info!(
            "Analyzing {:.2}s at {} Hz ({} bands, {:?} decay, span {}..{} dB)",
            prepared.duration_secs(),
            prepared.sample_rate(),
            self.config.bands.len(),
            self.config.decay_mode,
            self.config.span.start_offset_db,
            self.config.span.end_offset_db
        );

        let mut rt60_by_band = Vec::with_capacity(self.config.bands.len());
        let mut band_errors = Vec::new();

        for named in &self.config.bands {
            match self.measure_band(&prepared, named.band()) {
                Ok(result) => {
                    if result.value_seconds.is_none() {
                        log::warn!("Band '{}': decay never crossed both thresholds", named.label);
                    }
                    let difference_seconds = match (result.value_seconds, self.config.target_rt60) {
                        (Some(value), Some(target)) => Some(value - target),
                        _ => None,
                    };
                    rt60_by_band.push(BandRt60 {
                        label: named.label.clone(),
                        result,
                        difference_seconds,
                    });
                }
                Err(e) => {
                    log::warn!("Band '{}' skipped: {}", named.label, e);
                    band_errors.push(BandFailure {
                        label: named.label.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let peak_frequency = self.find_peak(&prepared)?;

        let resonance = if self.config.resonance.enabled {
            self.scan_resonance(&prepared)?
        } else {
            None
        };

        Ok(AnalysisReport {
            sample_rate: prepared.sample_rate(),
            duration_secs: prepared.duration_secs(),
            rt60_by_band,
            band_errors,
            peak_frequency,
            resonance,
            analyzed_at: Utc::now(),
        })
    }

    /// Filtered-band decay curve, as measured for RT60
    pub fn band_decay_curve(&self, buffer: &AudioBuffer, band: FrequencyBand) -> Result<DecayCurve> {
        self.decay_curve_prepared(&self.prepare(buffer), band)
    }

    /// RT60 of one band
    pub fn band_rt60(&self, buffer: &AudioBuffer, band: FrequencyBand) -> Result<Rt60Result> {
        self.measure_band(&self.prepare(buffer), band)
    }

    /// Dominant full-band frequency
    pub fn peak_frequency(&self, buffer: &AudioBuffer) -> Result<PeakFrequencyResult> {
        self.find_peak(&self.prepare(buffer))
    }

    /// Resonance over the configured probe grid, regardless of `resonance.enabled`
    pub fn resonance(&self, buffer: &AudioBuffer) -> Result<Option<ResonanceScanResult>> {
        self.scan_resonance(&self.prepare(buffer))
    }

    /// Per-probe RT60 over the configured grid, probes at or above Nyquist excluded
    pub fn resonance_probes(&self, buffer: &AudioBuffer) -> Result<Vec<ProbeResult>> {
        let grid = self.probe_frequencies(buffer.sample_rate())?;
        if grid.is_empty() {
            return Ok(Vec::new());
        }
        self.scanner()?.scan_probes(&self.prepare(buffer), &grid)
    }

    /// RT60 of the spectrogram bin at the cycle's current target
    pub fn cycle_rt60(&self, buffer: &AudioBuffer, cycle: &FrequencyCycle) -> Result<Rt60Result> {
        self.bin_rt60(buffer, cycle.frequency_hz())
    }

    /// RT60 of the spectrogram bin selected for `target_hz`
    ///
    /// The target must lie inside `(0, nyquist)`.
    pub fn bin_rt60(&self, buffer: &AudioBuffer, target_hz: f64) -> Result<Rt60Result> {
        let nyquist = buffer.nyquist();
        if !(target_hz > 0.0 && target_hz < nyquist) {
            return Err(ReverbError::InvalidGrid(format!(
                "target {} Hz outside (0, {}) Hz",
                target_hz, nyquist
            )));
        }
        let sampler = TimeFrequencyDecaySampler::new(self.config.spectrogram)?;
        let curve = sampler.sample(&self.prepare(buffer), target_hz);
        Ok(Rt60Result {
            value_seconds: self.locator.rt60(&curve),
            method: DecayMethod::SpectrogramSlice,
            target: DecayTarget::Bin { frequency_hz: target_hz },
        })
    }

    fn decay_curve_prepared(&self, prepared: &AudioBuffer, band: FrequencyBand) -> Result<DecayCurve> {
        let filter = BandpassFilter::new(band, prepared.sample_rate(), self.config.filter_order)?;
        let filtered = filter.filter(prepared)?;
        Ok(EnergyDecayBuilder::new(self.config.decay_mode).build(&filtered))
    }

    fn measure_band(&self, prepared: &AudioBuffer, band: FrequencyBand) -> Result<Rt60Result> {
        let curve = self.decay_curve_prepared(prepared, band)?;
        let measurement = self.locator.locate(&curve);

        if let Some(m) = &measurement {
            log::debug!(
                "Band {:.0}-{:.0} Hz: peak {:.1} dB, crossings at {:.3}s / {:.3}s, RT60 {:.3}s",
                band.low_hz,
                band.high_hz,
                m.peak_db,
                m.t_start,
                m.t_end,
                m.rt60_seconds
            );
        }

        Ok(Rt60Result {
            value_seconds: measurement.map(|m| m.rt60_seconds),
            method: DecayMethod::AmplitudeIntegration,
            target: DecayTarget::Band(band),
        })
    }

    fn find_peak(&self, prepared: &AudioBuffer) -> Result<PeakFrequencyResult> {
        SpectralPeakFinder::new(self.config.peak_window).find_peak(prepared)
    }

    fn scanner(&self) -> Result<ResonanceScanner> {
        let sampler = TimeFrequencyDecaySampler::new(self.config.spectrogram)?;
        let scanner = ResonanceScanner::new(sampler, self.locator);
        Ok(match &self.cancellation {
            Some(c) => scanner.with_cancellation(c.clone()),
            None => scanner,
        })
    }

    /// Configured grid restricted to probes below the buffer's Nyquist frequency
    fn probe_frequencies(&self, sample_rate: u32) -> Result<Vec<f64>> {
        let nyquist = sample_rate as f64 / 2.0;
        let mut grid = self.config.resonance.grid.frequencies()?;
        let total = grid.len();
        grid.retain(|&f| f < nyquist);
        if grid.len() < total {
            log::debug!(
                "Dropped {} probe(s) at or above {:.0} Hz Nyquist",
                total - grid.len(),
                nyquist
            );
        }
        Ok(grid)
    }

    fn scan_resonance(&self, prepared: &AudioBuffer) -> Result<Option<ResonanceScanResult>> {
        let grid = self.probe_frequencies(prepared.sample_rate())?;
        if grid.is_empty() {
            log::warn!(
                "No resonance probe below {:.0} Hz Nyquist; scan skipped",
                prepared.nyquist()
            );
            return Ok(None);
        }
        self.scanner()?.scan(prepared, &grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, NamedBand};
    use crate::testgen;

    #[test]
    fn test_silence_is_undefined_everywhere() {
        let engine = ReverbAnalysisEngine::builder().build().unwrap();
        let buffer = AudioBuffer::new(44100, vec![0.0; 22050]).unwrap();
        let report = engine.analyze(&buffer).unwrap();

        assert_eq!(report.rt60_by_band.len(), 3);
        assert!(report.all_undefined());
        assert!(report.band_errors.is_empty());
        assert!(report.resonance.is_none());
        assert!(report.peak_frequency.magnitude.is_finite());
    }

    #[test]
    fn test_invalid_band_does_not_stop_others() {
        let config = ConfigBuilder::new()
            .bands(vec![
                NamedBand::new("ok", 200.0, 2000.0),
                NamedBand::new("reversed", 2000.0, 200.0),
                NamedBand::new("too_high", 3000.0, 5000.0),
            ])
            .resonance(false)
            .build()
            .unwrap();
        let engine = ReverbAnalysisEngine::new(config).unwrap();
        let buffer = AudioBuffer::new(8000, vec![0.0; 8000]).unwrap();
        let report = engine.analyze(&buffer).unwrap();

        assert_eq!(report.rt60_by_band.len(), 1);
        assert_eq!(report.rt60_by_band[0].label, "ok");
        let failed: Vec<_> = report.band_errors.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(failed, vec!["reversed", "too_high"]);
    }

    #[test]
    fn test_band_rt60_reports_invalid_band() {
        let engine = ReverbAnalysisEngine::builder().build().unwrap();
        let buffer = AudioBuffer::new(8000, vec![0.1; 100]).unwrap();
        let err = engine
            .band_rt60(&buffer, FrequencyBand::new(500.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, ReverbError::InvalidBand { .. }));
    }

    #[test]
    fn test_cycle_rt60_uses_current_target() {
        let engine = ReverbAnalysisEngine::builder().resonance(false).build().unwrap();
        let buffer = AudioBuffer::new(44100, vec![0.0; 4096]).unwrap();
        let mut cycle = FrequencyCycle::new();
        cycle.advance();

        let result = engine.cycle_rt60(&buffer, &cycle).unwrap();
        assert_eq!(result.target, DecayTarget::Bin { frequency_hz: 1000.0 });
        assert_eq!(result.method, DecayMethod::SpectrogramSlice);
        assert!(result.value_seconds.is_none());
    }

    #[test]
    fn test_low_sample_rate_keeps_report() {
        let engine = ReverbAnalysisEngine::builder().build().unwrap();
        let buffer = testgen::decaying_noise(0.5, 1.0, 8000, 3).unwrap();
        let report = engine.analyze(&buffer).unwrap();

        // 20-250 and 250-2000 Hz fit under 4 kHz; 2000-20000 Hz does not
        assert_eq!(report.rt60_by_band.len(), 2);
        assert_eq!(report.band_errors.len(), 1);
        assert!(report.peak_frequency.frequency_hz < 4000.0);

        let resonance = report.resonance.expect("no resonance below Nyquist");
        assert!(resonance.frequency_hz < 4000.0);

        let probes = engine.resonance_probes(&buffer).unwrap();
        assert!(probes.iter().all(|p| p.frequency_hz < 4000.0));
        assert_eq!(probes.last().map(|p| p.frequency_hz), Some(3950.0));
    }

    #[test]
    fn test_grid_above_nyquist_skips_scan() {
        let config = ConfigBuilder::new()
            .probe_grid(5000.0, 6000.0, 500.0)
            .build()
            .unwrap();
        let engine = ReverbAnalysisEngine::new(config).unwrap();
        let buffer = testgen::decaying_noise(0.5, 1.0, 8000, 3).unwrap();

        let report = engine.analyze(&buffer).unwrap();
        assert!(report.resonance.is_none());
        assert!(engine.resonance_probes(&buffer).unwrap().is_empty());
    }

    #[test]
    fn test_bin_rt60_rejects_targets_outside_nyquist() {
        let engine = ReverbAnalysisEngine::builder().resonance(false).build().unwrap();
        let buffer = AudioBuffer::new(8000, vec![0.0; 4096]).unwrap();

        for target in [-100.0, 0.0, 4000.0, 6000.0, f64::NAN] {
            assert!(matches!(
                engine.bin_rt60(&buffer, target),
                Err(ReverbError::InvalidGrid(_))
            ));
        }
        assert!(engine.bin_rt60(&buffer, 1750.0).is_ok());
    }
}
