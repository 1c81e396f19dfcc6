mod test_utils;

use reverbcheckr::core::analysis::SpectralPeakFinder;
use reverbcheckr::core::dsp::BandpassFilter;
use reverbcheckr::testgen;
use reverbcheckr::{
    AudioBuffer, ConfigBuilder, FrequencyBand, MeasurementPreset, ReverbAnalysisEngine,
    ReverbError,
};
use test_utils::*;

fn engine() -> ReverbAnalysisEngine {
    ReverbAnalysisEngine::builder()
        .resonance(false)
        .build()
        .unwrap()
}

#[test]
fn test_silence_never_produces_nan() {
    let engine = engine();
    let silence = AudioBuffer::new(SAMPLE_RATE, vec![0.0; SAMPLE_RATE as usize]).unwrap();

    let report = engine.analyze(&silence).unwrap();
    assert_eq!(report.rt60_by_band.len(), 3);
    assert!(report.all_undefined());

    for band in &report.rt60_by_band {
        let curve = engine
            .band_decay_curve(&silence, band_of(&band.result))
            .unwrap();
        assert!(curve.levels_db().iter().all(|v| v.is_finite()));
    }
}

fn band_of(result: &reverbcheckr::Rt60Result) -> FrequencyBand {
    match result.target {
        reverbcheckr::detection::DecayTarget::Band(band) => band,
        other => panic!("expected a band target, got {:?}", other),
    }
}

#[test]
fn test_decaying_noise_within_ten_percent() {
    let engine = engine();
    let band = FrequencyBand::new(100.0, 15000.0);

    for (rt60, seed) in [(0.6, 3), (1.0, 11), (1.5, 29)] {
        let noise = testgen::decaying_noise(rt60, rt60 * 1.6, SAMPLE_RATE, seed).unwrap();
        let result = engine.band_rt60(&noise, band).unwrap();
        assert_within(result.value_seconds, rt60, 0.10, &format!("noise T={}", rt60));
    }
}

#[test]
fn test_faster_decay_gives_shorter_rt60() {
    let engine = engine();
    let band = FrequencyBand::new(100.0, 15000.0);

    let slow = testgen::decaying_noise(1.6, 2.5, SAMPLE_RATE, 5).unwrap();
    let fast = testgen::decaying_noise(0.8, 2.5, SAMPLE_RATE, 5).unwrap();

    let slow_rt60 = engine.band_rt60(&slow, band).unwrap().value_seconds.unwrap();
    let fast_rt60 = engine.band_rt60(&fast, band).unwrap().value_seconds.unwrap();
    assert!(
        fast_rt60 < slow_rt60,
        "fast {:.3} s should be shorter than slow {:.3} s",
        fast_rt60,
        slow_rt60
    );
}

#[test]
fn test_room_response_all_bands() {
    let engine = engine();
    let room = room_response(1.2, 2.0);
    let report = engine.analyze(&room).unwrap();

    for label in ["low", "mid", "high"] {
        let result = report.rt60(label).unwrap();
        assert_within(result.value_seconds, 1.2, 0.10, label);
    }
    assert!(report.band_errors.is_empty());
    assert!((report.duration_secs - 2.0).abs() < 1e-3);
}

#[test]
fn test_presets_agree_on_clean_decay() {
    let room = room_response(1.2, 2.5);

    for preset in MeasurementPreset::all() {
        let engine = ReverbAnalysisEngine::builder()
            .preset(preset)
            .resonance(false)
            .build()
            .unwrap();
        let report = engine.analyze(&room).unwrap();
        assert_within(
            report.rt60("mid").unwrap().value_seconds,
            1.2,
            0.10,
            &format!("{:?} mid", preset),
        );
    }
}

#[test]
fn test_target_difference() {
    let config = ConfigBuilder::new()
        .resonance(false)
        .target_rt60(Some(1.0))
        .build()
        .unwrap();
    let engine = ReverbAnalysisEngine::new(config).unwrap();
    let report = engine.analyze(&room_response(1.2, 2.0)).unwrap();

    for band in &report.rt60_by_band {
        let value = band.result.value_seconds.unwrap();
        let diff = band.difference_seconds.unwrap();
        assert!((diff - (value - 1.0)).abs() < 1e-12);
    }
}

#[test]
fn test_sine_peak_within_one_bin() {
    let finder = SpectralPeakFinder::default();

    for freq in [220.0, 1000.0, 3517.0] {
        let tone = testgen::sine_wave(freq, 0.7, 1.0, SAMPLE_RATE).unwrap();
        let peak = finder.find_peak(&tone).unwrap();
        let bin_width = SAMPLE_RATE as f64 / tone.len() as f64;
        assert!(
            (peak.frequency_hz - freq).abs() <= bin_width,
            "peak {} Hz for a {} Hz tone",
            peak.frequency_hz,
            freq
        );
    }
}

#[test]
fn test_reversed_band_is_rejected() {
    let band = FrequencyBand::new(2000.0, 250.0);
    let err = BandpassFilter::new(band, SAMPLE_RATE, Default::default()).unwrap_err();
    assert!(matches!(err, ReverbError::InvalidBand { low_hz, high_hz, .. }
        if low_hz == 2000.0 && high_hz == 250.0));

    let equal = FrequencyBand::new(500.0, 500.0);
    assert!(BandpassFilter::new(equal, SAMPLE_RATE, Default::default()).is_err());
}

#[test]
fn test_empty_buffer_is_rejected() {
    assert!(matches!(
        AudioBuffer::new(SAMPLE_RATE, Vec::new()),
        Err(ReverbError::EmptySignal)
    ));
}
