#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use reverbcheckr::testgen;
use reverbcheckr::AudioBuffer;

pub const SAMPLE_RATE: u32 = 44100;

/// One tone per default band (two in the high band), all on the same envelope
pub const ROOM_TONES: [f64; 4] = [125.0, 1000.0, 4000.0, 8000.0];

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reverbcheckr"))
}

pub fn run_reverbcheckr<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(get_binary_path())
        .args(args)
        .env_remove("REVERBCHECKR_PRESET")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute reverbcheckr")
}

pub fn run_json_analysis(file_path: &Path, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["analyze".to_string(), "--json".to_string()];
    args.extend(extra.iter().map(|s| s.to_string()));
    args.push(file_path.display().to_string());

    let output = run_reverbcheckr(&args);
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output is not valid JSON")
}

/// Room response whose every band decays to -60 dB at `rt60`
pub fn room_response(rt60: f64, duration_secs: f64) -> AudioBuffer {
    testgen::decaying_tones(&ROOM_TONES, rt60, duration_secs, SAMPLE_RATE)
        .expect("Failed to synthesize room response")
}

/// Band-limited check: `actual` within `tolerance` (fractional) of `expected`
pub fn assert_within(actual: Option<f64>, expected: f64, tolerance: f64, what: &str) {
    let value = actual.unwrap_or_else(|| panic!("{}: RT60 undefined", what));
    let low = expected * (1.0 - tolerance);
    let high = expected * (1.0 + tolerance);
    assert!(
        (low..=high).contains(&value),
        "{}: RT60 {:.4} s outside [{:.4}, {:.4}]",
        what,
        value,
        low,
        high
    );
}
