//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;

use crate::core::analysis::CycleTarget;
use crate::detection::{AnalysisReport, DecayTarget, Rt60Result};

/// RT60 at one cycle target
#[derive(Debug, Clone, Serialize)]
pub struct CycleReading {
    pub target: CycleTarget,
    pub frequency_hz: f64,
    pub rt60: Rt60Result,
}

/// Everything printed for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub source_channels: usize,
    pub codec: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<CycleReading>,
}

fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3} s", v),
        None => "undefined".to_string(),
    }
}

/// Format one file's report for terminal output
pub fn format_report(file: &FileReport, verbose: bool) -> String {
    let report = &file.report;
    let mut output = String::new();

    output.push_str(&format!("{}\n", file.file.as_str().cyan()));
    output.push_str(&format!(
        "  {} Hz, {:.2} s, {} channel(s) downmixed\n",
        report.sample_rate, report.duration_secs, file.source_channels
    ));

    output.push_str("\n  RT60 by band:\n");
    for band in &report.rt60_by_band {
        let value = format_seconds(band.result.value_seconds);
        let value = if band.result.is_defined() {
            value.as_str().green().to_string()
        } else {
            value.as_str().yellow().to_string()
        };
        let range = match band.result.target {
            DecayTarget::Band(b) => format!("{:.0}-{:.0} Hz", b.low_hz, b.high_hz),
            DecayTarget::Bin { frequency_hz } => format!("{:.0} Hz", frequency_hz),
        };
        output.push_str(&format!("    {:<6} {:>16}  {}", band.label, range, value));
        if let Some(diff) = band.difference_seconds {
            output.push_str(&format!("  ({:+.3} s vs target)", diff));
        }
        output.push('\n');
    }

    for failure in &report.band_errors {
        output.push_str(&format!(
            "    {:<6} {}\n",
            failure.label,
            format!("skipped: {}", failure.reason).as_str().red()
        ));
    }

    output.push_str(&format!(
        "\n  Peak frequency: {:.1} Hz",
        report.peak_frequency.frequency_hz
    ));
    if verbose {
        output.push_str(&format!(
            " (magnitude {:.4}, resolution {:.3} Hz)",
            report.peak_frequency.magnitude, report.peak_frequency.resolution_hz
        ));
    }
    output.push('\n');

    match &report.resonance {
        Some(r) => output.push_str(&format!(
            "  Resonance: {:.0} Hz (RT60 {:.3} s)\n",
            r.frequency_hz, r.rt60_seconds
        )),
        None => output.push_str(&format!("  Resonance: {}\n", "none found".yellow())),
    }

    if !file.cycle.is_empty() {
        output.push_str("\n  Frequency cycle:\n");
        for reading in &file.cycle {
            output.push_str(&format!(
                "    {:<4} {:>6.0} Hz  {}\n",
                reading.target.label(),
                reading.frequency_hz,
                format_seconds(reading.rt60.value_seconds)
            ));
        }
    }

    if verbose {
        output.push_str(&format!(
            "\n  Analyzed at {} ({})\n",
            report.analyzed_at.to_rfc3339(),
            file.codec
        ));
    }

    output
}

/// Format reports as a JSON array
pub fn format_json(files: &[FileReport]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(files)?)
}

/// Format a summary for multiple files
pub fn format_summary(files: &[FileReport], failed: usize) -> String {
    let defined = files.iter().filter(|f| !f.report.all_undefined()).count();
    let mut output = format!("\n{}\n", "Summary:".bold());
    output.push_str(&format!("  {} files analyzed\n", files.len()));
    if defined > 0 {
        output.push_str(&format!(
            "  {}\n",
            format!("✓ {} with a measurable decay", defined).as_str().green()
        ));
    }
    if files.len() > defined {
        output.push_str(&format!(
            "  {}\n",
            format!("? {} with no measurable decay", files.len() - defined)
                .as_str()
                .yellow()
        ));
    }
    if failed > 0 {
        output.push_str(&format!("  {}\n", format!("✗ {} failed", failed).as_str().red()));
    }
    output
}
