// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{AnalyzeArgs, Cli, Command, GenerateSignal};
pub use output::{format_json, format_report, format_summary, CycleReading, FileReport};

use anyhow::{bail, Context, Result};
use colorful::Colorful;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::analysis::FrequencyCycle;
use crate::core::decoder::{decode_audio, is_audio_file};
use crate::core::ReverbAnalysisEngine;
use crate::testgen;

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze(args) => run_analyze(&args, cli.verbose),
        Command::Generate { signal } => run_generate(signal),
    }
}

/// Expand inputs into audio files; directories are walked recursively
pub fn collect_audio_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            if is_audio_file(input) {
                files.push(input.clone());
            } else {
                log::warn!("Skipping non-audio file: {}", input.display());
            }
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file() && is_audio_file(p))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            bail!("Input not found: {}", input.display());
        }
    }

    Ok(files)
}

fn run_analyze(args: &AnalyzeArgs, verbose: bool) -> Result<()> {
    let config = args.to_config()?;
    log::debug!("Configuration: {:?}", config);
    let engine = ReverbAnalysisEngine::new(config)?;

    let files = collect_audio_files(&args.inputs)?;
    if files.is_empty() {
        bail!("No audio files found");
    }
    log::info!("Found {} audio file(s)", files.len());

    let pb = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(files.len());
    let mut failed = 0;

    for path in &files {
        match analyze_file(&engine, path, args.cycle) {
            Ok(report) => reports.push(report),
            Err(e) => {
                log::error!("{}: {:#}", path.display(), e);
                failed += 1;
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if args.json {
        println!("{}", format_json(&reports)?);
    } else {
        for report in &reports {
            println!("{}", format_report(report, verbose));
        }
        if files.len() > 1 {
            println!("{}", format_summary(&reports, failed));
        }
    }

    if reports.is_empty() {
        bail!("No file could be analyzed");
    }
    Ok(())
}

fn analyze_file(engine: &ReverbAnalysisEngine, path: &Path, cycle: bool) -> Result<FileReport> {
    let decoded = decode_audio(path)?;
    let report = engine
        .analyze(&decoded.buffer)
        .with_context(|| format!("Analysis failed: {}", path.display()))?;

    let mut readings = Vec::new();
    if cycle {
        let mut state = FrequencyCycle::new();
        for _ in 0..3 {
            readings.push(CycleReading {
                target: state.current(),
                frequency_hz: state.frequency_hz(),
                rt60: engine.cycle_rt60(&decoded.buffer, &state)?,
            });
            state.advance();
        }
    }

    Ok(FileReport {
        file: path.display().to_string(),
        source_channels: decoded.source_channels,
        codec: decoded.codec_name,
        report,
        cycle: readings,
    })
}

fn run_generate(signal: GenerateSignal) -> Result<()> {
    let (output, buffer, bits) = match signal {
        GenerateSignal::Sine {
            output,
            frequency,
            amplitude,
            duration,
            sample_rate,
            bits,
        } => (
            output,
            testgen::sine_wave(frequency, amplitude, duration, sample_rate)?,
            bits,
        ),
        GenerateSignal::Decay {
            output,
            rt60,
            duration,
            sample_rate,
            seed,
            tones,
            bits,
        } => {
            let buffer = if tones.is_empty() {
                testgen::decaying_noise(rt60, duration, sample_rate, seed)?
            } else {
                testgen::decaying_tones(&tones, rt60, duration, sample_rate)?
            };
            (output, buffer, bits)
        }
    };

    testgen::write_wav(&output, &buffer, bits)?;
    println!(
        "Wrote {} samples to {}",
        buffer.len(),
        output.display().to_string().as_str().cyan()
    );
    Ok(())
}
