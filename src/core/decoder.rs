// src/core/decoder.rs
//
// Ingestion adapter: decode a file with Symphonia and downmix to the mono
// buffer the engine consumes. Source files are only read, never rewritten.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::buffer::AudioBuffer;

/// Extensions accepted when collecting input files
pub const AUDIO_EXTENSIONS: [&str; 6] = ["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// Decoded file plus what the report needs to know about its source
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub buffer: AudioBuffer,
    /// Channel count before downmixing
    pub source_channels: usize,
    pub codec_name: String,
}

/// Decode an audio file to a mono buffer
pub fn decode_audio(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe file format - may be corrupted or unsupported")?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No supported audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("File does not specify sample rate")?;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    if channels == 0 {
        bail!("File reports 0 audio channels");
    }
    let codec_name = format!("{:?}", track.codec_params.codec);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder for audio codec")?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let needed = decoded.capacity() as u64;
        let reuse = sample_buf
            .as_ref()
            .is_some_and(|b| b.capacity() as u64 >= needed * channels as u64);
        if !reuse {
            sample_buf = Some(SampleBuffer::new(needed, *decoded.spec()));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            downmix_into(buf.samples(), channels, &mut mono);
        }
    }

    if mono.is_empty() {
        bail!("No audio samples decoded from file");
    }

    let buffer = AudioBuffer::new(sample_rate, mono)?;
    log::info!(
        "Decoded {}: {} samples, {} Hz, {} channel(s), {:.2}s",
        path.display(),
        buffer.len(),
        sample_rate,
        channels,
        buffer.duration_secs()
    );

    Ok(DecodedAudio {
        buffer,
        source_channels: channels,
        codec_name,
    })
}

/// Average interleaved frames into mono, appending to `out`
pub fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// True when the path has one of [`AUDIO_EXTENSIONS`]
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
