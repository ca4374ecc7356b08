//! Canonical waveform encoding.
//!
//! Converts a finalized capture blob (whatever codec the device produced)
//! into the 16-bit linear PCM container the solver expects: a fixed 44-byte
//! self-describing header followed by raw interleaved samples. The binary
//! layout is a wire contract; tests pin it byte by byte.

use crate::audio::session::AudioBlob;
use crate::defaults;
use crate::error::{Result, TrainvoxError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Cursor;

/// Audio decoded to per-channel floating-point samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    /// One sample array per channel, all the same length.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }
}

/// Trait for audio decoding backends.
///
/// This trait allows swapping implementations (platform pipeline vs mock).
pub trait AudioDecoder: Send + Sync {
    /// Decode a compressed blob into per-channel f32 samples.
    ///
    /// # Errors
    /// `Decode` if the blob cannot be decoded.
    fn decode(&self, blob: &AudioBlob) -> Result<DecodedAudio>;
}

/// Decoder for WAV containers, the capture devices' default codec.
#[derive(Debug, Clone, Default)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, blob: &AudioBlob) -> Result<DecodedAudio> {
        let mut reader = hound::WavReader::new(Cursor::new(&blob.bytes)).map_err(|e| {
            TrainvoxError::Decode {
                message: format!("Failed to parse WAV container: {}", e),
            }
        })?;

        let spec = reader.spec();
        let channel_count = spec.channels.max(1) as usize;

        // Normalize every supported sample format to f32 in [-1.0, 1.0].
        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<_, _>>(),
            (hound::SampleFormat::Int, 32) => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<_, _>>(),
            (hound::SampleFormat::Float, _) => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>(),
            (format, bits) => {
                return Err(TrainvoxError::Decode {
                    message: format!("Unsupported sample format: {:?}/{} bit", format, bits),
                });
            }
        }
        .map_err(|e| TrainvoxError::Decode {
            message: format!("Failed to read samples: {}", e),
        })?;

        let frames = interleaved.len() / channel_count;
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(DecodedAudio {
            sample_rate: spec.sample_rate,
            channels,
        })
    }
}

/// Mock decoder for testing
#[derive(Debug, Clone)]
pub struct MockDecoder {
    audio: DecodedAudio,
    should_fail: bool,
}

impl MockDecoder {
    /// Create a mock returning one channel of silence.
    pub fn new() -> Self {
        Self {
            audio: DecodedAudio {
                sample_rate: defaults::SAMPLE_RATE,
                channels: vec![vec![0.0; 160]],
            },
            should_fail: false,
        }
    }

    /// Configure the decoded audio the mock returns.
    pub fn with_audio(mut self, audio: DecodedAudio) -> Self {
        self.audio = audio;
        self
    }

    /// Configure the mock to fail on decode.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDecoder for MockDecoder {
    fn decode(&self, _blob: &AudioBlob) -> Result<DecodedAudio> {
        if self.should_fail {
            Err(TrainvoxError::Decode {
                message: "mock decode failure".to_string(),
            })
        } else {
            Ok(self.audio.clone())
        }
    }
}

/// Encodes captured audio into the canonical waveform container.
pub struct WaveformEncoder<D: AudioDecoder> {
    decoder: D,
}

impl<D: AudioDecoder> WaveformEncoder<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Decode a capture blob and re-serialize it as canonical 16-bit PCM.
    ///
    /// The result is the fixed 44-byte header followed by interleaved
    /// quantized samples: `44 + frames * channels * 2` bytes in total.
    ///
    /// # Errors
    /// `Decode` when the blob cannot be decoded or has no audio channels.
    pub fn encode(&self, blob: &AudioBlob) -> Result<Vec<u8>> {
        let decoded = self.decoder.decode(blob)?;

        if decoded.channels.is_empty() {
            return Err(TrainvoxError::Decode {
                message: "Decoded audio has no channels".to_string(),
            });
        }
        let frames = decoded.frames();
        if decoded.channels.iter().any(|c| c.len() != frames) {
            return Err(TrainvoxError::Decode {
                message: "Decoded channels have mismatched lengths".to_string(),
            });
        }

        let channel_count = decoded.channels.len() as u16;
        let data_len = frames * decoded.channels.len() * 2;

        let mut bytes = Vec::with_capacity(defaults::WAVEFORM_HEADER_LEN + data_len);
        write_header(
            &mut bytes,
            channel_count,
            decoded.sample_rate,
            data_len as u32,
        );

        // Interleave channel-by-channel within each frame.
        for frame in 0..frames {
            for channel in &decoded.channels {
                let sample = quantize(channel[frame]);
                bytes.extend_from_slice(&sample.to_le_bytes());
            }
        }

        Ok(bytes)
    }
}

/// Quantize a float sample to signed 16-bit PCM.
///
/// Clamps symmetrically to [-1.0, 1.0] and scales negatives by 32768 and
/// positives by 32767, so 1.0 cannot overflow past `i16::MAX`.
fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Write the fixed 44-byte PCM header. All integers little-endian.
fn write_header(out: &mut Vec<u8>, channels: u16, sample_rate: u32, data_len: u32) {
    let byte_rate = sample_rate * channels as u32 * 2;
    let block_align = channels * 2;

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&defaults::BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
}

/// Encode a waveform for JSON transport.
///
/// Plain standard base64 with no data-URI scheme prefix, which is what the
/// solver's `audio` field expects.
pub fn to_base64(waveform: &[u8]) -> String {
    STANDARD.encode(waveform)
}
