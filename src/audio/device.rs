//! Capture device capability interface.
//!
//! Abstracts concrete microphone access so platform backends (cpal, other
//! target runtimes) can be swapped without touching session or pipeline
//! logic.

use crate::defaults;
use crate::error::{Result, TrainvoxError};

/// Trait for audio capture devices.
///
/// This trait allows swapping implementations (real device vs mock).
/// Chunking is driven by the device: `read_chunk` returns whatever samples
/// arrived since the previous call.
pub trait CaptureDevice: Send {
    /// Acquire the device and start capturing.
    ///
    /// # Errors
    /// `PermissionDenied` if the user/OS refuses microphone access,
    /// `DeviceUnavailable` if no input device exists.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing and release the device.
    fn stop(&mut self) -> Result<()>;

    /// Read the samples captured since the last call.
    ///
    /// Returns an empty vector when nothing new has arrived.
    fn read_chunk(&mut self) -> Result<Vec<i16>>;

    /// Sample rate of the delivered chunks in Hz.
    fn sample_rate(&self) -> u32;

    /// Channel count of the delivered chunks.
    fn channels(&self) -> u16;

    /// Codecs this device can emit, in the device's own order.
    fn supported_codecs(&self) -> &[&'static str];

    /// Codec used when no preferred codec is supported.
    fn default_codec(&self) -> &'static str;
}

/// Pick the capture codec for a device.
///
/// Walks the preference-ordered candidate list and returns the first codec
/// the device supports, falling back to the device default.
pub fn negotiate_codec(device: &dyn CaptureDevice) -> &'static str {
    defaults::PREFERRED_CODECS
        .iter()
        .copied()
        .find(|candidate| device.supported_codecs().contains(candidate))
        .unwrap_or_else(|| device.default_codec())
}

/// Mock capture device for testing
#[derive(Debug, Clone)]
pub struct MockCaptureDevice {
    is_started: bool,
    chunks: Vec<Vec<i16>>,
    next_chunk: usize,
    sample_rate: u32,
    channels: u16,
    codecs: Vec<&'static str>,
    fail_start: Option<StartFailure>,
    fail_read: bool,
}

#[derive(Debug, Clone, Copy)]
enum StartFailure {
    PermissionDenied,
    DeviceMissing,
}

impl MockCaptureDevice {
    /// Create a new mock device delivering a single chunk of silence.
    pub fn new() -> Self {
        Self {
            is_started: false,
            chunks: vec![vec![0i16; 160]],
            next_chunk: 0,
            sample_rate: defaults::SAMPLE_RATE,
            channels: 1,
            codecs: vec!["wav"],
            fail_start: None,
            fail_read: false,
        }
    }

    /// Configure the chunks the device will deliver, in order.
    pub fn with_chunks(mut self, chunks: Vec<Vec<i16>>) -> Self {
        self.chunks = chunks;
        self.next_chunk = 0;
        self
    }

    /// Configure the reported sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Configure the supported codec list.
    pub fn with_codecs(mut self, codecs: Vec<&'static str>) -> Self {
        self.codecs = codecs;
        self
    }

    /// Configure `start` to fail as a permission refusal.
    pub fn with_permission_denied(mut self) -> Self {
        self.fail_start = Some(StartFailure::PermissionDenied);
        self
    }

    /// Configure `start` to fail as a missing device.
    pub fn with_device_missing(mut self) -> Self {
        self.fail_start = Some(StartFailure::DeviceMissing);
        self
    }

    /// Configure `read_chunk` to fail.
    pub fn with_read_failure(mut self) -> Self {
        self.fail_read = true;
        self
    }

    /// Check if the device is currently started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDevice for MockCaptureDevice {
    fn start(&mut self) -> Result<()> {
        match self.fail_start {
            Some(StartFailure::PermissionDenied) => Err(TrainvoxError::PermissionDenied {
                message: "mock permission refusal".to_string(),
            }),
            Some(StartFailure::DeviceMissing) => Err(TrainvoxError::DeviceUnavailable {
                device: "mock".to_string(),
            }),
            None => {
                self.is_started = true;
                Ok(())
            }
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Vec<i16>> {
        if self.fail_read {
            return Err(TrainvoxError::AudioCapture {
                message: "mock read failure".to_string(),
            });
        }

        if self.next_chunk >= self.chunks.len() {
            return Ok(Vec::new());
        }

        let chunk = self.chunks[self.next_chunk].clone();
        self.next_chunk += 1;
        Ok(chunk)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn supported_codecs(&self) -> &[&'static str] {
        &self.codecs
    }

    fn default_codec(&self) -> &'static str {
        "wav"
    }
}
