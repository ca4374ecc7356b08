//! Capture session management for one voice query.
//!
//! Owns a capture device for the duration of an utterance and walks the
//! Idle → Recording → Processing lifecycle. At most one session may hold
//! the microphone at a time; the device is released on every exit path
//! (stop, cancel, error, drop).

use crate::audio::device::{CaptureDevice, negotiate_codec};
use crate::defaults;
use crate::error::{Result, TrainvoxError};
use std::io::Cursor;

/// Lifecycle of one voice-query attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Processing,
}

/// A finalized audio capture, tagged with its container/codec.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub codec: &'static str,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBlob {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Manages microphone access and sample accumulation for one utterance.
///
/// The codec is negotiated against the device once, at construction.
pub struct AudioCaptureSession<D: CaptureDevice> {
    device: D,
    state: CaptureState,
    samples: Vec<i16>,
    codec: &'static str,
    last_blob: Option<AudioBlob>,
}

impl<D: CaptureDevice> AudioCaptureSession<D> {
    /// Create a session around a capture device.
    pub fn new(device: D) -> Self {
        let codec = negotiate_codec(&device);
        Self {
            device,
            state: CaptureState::Idle,
            samples: Vec::new(),
            codec,
            last_blob: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Codec negotiated for this session.
    pub fn codec(&self) -> &'static str {
        self.codec
    }

    /// Acquire the microphone and start buffering.
    ///
    /// A duplicate `start()` while already Recording is dropped; repeated
    /// hotkey presses must not restart the utterance.
    ///
    /// # Errors
    /// `PermissionDenied` when access is refused, `DeviceUnavailable` when
    /// no input device exists. On error the session stays Idle.
    pub fn start(&mut self) -> Result<()> {
        if self.state != CaptureState::Idle {
            return Ok(());
        }

        self.samples.clear();
        self.device.start()?;
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Pull pending chunks from the device into the session buffer.
    ///
    /// Call this periodically while Recording. Returns the number of
    /// samples appended. A no-op outside of Recording.
    pub fn poll_chunks(&mut self) -> Result<usize> {
        if self.state != CaptureState::Recording {
            return Ok(0);
        }

        let chunk = match self.device.read_chunk() {
            Ok(chunk) => chunk,
            Err(e) => {
                // Device failure mid-recording: release and go Idle so the
                // user can retry.
                let _ = self.device.stop();
                self.state = CaptureState::Idle;
                return Err(e);
            }
        };
        let appended = chunk.len();
        self.samples.extend_from_slice(&chunk);
        Ok(appended)
    }

    /// Finalize the recording into a single tagged blob.
    ///
    /// Drains remaining chunks, releases the device, and serializes the
    /// buffered samples into the negotiated container. Idempotent: when
    /// already stopped, returns the last finalized blob.
    ///
    /// # Errors
    /// `NoActiveSession` when nothing was ever recorded.
    pub fn stop(&mut self) -> Result<AudioBlob> {
        if self.state != CaptureState::Recording {
            return self.last_blob.clone().ok_or(TrainvoxError::NoActiveSession);
        }

        self.state = CaptureState::Processing;

        // Drain whatever the device still holds before releasing it.
        if let Ok(chunk) = self.device.read_chunk() {
            self.samples.extend_from_slice(&chunk);
        }
        let stop_result = self.device.stop();

        let blob = self.finalize();
        self.samples.clear();
        self.state = CaptureState::Idle;

        // Surface a device release failure only after the blob is safe.
        stop_result?;

        let blob = blob?;
        self.last_blob = Some(blob.clone());
        Ok(blob)
    }

    /// Abort the recording, discarding buffered samples.
    ///
    /// Releases the device and returns to Idle. Never fails.
    pub fn cancel(&mut self) {
        if self.state == CaptureState::Recording {
            let _ = self.device.stop();
        }
        self.samples.clear();
        self.state = CaptureState::Idle;
    }

    /// Serialize the buffered samples into the session's container.
    fn finalize(&self) -> Result<AudioBlob> {
        let sample_rate = self.device.sample_rate();
        let channels = self.device.channels();

        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: defaults::BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(|e| {
                TrainvoxError::AudioCapture {
                    message: format!("Failed to finalize capture container: {}", e),
                }
            })?;
            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| TrainvoxError::AudioCapture {
                        message: format!("Failed to write captured sample: {}", e),
                    })?;
            }
            writer.finalize().map_err(|e| TrainvoxError::AudioCapture {
                message: format!("Failed to finalize capture container: {}", e),
            })?;
        }

        Ok(AudioBlob {
            bytes: cursor.into_inner(),
            codec: self.codec,
            sample_rate,
            channels,
        })
    }
}

impl<D: CaptureDevice> Drop for AudioCaptureSession<D> {
    fn drop(&mut self) {
        if self.state == CaptureState::Recording {
            let _ = self.device.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::device::MockCaptureDevice;

    fn session_with_chunks(chunks: Vec<Vec<i16>>) -> AudioCaptureSession<MockCaptureDevice> {
        AudioCaptureSession::new(MockCaptureDevice::new().with_chunks(chunks))
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = session_with_chunks(vec![]);
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn test_start_transitions_to_recording() {
        let mut session = session_with_chunks(vec![vec![1i16, 2, 3]]);
        session.start().unwrap();
        assert_eq!(session.state(), CaptureState::Recording);
    }

    #[test]
    fn test_duplicate_start_is_dropped() {
        let mut session = session_with_chunks(vec![vec![1i16, 2, 3]]);
        session.start().unwrap();
        session.poll_chunks().unwrap();

        // Second start must not clear the buffered samples or error.
        session.start().unwrap();
        assert_eq!(session.state(), CaptureState::Recording);

        let blob = session.stop().unwrap();
        assert!(!blob.is_empty());
    }

    #[test]
    fn test_start_failure_leaves_session_idle() {
        let mut session =
            AudioCaptureSession::new(MockCaptureDevice::new().with_permission_denied());

        let result = session.start();
        assert!(matches!(
            result,
            Err(TrainvoxError::PermissionDenied { .. })
        ));
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn test_stop_finalizes_wav_blob() {
        let mut session = session_with_chunks(vec![vec![10i16, -10, 20], vec![30i16, -30]]);
        session.start().unwrap();
        session.poll_chunks().unwrap();

        let blob = session.stop().unwrap();

        assert_eq!(session.state(), CaptureState::Idle);
        assert_eq!(blob.codec, "wav");
        assert_eq!(blob.sample_rate, 16000);
        assert_eq!(blob.channels, 1);

        // The blob must be a parseable WAV container with all five samples.
        let reader = hound::WavReader::new(Cursor::new(blob.bytes)).unwrap();
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![10i16, -10, 20, 30, -30]);
    }

    #[test]
    fn test_stop_drains_pending_chunks() {
        // Chunks never polled explicitly; stop must still pick up the first
        // pending one.
        let mut session = session_with_chunks(vec![vec![5i16; 8]]);
        session.start().unwrap();

        let blob = session.stop().unwrap();

        let reader = hound::WavReader::new(Cursor::new(blob.bytes)).unwrap();
        assert_eq!(reader.len(), 8);
    }

    #[test]
    fn test_stop_without_start_is_no_active_session() {
        let mut session = session_with_chunks(vec![]);
        let result = session.stop();
        assert!(matches!(result, Err(TrainvoxError::NoActiveSession)));
    }

    #[test]
    fn test_stop_twice_returns_same_blob() {
        let mut session = session_with_chunks(vec![vec![1i16, 2, 3, 4]]);
        session.start().unwrap();

        let first = session.stop().unwrap();
        let second = session.stop().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_cancel_discards_and_returns_idle() {
        let mut session = session_with_chunks(vec![vec![1i16; 100]]);
        session.start().unwrap();
        session.poll_chunks().unwrap();

        session.cancel();

        assert_eq!(session.state(), CaptureState::Idle);
        // Nothing was finalized, so stop has nothing to return.
        assert!(matches!(
            session.stop(),
            Err(TrainvoxError::NoActiveSession)
        ));
    }

    #[test]
    fn test_cancel_when_idle_is_harmless() {
        let mut session = session_with_chunks(vec![]);
        session.cancel();
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn test_cancel_keeps_previous_finalized_blob() {
        let mut session = session_with_chunks(vec![vec![9i16; 4]]);
        session.start().unwrap();
        let blob = session.stop().unwrap();

        session.cancel();

        assert_eq!(session.stop().unwrap(), blob);
    }

    #[test]
    fn test_read_failure_releases_device() {
        let device = MockCaptureDevice::new().with_read_failure();
        let mut session = AudioCaptureSession::new(device);
        session.start().unwrap();

        let result = session.poll_chunks();

        assert!(matches!(result, Err(TrainvoxError::AudioCapture { .. })));
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn test_session_is_reusable_after_stop() {
        let mut session = session_with_chunks(vec![vec![1i16, 2], vec![3i16, 4]]);
        session.start().unwrap();
        session.stop().unwrap();

        // Second utterance picks up the remaining chunk.
        session.start().unwrap();
        let blob = session.stop().unwrap();

        let reader = hound::WavReader::new(Cursor::new(blob.bytes)).unwrap();
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![3i16, 4]);
    }

    #[test]
    fn test_codec_negotiated_at_construction() {
        let session = AudioCaptureSession::new(
            MockCaptureDevice::new().with_codecs(vec!["wav", "flac"]),
        );
        // "flac" outranks "wav" in the preference list.
        assert_eq!(session.codec(), "flac");
    }

    #[test]
    fn test_empty_recording_still_finalizes() {
        let mut session = session_with_chunks(vec![]);
        session.start().unwrap();

        let blob = session.stop().unwrap();

        // A valid, zero-frame container.
        let reader = hound::WavReader::new(Cursor::new(blob.bytes)).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
