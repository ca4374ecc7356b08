//! Shared default constants.

/// Default audio sample rate in Hz.
///
/// 16 kHz is what speech models expect; capturing higher only adds bytes
/// the solver resamples away.
pub const SAMPLE_RATE: u32 = 16000;

/// Bit depth of the canonical waveform payload.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Size of the fixed waveform container header in bytes.
pub const WAVEFORM_HEADER_LEN: usize = 44;

/// Capture codecs in preference order.
///
/// The session picks the first codec its device supports; if none match,
/// the device's own default codec is used.
pub const PREFERRED_CODECS: &[&str] = &["opus", "flac", "wav"];

/// Audio format tag sent alongside base64 waveforms.
pub const AUDIO_FORMAT: &str = "wav";

/// Default base URL of the itinerary solver API.
pub const SOLVER_URL: &str = "http://localhost:8000";

/// Default solver request timeout in seconds.
pub const SOLVER_TIMEOUT_SECS: u64 = 30;

/// Message shown when the solver cannot be reached.
///
/// Unreachability is degraded to a failed query result rather than an error,
/// so the rendering path stays uniform.
pub const UNAVAILABLE_MESSAGE: &str = "service unavailable";

/// Minimum number of coordinate points for a segment geometry to be drawn
/// as a line. Segments below this still contribute endpoint markers.
pub const MIN_GEOMETRY_POINTS: usize = 10;
