//! Microphone capture backend built on cpal.
//!
//! Delivers mono i16 chunks at the configured rate regardless of what the
//! hardware natively speaks: sound servers (PipeWire, PulseAudio) convert
//! transparently, and for raw ALSA devices the conversion (channel mixdown
//! plus linear resampling) happens in the stream callback.

use crate::audio::device::CaptureDevice;
use crate::error::{Result, TrainvoxError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Environment knobs that keep JACK/PipeWire/ALSA probe chatter off the
/// terminal while cpal walks the available backends.
const QUIET_BACKEND_VARS: &[(&str, &str)] = &[
    ("JACK_NO_START_SERVER", "1"),
    ("JACK_NO_AUDIO_RESERVATION", "1"),
    ("PIPEWIRE_DEBUG", "0"),
    ("ALSA_DEBUG", "0"),
    ("PW_LOG", "0"),
];

/// Silence backend probe warnings for the rest of the process.
///
/// # Safety
/// Mutates the environment; must run from `main` before any thread exists.
pub fn suppress_audio_warnings() {
    for (key, value) in QUIET_BACKEND_VARS {
        // SAFETY: single-threaded at startup, per the contract above.
        unsafe { std::env::set_var(key, value) };
    }
}

/// Redirects stderr to /dev/null until dropped.
///
/// cpal's backend probing makes ALSA and JACK print warnings directly to
/// fd 2; the env knobs above don't silence all of them. The guard saves
/// the descriptor with `libc::dup` and restores it on drop, which is sound
/// as long as nothing else rewires fd 2 concurrently.
struct StderrGate {
    saved: libc::c_int,
}

impl StderrGate {
    fn close() -> Self {
        unsafe {
            let saved = libc::dup(2);
            let sink = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
            if saved >= 0 && sink >= 0 {
                libc::dup2(sink, 2);
                libc::close(sink);
            }
            Self { saved }
        }
    }
}

impl Drop for StderrGate {
    fn drop(&mut self) {
        if self.saved >= 0 {
            unsafe {
                libc::dup2(self.saved, 2);
                libc::close(self.saved);
            }
        }
    }
}

fn quietly<R>(f: impl FnOnce() -> R) -> R {
    let _gate = StderrGate::close();
    f()
}

/// Name fragments of devices routed through the desktop sound server.
/// These respect the user's input selection and are preferred over raw
/// hardware nodes.
const SOUND_SERVER_HINTS: &[&str] = &["pipewire", "pulse"];

/// Name fragments of ALSA plumbing that is never a microphone: speaker
/// layouts and digital outputs.
const NON_VOICE_HINTS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "digital output",
    "hdmi",
    "s/pdif",
];

fn routes_via_sound_server(name: &str) -> bool {
    let name = name.to_lowercase();
    SOUND_SERVER_HINTS.iter().any(|hint| name.contains(hint))
}

fn looks_like_voice_input(name: &str) -> bool {
    let name = name.to_lowercase();
    !NON_VOICE_HINTS.iter().any(|hint| name.contains(hint))
}

/// An input device as shown by `trainvox devices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub name: String,
    /// Routed through the desktop sound server; the better pick for voice.
    pub recommended: bool,
}

/// Enumerate usable input devices.
///
/// Speaker-layout and digital-output nodes are dropped; sound-server
/// devices are flagged as recommended.
///
/// # Errors
/// `AudioCapture` when device enumeration itself fails.
pub fn list_devices() -> Result<Vec<DeviceEntry>> {
    let devices = quietly(|| cpal::default_host().input_devices()).map_err(|e| {
        TrainvoxError::AudioCapture {
            message: format!("Could not enumerate input devices: {}", e),
        }
    })?;

    Ok(devices
        .filter_map(|device| device.name().ok())
        .filter(|name| looks_like_voice_input(name))
        .map(|name| {
            let recommended = routes_via_sound_server(&name);
            DeviceEntry { name, recommended }
        })
        .collect())
}

/// Open the named device, or pick the best available one.
///
/// With no name given, a sound-server device wins over the raw default so
/// the desktop's input selection is respected.
fn open_device(requested: Option<&str>) -> Result<cpal::Device> {
    quietly(|| {
        let host = cpal::default_host();

        if let Some(name) = requested {
            let mut devices =
                host.input_devices()
                    .map_err(|e| TrainvoxError::AudioCapture {
                        message: format!("Could not enumerate input devices: {}", e),
                    })?;
            return devices
                .find(|d| d.name().is_ok_and(|n| n == name))
                .ok_or_else(|| TrainvoxError::DeviceUnavailable {
                    device: name.to_string(),
                });
        }

        let via_server = host
            .input_devices()
            .ok()
            .and_then(|mut devices| {
                devices.find(|d| d.name().is_ok_and(|n| routes_via_sound_server(&n)))
            });
        match via_server {
            Some(device) => Ok(device),
            None => host
                .default_input_device()
                .ok_or_else(|| TrainvoxError::DeviceUnavailable {
                    device: "default".to_string(),
                }),
        }
    })
}

/// Sample sink shared with the stream callback thread.
///
/// The callback converts to the target format before appending, so
/// `drain` always hands back mono samples at the target rate.
#[derive(Debug, Default)]
struct SampleSink {
    samples: Mutex<Vec<i16>>,
    callbacks: AtomicU64,
}

impl SampleSink {
    fn ingest(&self, samples: Vec<i16>, channels: usize, rate: u32, target_rate: u32) {
        self.callbacks.fetch_add(1, Ordering::Relaxed);
        let converted = if channels <= 1 && rate == target_rate {
            samples
        } else {
            resample(&downmix(&samples, channels), rate, target_rate)
        };
        if let Ok(mut buffer) = self.samples.lock() {
            buffer.extend_from_slice(&converted);
        }
    }

    fn drain(&self) -> Vec<i16> {
        self.samples
            .lock()
            .map(|mut buffer| std::mem::take(&mut *buffer))
            .unwrap_or_default()
    }

    /// Whether the stream callback has fired at least once.
    fn delivered(&self) -> bool {
        self.callbacks.load(Ordering::Relaxed) > 0
    }
}

/// Average interleaved frames down to one channel.
fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampling between arbitrary rates.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let step = f64::from(from_rate) / f64::from(to_rate);
    let out_len = (samples.len() as f64 / step).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * step;
        let index = pos as usize;
        let fraction = pos - index as f64;
        let here = f64::from(samples[index]);
        let next = samples
            .get(index + 1)
            .map_or(here, |&s| f64::from(s));
        out.push((here + (next - here) * fraction) as i16);
    }
    out
}

fn log_stream_error(err: cpal::StreamError) {
    eprintln!("audio stream error: {}", err);
}

/// cpal streams are not `Send` because some backends pin them to their
/// creation thread. The handle is only touched under `&mut self` of the
/// owning device, which serializes all access.
struct StreamHandle(cpal::Stream);

unsafe impl Send for StreamHandle {}

/// How long to wait for the first callback before concluding a stream is
/// silently broken. Some PipeWire-ALSA combinations accept a non-native
/// config but never deliver data.
const PROBE_WINDOW: Duration = Duration::from_millis(200);

/// Microphone capture through cpal.
///
/// Stream setup tries mono i16 at the target rate first (sound servers
/// convert transparently), then mono f32, then the device's native config
/// with conversion in the callback. The only container it emits is
/// uncompressed PCM WAV.
pub struct CpalCaptureDevice {
    device: cpal::Device,
    stream: Option<StreamHandle>,
    sink: Arc<SampleSink>,
    target_rate: u32,
}

impl CpalCaptureDevice {
    /// Open a capture device.
    ///
    /// # Errors
    /// `DeviceUnavailable` when the named device does not exist (or no
    /// input device is present at all), `AudioCapture` when enumeration
    /// fails.
    pub fn new(device_name: Option<&str>, target_rate: u32) -> Result<Self> {
        Ok(Self {
            device: open_device(device_name)?,
            stream: None,
            sink: Arc::new(SampleSink::default()),
            target_rate,
        })
    }

    /// Callback feeding i16 frames into the sink.
    fn sink_i16(
        &self,
        channels: usize,
        rate: u32,
    ) -> impl FnMut(&[i16], &cpal::InputCallbackInfo) + Send + 'static {
        let sink = Arc::clone(&self.sink);
        let target = self.target_rate;
        move |data, _| sink.ingest(data.to_vec(), channels, rate, target)
    }

    /// Callback quantizing f32 frames before they reach the sink.
    fn sink_f32(
        &self,
        channels: usize,
        rate: u32,
    ) -> impl FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static {
        let sink = Arc::clone(&self.sink);
        let target = self.target_rate;
        move |data, _| {
            let quantized: Vec<i16> = data
                .iter()
                .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
                .collect();
            sink.ingest(quantized, channels, rate, target)
        }
    }

    /// Try mono at the target rate, i16 then f32, then fall back to the
    /// device's native config.
    fn open_stream(&self) -> Result<StreamHandle> {
        let mono = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.target_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        if let Ok(stream) =
            self.device
                .build_input_stream(&mono, self.sink_i16(1, self.target_rate), log_stream_error, None)
        {
            return Ok(StreamHandle(stream));
        }
        if let Ok(stream) =
            self.device
                .build_input_stream(&mono, self.sink_f32(1, self.target_rate), log_stream_error, None)
        {
            return Ok(StreamHandle(stream));
        }

        self.open_native_stream()
    }

    /// Capture at whatever the device natively speaks and convert in the
    /// callback.
    fn open_native_stream(&self) -> Result<StreamHandle> {
        let native =
            self.device
                .default_input_config()
                .map_err(|e| TrainvoxError::AudioCapture {
                    message: format!("Could not query the device's input config: {}", e),
                })?;

        let channels = native.channels() as usize;
        let rate = native.sample_rate().0;
        let config = native.config();

        eprintln!(
            "trainvox: capturing at the device's native format ({}ch, {} Hz, {:?})",
            channels,
            rate,
            native.sample_format(),
        );

        let built = match native.sample_format() {
            cpal::SampleFormat::I16 => self.device.build_input_stream(
                &config,
                self.sink_i16(channels, rate),
                log_stream_error,
                None,
            ),
            cpal::SampleFormat::F32 => self.device.build_input_stream(
                &config,
                self.sink_f32(channels, rate),
                log_stream_error,
                None,
            ),
            other => {
                return Err(TrainvoxError::AudioCapture {
                    message: format!(
                        "Unsupported native sample format {:?}; try --device to pick another input",
                        other
                    ),
                });
            }
        };

        built
            .map(StreamHandle)
            .map_err(|e| TrainvoxError::AudioCapture {
                message: format!("Could not open the native input stream: {}", e),
            })
    }
}

impl CaptureDevice for CpalCaptureDevice {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let handle = self.open_stream()?;
        // Exclusive device access is granted when the stream starts; an OS
        // or portal refusal surfaces here.
        handle
            .0
            .play()
            .map_err(|e| TrainvoxError::PermissionDenied {
                message: format!("Could not start the input stream: {}", e),
            })?;

        // Probe for silently-broken streams before trusting this one.
        std::thread::sleep(PROBE_WINDOW);
        let handle = if self.sink.delivered() {
            handle
        } else {
            drop(handle);
            self.sink.drain();
            let native = self.open_native_stream()?;
            native
                .0
                .play()
                .map_err(|e| TrainvoxError::PermissionDenied {
                    message: format!("Could not start the native input stream: {}", e),
                })?;
            native
        };

        self.stream = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(handle) = self.stream.take() {
            handle.0.pause().map_err(|e| TrainvoxError::AudioCapture {
                message: format!("Could not stop the input stream: {}", e),
            })?;
        }
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Vec<i16>> {
        Ok(self.sink.drain())
    }

    fn sample_rate(&self) -> u32 {
        self.target_rate
    }

    fn channels(&self) -> u16 {
        1
    }

    fn supported_codecs(&self) -> &[&'static str] {
        &["wav"]
    }

    fn default_codec(&self) -> &'static str {
        "wav"
    }
}
