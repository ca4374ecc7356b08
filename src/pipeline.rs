//! Voice query pipeline implementation.
//!
//! Orchestrates the complete voice-to-itinerary flow:
//! record → encode → submit
//!
//! Within one interaction the three phases are strictly sequential: the
//! session enforces at most one Recording state, and the waveform is only
//! encoded once capture has been finalized. Overlapping *interactions* are
//! handled with a generation counter: each submission takes a ticket, and
//! results whose ticket has been superseded must be discarded instead of
//! applied to stale state.

use crate::audio::device::CaptureDevice;
use crate::audio::session::{AudioCaptureSession, CaptureState};
use crate::audio::wav::{AudioDecoder, WaveformEncoder};
use crate::error::Result;
use crate::query::QueryResult;
use crate::solver::QuerySolver;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic ticket dispenser for query supersession.
///
/// `begin` hands out a new generation and makes every earlier one stale;
/// `is_current` tells a completion handler whether its result may still be
/// applied.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query generation, superseding all earlier ones.
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a generation is still the latest.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::SeqCst) == generation
    }
}

/// One capture → encode → submit pipeline around a device, a decoder, and
/// a solver backend.
pub struct VoiceQueryPipeline<D: CaptureDevice, A: AudioDecoder, S: QuerySolver> {
    session: AudioCaptureSession<D>,
    encoder: WaveformEncoder<A>,
    client: S,
    generation: GenerationCounter,
}

impl<D: CaptureDevice, A: AudioDecoder, S: QuerySolver> VoiceQueryPipeline<D, A, S> {
    pub fn new(device: D, decoder: A, client: S) -> Self {
        Self {
            session: AudioCaptureSession::new(device),
            encoder: WaveformEncoder::new(decoder),
            client,
            generation: GenerationCounter::new(),
        }
    }

    /// Current capture state.
    pub fn capture_state(&self) -> CaptureState {
        self.session.state()
    }

    /// Take a ticket for a new interaction, superseding in-flight ones.
    pub fn begin(&self) -> u64 {
        self.generation.begin()
    }

    /// Whether a ticket is still the latest interaction.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.is_current(generation)
    }

    /// Start recording an utterance.
    pub fn start_capture(&mut self) -> Result<()> {
        self.session.start()
    }

    /// Pump pending device chunks into the session buffer.
    pub fn poll_capture(&mut self) -> Result<usize> {
        self.session.poll_chunks()
    }

    /// Abort the current utterance.
    pub fn cancel_capture(&mut self) {
        self.session.cancel();
    }

    /// Finalize the utterance, encode it, and submit it to the solver.
    ///
    /// Capture, encoding, and submission run strictly in sequence; there is
    /// no overlap within one interaction.
    pub async fn finish(&mut self) -> Result<QueryResult> {
        let blob = self.session.stop()?;
        let waveform = self.encoder.encode(&blob)?;
        self.client.submit_audio(&waveform).await
    }

    /// Finalize and encode the utterance, but only ask for a transcript.
    pub async fn finish_transcribe(&mut self) -> Result<QueryResult> {
        let blob = self.session.stop()?;
        let waveform = self.encoder.encode(&blob)?;
        self.client.transcribe(&waveform).await
    }
}
