//! Itinerary solver HTTP client.
//!
//! Single entry point translating a user query (text, finalized waveform,
//! or a direct origin/destination pair) into a [`QueryResult`], hiding
//! which remote endpoint serviced it. Connection-level failures degrade to
//! a failed result so the rendering path stays uniform; everything else in
//! the error taxonomy surfaces as a typed error.

use crate::audio::wav;
use crate::defaults;
use crate::error::{Result, TrainvoxError};
use crate::query::{Itinerary, QueryOutcome, QueryResult};
use crate::solver::types::{
    AudioRequest, ErrorDto, HealthDto, PipelineResponseDto, RouteRequest, RouteResponseDto,
    TextRequest, TranscribeResponseDto,
};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Configuration for the solver client.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Base URL of the solver API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SolverConfig {
    /// Create a new config with the default solver URL.
    pub fn new() -> Self {
        Self {
            base_url: defaults::SOLVER_URL.to_string(),
            timeout_secs: defaults::SOLVER_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Solver availability, from the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverHealth {
    pub available: bool,
    pub stt_loaded: bool,
    pub nlp_loaded: bool,
    pub pathfinding_loaded: bool,
}

impl SolverHealth {
    fn unavailable() -> Self {
        Self {
            available: false,
            stt_loaded: false,
            nlp_loaded: false,
            pathfinding_loaded: false,
        }
    }
}

/// Trait for query submission backends.
///
/// This trait allows swapping implementations (real HTTP solver vs mock).
/// Every entry point returns the same [`QueryResult`] shape; callers never
/// learn which remote endpoint serviced a request.
#[async_trait::async_trait]
pub trait QuerySolver: Send + Sync {
    /// Combined extraction + itinerary resolution for a text query.
    async fn submit_text(&self, text: &str) -> Result<QueryResult>;

    /// Full audio pipeline for an encoded waveform.
    async fn submit_audio(&self, waveform: &[u8]) -> Result<QueryResult>;

    /// Direct itinerary for a known origin/destination pair.
    async fn submit_route(&self, origin: &str, destination: &str) -> Result<QueryResult>;

    /// Transcription only, no extraction or routing.
    async fn transcribe(&self, waveform: &[u8]) -> Result<QueryResult>;

    /// Availability probe.
    async fn health(&self) -> Result<SolverHealth>;
}

/// Solver API client.
#[derive(Debug, Clone)]
pub struct SolverClient {
    http: reqwest::Client,
    base_url: String,
}

impl SolverClient {
    /// Create a new solver client with the given configuration.
    pub fn new(config: SolverConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrainvoxError::Unreachable {
                message: format!("Failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit a text query for combined extraction + itinerary resolution.
    ///
    /// # Errors
    /// `EmptyQuery` for blank input, raised before any network call.
    /// Connection failures are degraded into a failed `QueryResult`, not an
    /// error.
    pub async fn submit_text(&self, text: &str) -> Result<QueryResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }

        match self
            .post_json::<_, PipelineResponseDto>("/api/search", &TextRequest { text })
            .await
        {
            Ok(dto) => dto.into_result(),
            Err(TrainvoxError::Unreachable { .. }) => {
                Ok(QueryResult::failed(text, defaults::UNAVAILABLE_MESSAGE))
            }
            Err(e) => Err(e),
        }
    }

    /// Submit an encoded waveform through the full audio pipeline
    /// (transcription → extraction → itinerary).
    pub async fn submit_audio(&self, waveform: &[u8]) -> Result<QueryResult> {
        if waveform.is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }

        let audio = wav::to_base64(waveform);
        let request = AudioRequest {
            audio: &audio,
            format: defaults::AUDIO_FORMAT,
        };

        match self
            .post_json::<_, PipelineResponseDto>("/api/pipeline", &request)
            .await
        {
            Ok(dto) => dto.into_result(),
            Err(TrainvoxError::Unreachable { .. }) => {
                Ok(QueryResult::failed("", defaults::UNAVAILABLE_MESSAGE))
            }
            Err(e) => Err(e),
        }
    }

    /// Request an itinerary for a known origin/destination pair, bypassing
    /// transcription and extraction.
    ///
    /// The transcript is synthesized deterministically from the pair.
    pub async fn submit_route(&self, origin: &str, destination: &str) -> Result<QueryResult> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }

        let transcript = format!("Trajet de {} à {}", origin, destination);
        let skeleton = |outcome| QueryResult {
            transcript: transcript.clone(),
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            is_valid: true,
            confidence: 1.0,
            outcome,
            stt: None,
            nlp: None,
        };

        let request = RouteRequest {
            origin,
            destination,
        };
        match self
            .post_json::<_, RouteResponseDto>("/api/route", &request)
            .await
        {
            Ok(dto) => {
                let outcome = match (dto.route, dto.error) {
                    (Some(route), _) => QueryOutcome::Resolved(Itinerary::try_from(route)?),
                    (None, Some(message)) => QueryOutcome::Failed(message),
                    (None, None) => QueryOutcome::Incomplete,
                };
                Ok(skeleton(outcome))
            }
            Err(TrainvoxError::Unreachable { .. }) => Ok(skeleton(QueryOutcome::Failed(
                defaults::UNAVAILABLE_MESSAGE.to_string(),
            ))),
            Err(e) => Err(e),
        }
    }

    /// Transcribe a waveform without extraction or routing.
    ///
    /// Normalized to a `QueryResult` whose outcome is `Incomplete`; only
    /// the transcript (and STT metadata) is populated.
    pub async fn transcribe(&self, waveform: &[u8]) -> Result<QueryResult> {
        if waveform.is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }

        let audio = wav::to_base64(waveform);
        let request = AudioRequest {
            audio: &audio,
            format: defaults::AUDIO_FORMAT,
        };

        match self
            .post_json::<_, TranscribeResponseDto>("/api/transcribe", &request)
            .await
        {
            Ok(dto) => Ok(QueryResult {
                transcript: dto.transcript,
                origin: None,
                destination: None,
                is_valid: false,
                confidence: 0.0,
                outcome: QueryOutcome::Incomplete,
                stt: dto.metadata,
                nlp: None,
            }),
            Err(TrainvoxError::Unreachable { .. }) => {
                Ok(QueryResult::failed("", defaults::UNAVAILABLE_MESSAGE))
            }
            Err(e) => Err(e),
        }
    }

    /// Probe solver availability.
    ///
    /// This is the one call that surfaces `Unreachable` as an error, so
    /// callers can distinguish "down" from "up but degraded".
    pub async fn health(&self) -> Result<SolverHealth> {
        let url = format!("{}/api/health", self.base_url);
        let response =
            self.http
                .get(&url)
                .send()
                .await
                .map_err(|e| TrainvoxError::Unreachable {
                    message: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Ok(SolverHealth::unavailable());
        }

        let dto: HealthDto =
            response
                .json()
                .await
                .map_err(|e| TrainvoxError::MalformedResponse {
                    message: e.to_string(),
                })?;

        let loaded = |state: &str| state == "loaded";
        let models = dto.models;
        Ok(SolverHealth {
            available: dto.status == "ok",
            stt_loaded: models.as_ref().is_some_and(|m| loaded(&m.stt)),
            nlp_loaded: models.as_ref().is_some_and(|m| loaded(&m.nlp)),
            pathfinding_loaded: models.as_ref().is_some_and(|m| loaded(&m.pathfinding)),
        })
    }

    /// POST a JSON body and parse the solver's JSON reply.
    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TrainvoxError::Unreachable {
                message: e.to_string(),
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| TrainvoxError::Unreachable {
                message: e.to_string(),
            })?;

        if !content_type.contains("application/json") {
            return Err(TrainvoxError::MalformedResponse {
                message: format!(
                    "unexpected content type {:?}: {}",
                    content_type,
                    truncate(&body)
                ),
            });
        }

        if !status.is_success() {
            // The solver reports structured failures as {"error": "..."};
            // pass the message through verbatim.
            return match serde_json::from_str::<ErrorDto>(&body) {
                Ok(err) => Err(TrainvoxError::Solver { message: err.error }),
                Err(_) => Err(TrainvoxError::MalformedResponse {
                    message: format!(
                        "status {} with unrecognized body: {}",
                        status.as_u16(),
                        truncate(&body)
                    ),
                }),
            };
        }

        serde_json::from_str(&body).map_err(|e| TrainvoxError::MalformedResponse {
            message: format!("{}: {}", e, truncate(&body)),
        })
    }
}

#[async_trait::async_trait]
impl QuerySolver for SolverClient {
    async fn submit_text(&self, text: &str) -> Result<QueryResult> {
        SolverClient::submit_text(self, text).await
    }

    async fn submit_audio(&self, waveform: &[u8]) -> Result<QueryResult> {
        SolverClient::submit_audio(self, waveform).await
    }

    async fn submit_route(&self, origin: &str, destination: &str) -> Result<QueryResult> {
        SolverClient::submit_route(self, origin, destination).await
    }

    async fn transcribe(&self, waveform: &[u8]) -> Result<QueryResult> {
        SolverClient::transcribe(self, waveform).await
    }

    async fn health(&self) -> Result<SolverHealth> {
        SolverClient::health(self).await
    }
}

/// Mock solver for testing
#[derive(Debug, Clone)]
pub struct MockSolver {
    result: QueryResult,
    reachable: bool,
}

impl MockSolver {
    /// Create a mock returning an incomplete result for every query.
    pub fn new() -> Self {
        Self {
            result: QueryResult {
                transcript: "mock transcript".to_string(),
                origin: None,
                destination: None,
                is_valid: false,
                confidence: 0.0,
                outcome: QueryOutcome::Incomplete,
                stt: None,
                nlp: None,
            },
            reachable: true,
        }
    }

    /// Configure the result the mock returns.
    pub fn with_result(mut self, result: QueryResult) -> Self {
        self.result = result;
        self
    }

    /// Configure the mock to behave like an unreachable solver.
    pub fn with_unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    fn respond(&self, transcript_for_degrade: &str) -> Result<QueryResult> {
        if self.reachable {
            Ok(self.result.clone())
        } else {
            Ok(QueryResult::failed(
                transcript_for_degrade,
                defaults::UNAVAILABLE_MESSAGE,
            ))
        }
    }
}

impl Default for MockSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QuerySolver for MockSolver {
    async fn submit_text(&self, text: &str) -> Result<QueryResult> {
        if text.trim().is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }
        self.respond(text)
    }

    async fn submit_audio(&self, waveform: &[u8]) -> Result<QueryResult> {
        if waveform.is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }
        self.respond("")
    }

    async fn submit_route(&self, origin: &str, destination: &str) -> Result<QueryResult> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }
        self.respond(&format!("Trajet de {} à {}", origin, destination))
    }

    async fn transcribe(&self, waveform: &[u8]) -> Result<QueryResult> {
        if waveform.is_empty() {
            return Err(TrainvoxError::EmptyQuery);
        }
        self.respond("")
    }

    async fn health(&self) -> Result<SolverHealth> {
        if self.reachable {
            Ok(SolverHealth {
                available: true,
                stt_loaded: true,
                nlp_loaded: true,
                pathfinding_loaded: true,
            })
        } else {
            Err(TrainvoxError::Unreachable {
                message: "mock solver is unreachable".to_string(),
            })
        }
    }
}

/// Cap body excerpts in error messages.
fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
