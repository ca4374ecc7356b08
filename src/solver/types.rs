//! Wire types for the solver API.
//!
//! Field names mirror the solver's JSON exactly; conversion into domain
//! types (with the lon/lat coordinate swap) happens here so the client
//! never leaks wire shapes.

use crate::error::TrainvoxError;
use crate::query::{
    GeoPoint, Itinerary, NlpMetadata, QueryOutcome, QueryResult, Segment, SttMetadata,
    VehicleClass,
};
use serde::{Deserialize, Serialize};

/// Request body for text search (`/api/search`).
#[derive(Debug, Serialize)]
pub struct TextRequest<'a> {
    pub text: &'a str,
}

/// Request body for the audio pipeline (`/api/pipeline`, `/api/transcribe`).
#[derive(Debug, Serialize)]
pub struct AudioRequest<'a> {
    pub audio: &'a str,
    pub format: &'a str,
}

/// Request body for a direct route (`/api/route`).
#[derive(Debug, Serialize)]
pub struct RouteRequest<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
}

/// Error-shaped body the solver returns on non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}

/// Full pipeline response (`/api/search`, `/api/pipeline`).
#[derive(Debug, Deserialize)]
pub struct PipelineResponseDto {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub route: Option<RouteDto>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stt_metadata: Option<SttMetadata>,
    #[serde(default)]
    pub nlp_metadata: Option<NlpMetadata>,
}

/// Direct route response (`/api/route`).
#[derive(Debug, Deserialize)]
pub struct RouteResponseDto {
    #[serde(default)]
    pub route: Option<RouteDto>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transcription-only response (`/api/transcribe`).
#[derive(Debug, Deserialize)]
pub struct TranscribeResponseDto {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub metadata: Option<SttMetadata>,
}

/// Health probe response (`/api/health`).
#[derive(Debug, Deserialize)]
pub struct HealthDto {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub models: Option<ModelsDto>,
}

/// Per-model load state inside the health response.
#[derive(Debug, Deserialize)]
pub struct ModelsDto {
    #[serde(default)]
    pub stt: String,
    #[serde(default)]
    pub nlp: String,
    #[serde(default)]
    pub pathfinding: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteDto {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_distance: f64,
    #[serde(default)]
    pub metadata: RouteMetadataDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteMetadataDto {
    #[serde(default)]
    pub segments: Vec<SegmentDto>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentDto {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub temps_min: f64,
    #[serde(default)]
    pub distance_km: f64,
    pub type_train: VehicleClass,
    #[serde(default)]
    pub geometry: Option<GeometryDto>,
}

/// Track shape for a segment; coordinates are (lon, lat) pairs.
#[derive(Debug, Deserialize)]
pub struct GeometryDto {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl TryFrom<RouteDto> for Itinerary {
    type Error = TrainvoxError;

    fn try_from(dto: RouteDto) -> Result<Self, Self::Error> {
        if dto.steps.len() < 2 {
            return Err(TrainvoxError::MalformedResponse {
                message: format!("route has {} step(s), expected at least 2", dto.steps.len()),
            });
        }

        let hops = dto.steps.len() - 1;
        let segments = dto.metadata.segments;
        if !segments.is_empty() && segments.len() != hops {
            return Err(TrainvoxError::MalformedResponse {
                message: format!(
                    "route has {} hops but {} segments",
                    hops,
                    segments.len()
                ),
            });
        }

        Ok(Itinerary {
            origin: dto.origin,
            destination: dto.destination,
            steps: dto.steps,
            total_time: dto.total_time,
            total_distance: dto.total_distance,
            segments: segments.into_iter().map(Segment::from).collect(),
        })
    }
}

impl From<SegmentDto> for Segment {
    fn from(dto: SegmentDto) -> Self {
        // Wire coordinates come as (lon, lat); flip into GeoPoint order.
        let geometry = dto.geometry.map(|g| {
            g.coordinates
                .iter()
                .map(|c| GeoPoint { lat: c[1], lon: c[0] })
                .collect::<Vec<_>>()
        });

        Segment {
            from: dto.from,
            to: dto.to,
            duration_min: dto.temps_min,
            distance_km: dto.distance_km,
            vehicle_class: dto.type_train,
            geometry,
        }
    }
}

impl PipelineResponseDto {
    /// Normalize into the unified result shape.
    ///
    /// A usable route wins; otherwise a solver-reported error message;
    /// otherwise the query was understood but incomplete.
    pub fn into_result(self) -> Result<QueryResult, TrainvoxError> {
        let outcome = match (self.route, self.error_message) {
            (Some(route), _) if route.steps.len() > 1 => {
                QueryOutcome::Resolved(Itinerary::try_from(route)?)
            }
            (_, Some(message)) => QueryOutcome::Failed(message),
            _ => QueryOutcome::Incomplete,
        };

        Ok(QueryResult {
            transcript: self.transcript,
            origin: self.origin,
            destination: self.destination,
            is_valid: self.is_valid,
            confidence: self.confidence,
            outcome,
            stt: self.stt_metadata,
            nlp: self.nlp_metadata,
        })
    }
}
