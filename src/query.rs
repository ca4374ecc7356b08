//! Query result domain types.
//!
//! The unified shape every solver entry point (text, audio, direct route)
//! normalizes into. The outcome is a tagged variant so "itinerary and error
//! at the same time" cannot be represented.

use serde::Deserialize;
use std::fmt;

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Class of train serving a segment.
///
/// Wire values are the operator's brand names; anything unrecognized
/// (new rolling stock, foreign operators) decodes as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum VehicleClass {
    #[serde(rename = "TGV")]
    Express,
    #[serde(rename = "OUIGO")]
    Budget,
    #[serde(rename = "Intercités")]
    Intercity,
    #[serde(rename = "TER")]
    Regional,
    #[serde(other)]
    Other,
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleClass::Express => "Express",
            VehicleClass::Budget => "Budget",
            VehicleClass::Intercity => "Intercity",
            VehicleClass::Regional => "Regional",
            VehicleClass::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

/// One traveled leg of an itinerary.
///
/// Immutable once received from the solver. `geometry` is the detailed
/// track path in (lat, lon) order, when the solver has shape data for
/// the leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: String,
    pub to: String,
    pub duration_min: f64,
    pub distance_km: f64,
    pub vehicle_class: VehicleClass,
    pub geometry: Option<Vec<GeoPoint>>,
}

/// A resolved end-to-end trip: ordered station names plus per-leg segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub origin: String,
    pub destination: String,
    pub steps: Vec<String>,
    pub total_time: f64,
    pub total_distance: f64,
    pub segments: Vec<Segment>,
}

impl Itinerary {
    /// Number of hops (always `steps.len() - 1`).
    pub fn hops(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Check the structural invariants: at least two steps, and segments
    /// (when present) numbering exactly one per hop.
    pub fn is_well_formed(&self) -> bool {
        self.steps.len() >= 2 && (self.segments.is_empty() || self.segments.len() == self.hops())
    }
}

/// Outcome of a query: a resolved itinerary, an unresolved-but-understood
/// query, or a failure message from the solver or the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Resolved(Itinerary),
    Incomplete,
    Failed(String),
}

/// Transcription metadata reported by the solver's speech model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SttMetadata {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub processing_time: f64,
}

/// A named entity the solver's extraction model found in the transcript.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

/// Extraction metadata reported by the solver's language model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NlpMetadata {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub extraction_method: String,
    #[serde(default)]
    pub locations_found: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// The unified result of any query path.
///
/// Owned by whoever submitted the query; one in flight per interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Recognized or synthesized text of the query. May be empty.
    pub transcript: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub is_valid: bool,
    /// Extraction confidence in 0.0–1.0.
    pub confidence: f32,
    pub outcome: QueryOutcome,
    pub stt: Option<SttMetadata>,
    pub nlp: Option<NlpMetadata>,
}

impl QueryResult {
    /// Build a failed result, used when the solver is unreachable or
    /// reported a structured error.
    pub fn failed(transcript: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            origin: None,
            destination: None,
            is_valid: false,
            confidence: 0.0,
            outcome: QueryOutcome::Failed(message.into()),
            stt: None,
            nlp: None,
        }
    }

    /// The resolved itinerary, if any.
    pub fn itinerary(&self) -> Option<&Itinerary> {
        match &self.outcome {
            QueryOutcome::Resolved(itinerary) => Some(itinerary),
            _ => None,
        }
    }

    /// The failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            QueryOutcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}
