//! trainvox - Voice-driven train journey search
//!
//! Captures a travel query as typed text or spoken voice, sends it to a
//! remote itinerary solver, and turns the answer into validated map
//! primitives.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod map;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod solver;
pub mod stations;

// Core traits (capture → encode → submit)
pub use audio::device::CaptureDevice;
pub use audio::session::{AudioBlob, AudioCaptureSession, CaptureState};
pub use audio::wav::{AudioDecoder, WaveformEncoder};

// Pipeline
pub use pipeline::{GenerationCounter, VoiceQueryPipeline};

// Solver
pub use solver::{QuerySolver, SolverClient, SolverConfig, SolverHealth};

// Result shape
pub use query::{Itinerary, QueryOutcome, QueryResult, Segment, VehicleClass};

// Error handling
pub use error::{Result, TrainvoxError};

// Config
pub use config::Config;

/// Crate version, suffixed with the git short hash when the build had one
/// (e.g. `"0.1.0+abc1234"`).
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_matches_build_metadata() {
        let expected = match option_env!("GIT_HASH") {
            Some(hash) if !hash.is_empty() => {
                format!("{}+{}", env!("CARGO_PKG_VERSION"), hash)
            }
            _ => env!("CARGO_PKG_VERSION").to_string(),
        };
        assert_eq!(version_string(), expected);
    }
}
