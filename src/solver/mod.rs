//! Remote itinerary solver client.
//!
//! The solver performs speech transcription, place-name extraction, and
//! pathfinding behind an HTTP/JSON API. This module owns the wire types
//! and the client that normalizes every endpoint's response into one
//! [`crate::query::QueryResult`] shape.

pub mod client;
pub mod types;

pub use client::{MockSolver, QuerySolver, SolverClient, SolverConfig, SolverHealth};
