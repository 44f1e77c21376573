//! Server crate for the ShelfRecs recommendation service.
//!
//! This crate contains the orchestrator that sits between a transport layer
//! and the engine: it fetches a catalog snapshot per request, runs the engine
//! off the async runtime and maps outcomes onto `NotFound` / `Internal`.

pub mod orchestrator;

pub use orchestrator::{OrchestratorError, RecommendationOrchestrator};
