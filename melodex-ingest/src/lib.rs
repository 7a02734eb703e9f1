//! melodex-ingest library interface
//!
//! Turns NDJSON track feeds into the normalized melodex schema:
//! key folding and field parsing, per-batch seed extraction, chunked
//! persistence, and the phase-ordered batch orchestrator.

pub mod db;
pub mod extract;
pub mod model;
pub mod ndjson;
pub mod normalize;
pub mod pipeline;
