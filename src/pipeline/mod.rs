// Batch pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod processing;
pub mod runner;
pub mod storage;

// Re-export key types from each stage
pub use ingestion::InputDocument;
pub use runner::{DocumentEntry, DocumentFailure, DocumentOutcome, Pipeline, RunSummary};
pub use storage::{ArtifactSink, FsSink, InMemorySink};
