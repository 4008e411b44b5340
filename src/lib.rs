//! This crate implements a batch essay grading service: a teacher uploads a
//! grading prompt and a set of essay scans, starts a background task, polls
//! its progress, and receives a report with one outcome per essay.

pub mod types; // Shared data structures: uploads, outcomes, reports, task snapshots.
pub mod error; // Error taxonomy for engine operations and external capabilities.
pub mod config; // Loads service configuration from TOML.
pub mod capability; // Grading, email and student-directory collaborators.
pub mod session; // In-memory store of uploaded prompts and essays.
pub mod task; // Batch task state machine and registry.
pub mod batch; // Orchestrates grading of one task's essays.
pub mod report; // Report aggregation, text export and notification content.
pub mod retention; // Background eviction of stale sessions and tasks.
pub mod service; // Process-wide facade tying the pieces together.
pub mod api; // HTTP adapter.

#[cfg(test)]
mod testing;

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use error::{CapabilityError, GradingError};
pub use service::GradingService;
