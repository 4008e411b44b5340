//! Batch Processing Module
//!
//! This module grades the essays of one task:
//! - BatchOrchestrator: drives a task through its states and assembles the report
//! - EssayWorker: turns one essay into one isolated outcome

mod orchestrator;
mod worker;


pub use orchestrator::BatchOrchestrator;
pub use worker::{EssayWorker, UNKNOWN_STUDENT};
