//! Task Module
//!
//! This module tracks asynchronous batch tasks:
//! - BatchTask: the per-task state machine and its snapshot
//! - TaskRegistry: creates tasks, launches their orchestrators, serves status reads

mod registry;
mod state;


pub use registry::TaskRegistry;
pub use state::BatchTask;
