//! External Capability Module
//!
//! The engine consumes three collaborators it does not implement:
//! - `Grader`: scores one essay image against the prompt image
//! - `Mailer`: delivers one notification
//! - `StudentDirectory`: resolves an essay to a student
//!
//! Each is a trait object so the orchestrator can be driven by the real
//! adapters in production and by scripted doubles in tests.

mod directory;
mod grader;
mod mailer;

pub use directory::{JsonStudentDirectory, NoDirectory, StudentDirectory};
pub use grader::{Grader, HttpGrader};
pub use mailer::{LogMailer, Mailer};

use std::sync::Arc;

/// Bundle of collaborators handed to every orchestrator run
#[derive(Clone)]
pub struct Capabilities {
    pub grader: Arc<dyn Grader>,
    pub mailer: Arc<dyn Mailer>,
    pub directory: Arc<dyn StudentDirectory>,
}
