//! Per-essay grading unit
//!
//! One `EssayWorker::process` call turns one essay into one `Outcome`. It
//! never returns an error: every capability failure is folded into the
//! outcome so the rest of the batch is unaffected.

use crate::{
    capability::Capabilities,
    config::BatchConfig,
    error::CapabilityError,
    report::{failure_notice, graded_notice},
    types::{EmailMessage, Grade, GradingResult, Outcome, Student, UploadedImage},
};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Name recorded when the essay's author cannot be resolved
pub const UNKNOWN_STUDENT: &str = "unknown";

#[derive(Clone)]
pub struct EssayWorker {
    capabilities: Capabilities,
    config: Arc<BatchConfig>,
    prompt: Arc<UploadedImage>,
}

impl EssayWorker {
    pub fn new(capabilities: Capabilities, config: Arc<BatchConfig>, prompt: Arc<UploadedImage>) -> Self {
        Self {
            capabilities,
            config,
            prompt,
        }
    }

    pub async fn process(&self, index: usize, essay: UploadedImage) -> Outcome {
        let student = self.resolve_student(&essay).await;
        let student_name = student
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| UNKNOWN_STUDENT.to_string());
        let student_email = student.and_then(|s| s.email);

        let grade = match self.grade(&essay).await {
            Ok(grading_result) => {
                info!("Essay #{} ({}) scored {}", index + 1, essay.filename, grading_result.score);
                Grade::Graded { grading_result }
            }
            Err(err) => {
                warn!("Essay #{} ({}) failed: {}", index + 1, essay.filename, err);
                Grade::Failed {
                    error: err.to_string(),
                }
            }
        };

        let email_sent = match &student_email {
            Some(to) => self.notify(to, &student_name, &grade).await,
            None => false,
        };

        Outcome {
            index,
            filename: essay.filename,
            student_name,
            student_email,
            grade,
            email_sent,
        }
    }

    async fn resolve_student(&self, essay: &UploadedImage) -> Option<Student> {
        match self.capabilities.directory.resolve(essay).await {
            Ok(student) => student,
            Err(err) => {
                warn!("Student lookup for {} failed: {}", essay.filename, err);
                None
            }
        }
    }

    async fn grade(&self, essay: &UploadedImage) -> Result<GradingResult, CapabilityError> {
        let limit = self.config.grading_timeout();
        match timeout(limit, self.capabilities.grader.grade(&self.prompt, essay)).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(limit)),
        }
    }

    /// Send the student their result; `true` only if the mailer accepted it
    async fn notify(&self, to: &str, student_name: &str, grade: &Grade) -> bool {
        let message = match grade {
            Grade::Graded { grading_result } => graded_notice(to, student_name, grading_result),
            Grade::Failed { error } if self.config.notify_on_failure => {
                failure_notice(to, student_name, error)
            }
            Grade::Failed { .. } => return false,
        };
        self.send(message).await
    }

    async fn send(&self, message: EmailMessage) -> bool {
        let limit = self.config.email_timeout();
        match timeout(limit, self.capabilities.mailer.send(&message)).await {
            Ok(Ok(())) => {
                debug!("Notification delivered to {}", message.to);
                true
            }
            Ok(Err(err)) => {
                warn!("Notification to {} failed: {}", message.to, err);
                false
            }
            Err(_) => {
                warn!("Notification to {} timed out after {:?}", message.to, limit);
                false
            }
        }
    }
}
