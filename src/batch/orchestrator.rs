//! Batch Orchestrator Module
//!
//! Drives one batch task from pending to a terminal state.
//!
//! # Flow
//! 1. Mark the task processing before any essay is touched
//! 2. Read the session (an unreadable session is the only batch-wide fault)
//! 3. Spawn one `EssayWorker` unit per essay, at most
//!    `max_concurrent_gradings` running at once
//! 4. Publish progress as each essay finishes, in whatever order they finish
//! 5. Join the units in upload order and build the report
//! 6. Publish completed (or failed) and release the session lock

use crate::{
    batch::{EssayWorker, UNKNOWN_STUDENT},
    capability::Capabilities,
    config::BatchConfig,
    error::{GradingError, Result},
    report::build_report,
    session::SessionStore,
    task::TaskRegistry,
    types::{Grade, Outcome, Report, SessionId, TaskId},
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub struct BatchOrchestrator {
    registry: TaskRegistry,
    sessions: SessionStore,
    capabilities: Capabilities,
    config: Arc<BatchConfig>,
}

impl BatchOrchestrator {
    pub fn new(
        registry: TaskRegistry,
        sessions: SessionStore,
        capabilities: Capabilities,
        config: Arc<BatchConfig>,
    ) -> Self {
        Self {
            registry,
            sessions,
            capabilities,
            config,
        }
    }

    /// Run the task to a terminal state
    ///
    /// Spawned by the registry; nothing awaits it, so every error ends up on
    /// the task itself.
    pub async fn run(self, task_id: TaskId, session_id: SessionId) {
        if let Err(e) = self.registry.update(&task_id, |task| task.begin()).await {
            error!("Task {} could not start: {}", task_id, e);
            self.sessions.release(&session_id, &task_id).await;
            return;
        }
        info!("Task {} processing session {}", task_id, session_id);

        let published = match self.process(&task_id, &session_id).await {
            Ok(report) => {
                info!(
                    "Task {} completed: {}/{} graded, average {}",
                    task_id,
                    report.summary.successful_grades,
                    report.summary.total_essays,
                    report.summary.average_score
                );
                self.registry.update(&task_id, |task| task.complete(report)).await
            }
            Err(err) => {
                error!("Task {} failed: {}", task_id, err);
                let message = err.to_string();
                self.registry.update(&task_id, |task| task.fail(message)).await
            }
        };
        if let Err(e) = published {
            warn!("Task {} final state not recorded: {}", task_id, e);
        }

        self.sessions.release(&session_id, &task_id).await;
    }

    async fn process(&self, task_id: &str, session_id: &str) -> Result<Report> {
        let session = self.sessions.get_session(session_id).await.map_err(|e| {
            GradingError::BatchFault(format!("session {session_id} is no longer readable: {e}"))
        })?;

        let total = session.essays.len();
        let worker = EssayWorker::new(
            self.capabilities.clone(),
            Arc::clone(&self.config),
            Arc::new(session.prompt),
        );
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_gradings.max(1)));

        let mut handles = Vec::with_capacity(total);
        for (index, essay) in session.essays.into_iter().enumerate() {
            let filename = essay.filename.clone();
            let worker = worker.clone();
            let semaphore = Arc::clone(&semaphore);
            let registry = self.registry.clone();
            let task_id = task_id.to_string();

            let handle = tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only waits
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = worker.process(index, essay).await;
                publish_progress(&registry, &task_id).await;
                outcome
            });
            handles.push((index, filename, handle));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, filename, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_error) => {
                    // The unit died before publishing; account for it here
                    error!("Essay #{} ({}) worker aborted: {}", index + 1, filename, join_error);
                    publish_progress(&self.registry, task_id).await;
                    outcomes.push(aborted_outcome(index, filename, &join_error.to_string()));
                }
            }
        }

        Ok(build_report(outcomes))
    }
}

async fn publish_progress(registry: &TaskRegistry, task_id: &str) {
    if let Err(e) = registry.update(task_id, |task| task.record_essay_done()).await {
        warn!("Task {} progress not recorded: {}", task_id, e);
    }
}

fn aborted_outcome(index: usize, filename: String, reason: &str) -> Outcome {
    Outcome {
        index,
        filename,
        student_name: UNKNOWN_STUDENT.to_string(),
        student_email: None,
        grade: Grade::Failed {
            error: format!("grading worker aborted: {reason}"),
        },
        email_sent: false,
    }
}
