//! Grading Service
//!
//! Process-wide entry point owning the session store and the task registry.
//! Created once in `main` and shared (it is cheap to clone) with the HTTP
//! adapter.

use crate::{
    capability::Capabilities,
    config::Config,
    error::{GradingError, Result},
    report::render_report,
    retention,
    session::SessionStore,
    task::TaskRegistry,
    types::{SessionId, TaskId, TaskSnapshot, TaskStatus, UploadedImage},
};
use chrono::Utc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct GradingService {
    sessions: SessionStore,
    tasks: TaskRegistry,
    config: Config,
}

impl GradingService {
    pub fn new(config: Config, capabilities: Capabilities) -> Self {
        let sessions = SessionStore::new(config.upload.clone());
        let tasks = TaskRegistry::new(sessions.clone(), capabilities, config.batch.clone());
        Self {
            sessions,
            tasks,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub async fn upload_prompt(&self, prompt: Option<UploadedImage>) -> Result<SessionId> {
        self.sessions.create_session(prompt).await
    }

    pub async fn upload_essays(&self, session_id: &str, essays: Vec<UploadedImage>) -> Result<usize> {
        self.sessions.attach_essays(session_id, essays).await
    }

    /// Start grading; returns the task id and its essay count
    pub async fn start_processing(&self, session_id: &str) -> Result<(TaskId, usize)> {
        let task_id = self.tasks.create_task(session_id).await?;
        let snapshot = self.tasks.get_status(&task_id).await?;
        Ok((task_id, snapshot.total_count))
    }

    pub async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot> {
        self.tasks.get_status(task_id).await
    }

    /// Plain-text export of a completed task's report
    pub async fn export_report(&self, task_id: &str) -> Result<String> {
        let snapshot = self.tasks.get_status(task_id).await?;
        match (&snapshot.status, &snapshot.result) {
            (TaskStatus::Completed, Some(report)) => Ok(render_report(report, Utc::now())),
            (status, _) => Err(GradingError::Conflict(format!(
                "task {task_id} has no report (status {status:?})"
            ))),
        }
    }

    pub fn spawn_retention(&self) -> JoinHandle<()> {
        retention::spawn_sweeper(
            self.sessions.clone(),
            self.tasks.clone(),
            self.config.retention.clone(),
        )
    }
}
