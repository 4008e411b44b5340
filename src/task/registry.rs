use crate::{
    batch::BatchOrchestrator,
    capability::Capabilities,
    config::BatchConfig,
    error::{GradingError, Result},
    session::SessionStore,
    task::BatchTask,
    types::{TaskId, TaskSnapshot},
};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Tracks every batch task by id and launches their orchestrators
///
/// All task mutations go through [`TaskRegistry::update`], which applies them
/// under the write lock; status reads clone under the read lock.
#[derive(Clone)]
pub struct TaskRegistry {
    tasks: Arc<RwLock<HashMap<TaskId, BatchTask>>>,
    sessions: SessionStore,
    capabilities: Capabilities,
    batch_config: Arc<BatchConfig>,
}

impl TaskRegistry {
    pub fn new(sessions: SessionStore, capabilities: Capabilities, batch_config: BatchConfig) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            sessions,
            capabilities,
            batch_config: Arc::new(batch_config),
        }
    }

    /// Create a task over `session_id` and start grading in the background
    ///
    /// Returns as soon as the task is registered; no essay has necessarily
    /// been touched yet.
    pub async fn create_task(&self, session_id: &str) -> Result<TaskId> {
        let task_id = Uuid::new_v4().to_string();
        let session = self.sessions.lock_for_task(session_id, &task_id).await?;
        let total = session.essays.len();

        let task = BatchTask::new(task_id.clone(), session_id.to_string(), total);
        self.tasks.write().await.insert(task_id.clone(), task);
        info!("Task {} created for session {} ({} essays)", task_id, session_id, total);

        let orchestrator = BatchOrchestrator::new(
            self.clone(),
            self.sessions.clone(),
            self.capabilities.clone(),
            Arc::clone(&self.batch_config),
        );
        tokio::spawn(orchestrator.run(task_id.clone(), session_id.to_string()));

        Ok(task_id)
    }

    pub async fn get_status(&self, task_id: &str) -> Result<TaskSnapshot> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .map(BatchTask::snapshot)
            .ok_or_else(|| GradingError::task_not_found(task_id))
    }

    pub async fn list_tasks(&self) -> Vec<TaskSnapshot> {
        let mut tasks: Vec<TaskSnapshot> =
            self.tasks.read().await.values().map(BatchTask::snapshot).collect();
        tasks.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        tasks
    }

    /// Apply one state transition atomically
    pub async fn update<F>(&self, task_id: &str, apply: F) -> Result<TaskSnapshot>
    where
        F: FnOnce(&mut BatchTask) -> Result<()>,
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(task_id)
            .ok_or_else(|| GradingError::task_not_found(task_id))?;
        apply(task)?;
        Ok(task.snapshot())
    }

    /// Drop terminal tasks that finished more than `retention` ago
    pub async fn evict_finished(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| match task.finished_at() {
            Some(finished) => finished > cutoff,
            None => true,
        });
        before - tasks.len()
    }
}
