use crate::{
    config::UploadConfig,
    error::{GradingError, Result},
    types::{SessionId, TaskId, UploadedImage},
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Uploaded grading material for one batch
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub prompt: UploadedImage,
    /// Essays in upload order
    pub essays: Vec<UploadedImage>,
    pub created_at: DateTime<Utc>,
    /// Task currently running over this session, if any
    pub active_task: Option<TaskId>,
}

/// In-memory session store
///
/// Cheap to clone; all clones share the same map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    limits: Arc<UploadConfig>,
}

impl SessionStore {
    pub fn new(limits: UploadConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limits: Arc::new(limits),
        }
    }

    /// Start a new session from its prompt image
    pub async fn create_session(&self, prompt: Option<UploadedImage>) -> Result<SessionId> {
        let prompt = prompt
            .ok_or_else(|| GradingError::Validation("prompt image is required".to_string()))?;
        self.validate_image(&prompt)?;

        let id = Uuid::new_v4().to_string();
        let session = Session {
            id: id.clone(),
            prompt,
            essays: Vec::new(),
            created_at: Utc::now(),
            active_task: None,
        };

        self.sessions.write().await.insert(id.clone(), session);
        info!("Session {} created", id);
        Ok(id)
    }

    /// Append essays to a session
    ///
    /// Either every file is attached or none is. Returns the session's
    /// total essay count after the append.
    pub async fn attach_essays(
        &self,
        session_id: &str,
        files: Vec<UploadedImage>,
    ) -> Result<usize> {
        if files.is_empty() {
            return Err(GradingError::Validation(
                "at least one essay image is required".to_string(),
            ));
        }
        for file in &files {
            self.validate_image(file)?;
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| GradingError::session_not_found(session_id))?;

        if let Some(task_id) = &session.active_task {
            return Err(GradingError::Conflict(format!(
                "session {session_id} is being processed by task {task_id}"
            )));
        }

        let total = session.essays.len() + files.len();
        if total > self.limits.max_essays {
            return Err(GradingError::Validation(format!(
                "a session holds at most {} essays, got {}",
                self.limits.max_essays, total
            )));
        }

        let added = files.len();
        session.essays.extend(files);
        info!("Session {}: attached {} essays ({} total)", session_id, added, total);
        Ok(total)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| GradingError::session_not_found(session_id))
    }

    pub async fn remove_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            debug!("Session {} removed", session_id);
        }
        removed
    }

    /// Claim a session for a new task
    ///
    /// The checks and the lock happen under one write guard, so two
    /// concurrent starts cannot both succeed.
    pub async fn lock_for_task(&self, session_id: &str, task_id: &str) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| GradingError::session_not_found(session_id))?;

        if session.essays.is_empty() {
            return Err(GradingError::Validation(format!(
                "session {session_id} has no essays to grade"
            )));
        }
        if let Some(active) = &session.active_task {
            return Err(GradingError::Conflict(format!(
                "session {session_id} already has an active task {active}"
            )));
        }

        session.active_task = Some(task_id.to_string());
        Ok(session.clone())
    }

    /// Drop the task lock, if `task_id` still holds it
    pub async fn release(&self, session_id: &str, task_id: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            if session.active_task.as_deref() == Some(task_id) {
                session.active_task = None;
            }
        }
    }

    /// Remove idle sessions older than `ttl`; locked sessions are kept
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.active_task.is_some() || session.created_at > cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn validate_image(&self, file: &UploadedImage) -> Result<()> {
        if file.bytes.is_empty() {
            return Err(GradingError::Validation(format!("file '{}' is empty", file.filename)));
        }

        if let Some(content_type) = &file.content_type {
            if !content_type.starts_with("image/") {
                return Err(GradingError::Validation(format!(
                    "file '{}' is not an image ({content_type})",
                    file.filename
                )));
            }
        }

        let allowed = file
            .extension()
            .is_some_and(|ext| self.limits.allowed_extensions.iter().any(|a| *a == ext));
        if !allowed {
            return Err(GradingError::Validation(format!(
                "file '{}' must be one of: {}",
                file.filename,
                self.limits.allowed_extensions.join(", ")
            )));
        }

        if file.size() > self.limits.max_file_size {
            return Err(GradingError::Validation(format!(
                "file '{}' is {} bytes, limit is {}",
                file.filename,
                file.size(),
                self.limits.max_file_size
            )));
        }

        Ok(())
    }
}
