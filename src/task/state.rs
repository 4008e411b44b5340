//! Batch Task State Machine
//!
//! ```text
//! pending ──begin──▶ processing ──complete──▶ completed
//!    │                    │
//!    └──────fail──────────┴──────fail───────▶ failed
//! ```
//!
//! Terminal states are absorbing. Every transition either applies fully or
//! returns an error and leaves the task untouched, so a reader holding the
//! registry lock never sees a half-applied update.

use crate::{
    error::{GradingError, Result},
    types::{Report, SessionId, TaskId, TaskSnapshot, TaskStatus},
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct BatchTask {
    id: TaskId,
    session_id: SessionId,
    status: TaskStatus,
    progress: u8,
    current_step: String,
    completed_count: usize,
    total_count: usize,
    result: Option<Report>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl BatchTask {
    pub fn new(id: TaskId, session_id: SessionId, total_count: usize) -> Self {
        Self {
            id,
            session_id,
            status: TaskStatus::Pending,
            progress: 0,
            current_step: "Queued".to_string(),
            completed_count: 0,
            total_count,
            result: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// pending → processing
    pub fn begin(&mut self) -> Result<()> {
        self.require(TaskStatus::Pending, TaskStatus::Processing)?;
        self.status = TaskStatus::Processing;
        self.current_step = format!("Grading essays (0/{})", self.total_count);
        Ok(())
    }

    /// Count one more essay as attempted and recompute progress
    pub fn record_essay_done(&mut self) -> Result<()> {
        self.require(TaskStatus::Processing, TaskStatus::Processing)?;
        if self.completed_count >= self.total_count {
            return Err(GradingError::InvalidTransition {
                from: self.status,
                to: TaskStatus::Processing,
            });
        }

        self.completed_count += 1;
        let progress = (self.completed_count * 100 / self.total_count) as u8;
        self.progress = self.progress.max(progress);
        self.current_step = format!("Graded {}/{} essays", self.completed_count, self.total_count);
        Ok(())
    }

    /// processing → completed, publishing the report and 100% in one step
    pub fn complete(&mut self, report: Report) -> Result<()> {
        self.require(TaskStatus::Processing, TaskStatus::Completed)?;
        self.status = TaskStatus::Completed;
        self.completed_count = self.total_count;
        self.progress = 100;
        self.current_step = "Completed".to_string();
        self.result = Some(report);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// pending | processing → failed
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(GradingError::InvalidTransition {
                from: self.status,
                to: TaskStatus::Failed,
            });
        }
        self.status = TaskStatus::Failed;
        self.current_step = "Failed".to_string();
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.id.clone(),
            session_id: self.session_id.clone(),
            status: self.status,
            progress: self.progress,
            current_step: self.current_step.clone(),
            completed_count: self.completed_count,
            total_count: self.total_count,
            result: self.result.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }

    fn require(&self, required: TaskStatus, to: TaskStatus) -> Result<()> {
        if self.status != required {
            return Err(GradingError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}
