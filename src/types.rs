use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque session token handed out on prompt upload
pub type SessionId = String;

/// Opaque task token handed out when a batch starts
pub type TaskId = String;

/// An uploaded image file (prompt or essay)
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased extension of the filename, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// A student resolved from an essay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub email: Option<String>,
}

/// One revision suggestion returned by the grader
///
/// The grading backend returns either bare strings or structured sentence
/// rewrites; both shapes are kept so the export can render them differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestion {
    Revision {
        #[serde(default)]
        original_sentence: String,
        #[serde(default)]
        revised_sentence: String,
        #[serde(default)]
        reason: String,
    },
    Text(String),
}

/// Successful grading of a single essay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub score: f64,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_comment: Option<String>,
}

/// Either a grade or the error that prevented one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Grade {
    Graded { grading_result: GradingResult },
    Failed { error: String },
}

impl Grade {
    pub fn score(&self) -> Option<f64> {
        match self {
            Grade::Graded { grading_result } => Some(grading_result.score),
            Grade::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Grade::Graded { .. })
    }
}

/// Per-essay result of one grading attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Position of the essay in upload order
    pub index: usize,
    pub filename: String,
    pub student_name: String,
    pub student_email: Option<String>,
    #[serde(flatten)]
    pub grade: Grade,
    pub email_sent: bool,
}

/// Aggregate counts for a completed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_essays: usize,
    pub successful_grades: usize,
    pub failed_grades: usize,
    pub emails_sent: usize,
    pub average_score: f64,
}

/// Terminal aggregate produced by a completed task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub details: Vec<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Point-in-time view of a batch task, as returned to pollers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub session_id: SessionId,
    pub status: TaskStatus,
    pub progress: u8,
    pub current_step: String,
    pub completed_count: usize,
    pub total_count: usize,
    pub result: Option<Report>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Outbound notification handed to the mailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}
