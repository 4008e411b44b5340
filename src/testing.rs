//! Scripted capability doubles shared by the test modules

use crate::{
    capability::{Capabilities, Grader, Mailer, StudentDirectory},
    config::BatchConfig,
    error::{CapabilityError, GradingError},
    task::TaskRegistry,
    types::{EmailMessage, GradingResult, Student, Suggestion, TaskSnapshot, UploadedImage},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn png(name: &str) -> UploadedImage {
    UploadedImage::new(name, Some("image/png".to_string()), vec![0x89, b'P', b'N', b'G'])
}

pub fn graded(score: f64) -> GradingResult {
    GradingResult {
        score,
        suggestions: vec![Suggestion::Text("Vary your sentence openings.".to_string())],
        strengths: Some("clear thesis".to_string()),
        weaknesses: None,
        summary_comment: None,
    }
}

/// Sequential, short timeouts
pub fn batch_config() -> BatchConfig {
    BatchConfig {
        max_concurrent_gradings: 1,
        grading_timeout_ms: 2_000,
        email_timeout_ms: 500,
        notify_on_failure: false,
    }
}

pub enum Script {
    Score(f64),
    Fail(&'static str),
    /// Wait for the gate to open, then score
    Gated(Arc<Notify>, f64),
    /// Sleep, then score
    Delayed(Duration, f64),
    /// Panic inside the grading call
    Panic,
}

/// Grader answering per essay filename; unscripted essays score 75
#[derive(Default)]
pub struct ScriptedGrader {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filename: &str, script: Script) -> Self {
        self.scripts.insert(filename.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Grader for ScriptedGrader {
    async fn grade(
        &self,
        _prompt: &UploadedImage,
        essay: &UploadedImage,
    ) -> Result<GradingResult, CapabilityError> {
        self.calls.lock().unwrap().push(essay.filename.clone());
        match self.scripts.get(&essay.filename) {
            None => Ok(graded(75.0)),
            Some(Script::Score(score)) => Ok(graded(*score)),
            Some(Script::Fail(reason)) => Err(CapabilityError::Unavailable(reason.to_string())),
            Some(Script::Gated(gate, score)) => {
                gate.notified().await;
                Ok(graded(*score))
            }
            Some(Script::Delayed(delay, score)) => {
                tokio::time::sleep(*delay).await;
                Ok(graded(*score))
            }
            Some(Script::Panic) => panic!("grader exploded on {}", essay.filename),
        }
    }
}

/// Mailer that records deliveries and refuses listed recipients
#[derive(Default)]
pub struct RecordingMailer {
    refuse: HashSet<String>,
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn refusing(addresses: &[&str]) -> Self {
        Self {
            refuse: addresses.iter().map(|a| a.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), CapabilityError> {
        if self.refuse.contains(&message.to) {
            return Err(CapabilityError::Rejected(format!("mailbox {} unavailable", message.to)));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Directory resolving `<name>.png` to `<name>@school.test`; `broken*` files error out
#[derive(Default)]
pub struct FilenameDirectory;

#[async_trait]
impl StudentDirectory for FilenameDirectory {
    async fn resolve(&self, essay: &UploadedImage) -> Result<Option<Student>, CapabilityError> {
        let stem = essay.filename.trim_end_matches(".png");
        if stem.starts_with("broken") {
            return Err(CapabilityError::Unavailable("directory offline".to_string()));
        }
        if stem.starts_with("anon") {
            return Ok(None);
        }
        Ok(Some(Student {
            name: stem.to_string(),
            email: Some(format!("{stem}@school.test")),
        }))
    }
}

pub fn capabilities(grader: Arc<ScriptedGrader>, mailer: Arc<RecordingMailer>) -> Capabilities {
    Capabilities {
        grader,
        mailer,
        directory: Arc::new(FilenameDirectory),
    }
}

/// Poll until the task reaches a terminal state, asserting progress never regresses
pub async fn wait_for_terminal(registry: &TaskRegistry, task_id: &str) -> TaskSnapshot {
    let mut last_progress = 0;
    for _ in 0..500 {
        let snapshot = registry.get_status(task_id).await.unwrap();
        assert!(snapshot.progress >= last_progress, "progress regressed");
        assert!(snapshot.completed_count <= snapshot.total_count);
        last_progress = snapshot.progress;
        if snapshot.status.is_terminal() {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} did not finish");
}

/// Poll until at least `count` essays are done
pub async fn wait_for_completed(registry: &TaskRegistry, task_id: &str, count: usize) -> TaskSnapshot {
    for _ in 0..500 {
        let snapshot = registry.get_status(task_id).await.unwrap();
        if snapshot.completed_count >= count {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} never reached {count} completed essays");
}

pub fn is_not_found(err: &GradingError) -> bool {
    matches!(err, GradingError::NotFound { .. })
}
