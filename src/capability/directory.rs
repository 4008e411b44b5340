//! Student identity resolution
//!
//! Essays are matched to students through their filename. The JSON directory
//! maps a student's name to an email address; an empty address means the
//! student is known but has no notification destination.

use crate::{
    error::CapabilityError,
    types::{Student, UploadedImage},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Resolve the author of `essay`, `Ok(None)` when nobody matches
    async fn resolve(&self, essay: &UploadedImage) -> Result<Option<Student>, CapabilityError>;
}

/// Directory that never matches, used when no directory file is configured
#[derive(Debug, Default)]
pub struct NoDirectory;

#[async_trait]
impl StudentDirectory for NoDirectory {
    async fn resolve(&self, _essay: &UploadedImage) -> Result<Option<Student>, CapabilityError> {
        Ok(None)
    }
}

#[derive(Debug, Default)]
pub struct JsonStudentDirectory {
    /// Keyed by normalized name
    students: HashMap<String, Student>,
}

impl JsonStudentDirectory {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)?;
        let directory = Self::from_entries(entries);
        info!(
            "Loaded {} students from {}",
            directory.students.len(),
            path.as_ref().display()
        );
        Ok(directory)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let students = entries
            .into_iter()
            .map(|(name, email)| {
                let name = name.trim().to_string();
                let email = Some(email.trim().to_string()).filter(|e| !e.is_empty());
                (normalize(&name), Student { name, email })
            })
            .collect();
        Self { students }
    }

    fn lookup(&self, filename: &str) -> Option<Student> {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);

        if let Some(student) = self.students.get(&normalize(stem)) {
            return Some(student.clone());
        }

        // "Alice Chen_essay2.png" style names
        let head = stem.split(['_', '-']).next().unwrap_or(stem);
        self.students.get(&normalize(head)).cloned()
    }
}

#[async_trait]
impl StudentDirectory for JsonStudentDirectory {
    async fn resolve(&self, essay: &UploadedImage) -> Result<Option<Student>, CapabilityError> {
        let student = self.lookup(&essay.filename);
        debug!("Resolved {} to {:?}", essay.filename, student.as_ref().map(|s| &s.name));
        Ok(student)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
