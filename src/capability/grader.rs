//! Grading backend client
//!
//! `HttpGrader` posts both images to a remote grading service and parses the
//! JSON it answers with into a `GradingResult`.

use crate::{
    config::GraderConfig,
    error::CapabilityError,
    types::{GradingResult, UploadedImage},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use tracing::{debug, warn};

#[async_trait]
pub trait Grader: Send + Sync {
    /// Grade `essay` against the requirements shown in `prompt`
    async fn grade(
        &self,
        prompt: &UploadedImage,
        essay: &UploadedImage,
    ) -> Result<GradingResult, CapabilityError>;
}

#[derive(Serialize)]
struct GradeRequest<'a> {
    prompt_image: String,
    essay_image: String,
    essay_filename: &'a str,
}

pub struct HttpGrader {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGrader {
    pub fn new(config: &GraderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl Grader for HttpGrader {
    async fn grade(
        &self,
        prompt: &UploadedImage,
        essay: &UploadedImage,
    ) -> Result<GradingResult, CapabilityError> {
        debug!("Requesting grade for {} from {}", essay.filename, self.endpoint);

        let body = GradeRequest {
            prompt_image: STANDARD.encode(&prompt.bytes),
            essay_image: STANDARD.encode(&essay.bytes),
            essay_filename: &essay.filename,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CapabilityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Grading backend answered {} for {}", status, essay.filename);
            return Err(CapabilityError::Unavailable(format!("HTTP {status}: {detail}")));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| CapabilityError::Unavailable(e.to_string()))?;
        parse_grading_result(&raw)
    }
}

/// Parse and sanity-check a grading payload
pub fn parse_grading_result(raw: &str) -> Result<GradingResult, CapabilityError> {
    let result: GradingResult = serde_json::from_str(raw)
        .map_err(|e| CapabilityError::MalformedOutput(e.to_string()))?;

    if !result.score.is_finite() || !(0.0..=100.0).contains(&result.score) {
        return Err(CapabilityError::MalformedOutput(format!(
            "score out of range: {}",
            result.score
        )));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Suggestion;

    #[test]
    fn parses_mixed_suggestion_shapes() {
        let raw = r#"{
            "score": 88,
            "strengths": "clear structure",
            "suggestions": [
                "Watch your tenses.",
                {
                    "original_sentence": "I very like it.",
                    "revised_sentence": "I like it very much.",
                    "reason": "adverb placement"
                }
            ]
        }"#;

        let result = parse_grading_result(raw).unwrap();
        assert_eq!(result.score, 88.0);
        assert_eq!(result.strengths.as_deref(), Some("clear structure"));
        assert_eq!(result.suggestions[0], Suggestion::Text("Watch your tenses.".into()));
        assert!(matches!(
            &result.suggestions[1],
            Suggestion::Revision { revised_sentence, .. } if revised_sentence == "I like it very much."
        ));
    }

    #[test]
    fn rejects_out_of_range_score() {
        let err = parse_grading_result(r#"{"score": 140, "suggestions": []}"#).unwrap_err();
        assert!(matches!(err, CapabilityError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_missing_score() {
        let err = parse_grading_result(r#"{"suggestions": ["ok"]}"#).unwrap_err();
        assert!(matches!(err, CapabilityError::MalformedOutput(_)));
    }
}
