//! Google Gemini question backend

use super::error::GenerationError;
use super::{CandidateContext, QuestionGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-pro";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_OUTPUT_TOKENS: i32 = 256;

/// Live generator backed by the Gemini `generateContent` endpoint
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
        );

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    fn build_prompt(technology: &str, context: &CandidateContext) -> String {
        let mut prompt = format!(
            "Generate one concise technical interview question for a candidate proficient in {technology}."
        );
        if let Some(years) = &context.experience_years {
            prompt.push_str(&format!(
                " The candidate has {years} years of professional experience."
            ));
        }
        if let Some(position) = &context.position {
            prompt.push_str(&format!(" They are applying for a {position} role."));
        }
        prompt.push_str(" Return a single question as plain text, with no list and no preamble.");
        prompt
    }

    fn extract_question(resp: GeminiResponse) -> Result<String, GenerationError> {
        if let Some(feedback) = resp.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                return Err(GenerationError::blocked(format!(
                    "prompt blocked: {reason}"
                )));
            }
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::empty_output("no candidates in response"))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(GenerationError::blocked("candidate blocked by safety filter"));
        }

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::empty_output("model returned empty text"));
        }
        Ok(trimmed.to_string())
    }
}

#[async_trait]
impl QuestionGenerator for GeminiGenerator {
    async fn generate(
        &self,
        technology: &str,
        context: &CandidateContext,
    ) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Self::build_prompt(technology, context),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            }),
        };

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::network(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    GenerationError::network(format!("connection failed: {e}"))
                } else {
                    GenerationError::unknown(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::network(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                let message = error_resp.error.message;
                return Err(match status.as_u16() {
                    400 => GenerationError::invalid_request(format!("invalid request: {message}")),
                    401 | 403 => GenerationError::auth(format!("authentication failed: {message}")),
                    429 => GenerationError::rate_limit(format!("rate limit exceeded: {message}")),
                    500..=599 => GenerationError::server_error(format!("server error: {message}")),
                    _ => GenerationError::unknown(format!("HTTP {status}: {message}")),
                });
            }
            return Err(GenerationError::unknown(format!(
                "HTTP {status} error: {body}"
            )));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::unknown(format!("failed to parse response: {e} - body: {body}"))
        })?;

        Self::extract_question(gemini_response)
    }

    fn backend_id(&self) -> &str {
        &self.model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationErrorKind;

    #[test]
    fn test_prompt_includes_context() {
        let context = CandidateContext {
            experience_years: Some("5".to_string()),
            position: Some("Backend Engineer".to_string()),
        };
        let prompt = GeminiGenerator::build_prompt("Python", &context);
        assert!(prompt.contains("proficient in Python"));
        assert!(prompt.contains("5 years"));
        assert!(prompt.contains("Backend Engineer"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = GeminiGenerator::build_prompt("SQL", &CandidateContext::default());
        assert!(prompt.contains("proficient in SQL"));
        assert!(!prompt.contains("years of professional experience"));
    }

    #[test]
    fn test_extract_question_trims_text() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  What is a borrow checker?\n"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        let question = GeminiGenerator::extract_question(resp).unwrap();
        assert_eq!(question, "What is a borrow checker?");
    }

    #[test]
    fn test_extract_question_empty_is_error() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        let err = GeminiGenerator::extract_question(resp).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::EmptyOutput);
    }

    #[test]
    fn test_extract_question_blocked_prompt() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#,
        )
        .unwrap();
        let err = GeminiGenerator::extract_question(resp).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Blocked);
    }
}
