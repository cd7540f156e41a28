//! Question generation abstraction
//!
//! Provides a common interface over the live Gemini backend and the offline
//! lookup-table bank. The backend is selected once at startup; the state
//! machine never branches on which one is in use.

mod error;
mod gemini;
mod static_bank;

pub use error::{GenerationError, GenerationErrorKind};
pub use gemini::GeminiGenerator;
pub use static_bank::StaticQuestionBank;

use async_trait::async_trait;
use std::sync::Arc;

/// Fixed substitute used when generation fails for a technology
pub const FALLBACK_QUESTION: &str =
    "I'm sorry, I couldn't generate a question for that topic. Let's move to the next one.";

/// Candidate details used only to enrich question phrasing
#[derive(Debug, Clone, Default)]
pub struct CandidateContext {
    pub experience_years: Option<String>,
    pub position: Option<String>,
}

/// Common interface for question backends
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Produce one concise interview question for the technology
    async fn generate(
        &self,
        technology: &str,
        context: &CandidateContext,
    ) -> Result<String, GenerationError>;

    /// Identifier of the backing implementation, for logs
    fn backend_id(&self) -> &str;
}

/// Logging wrapper for question generators
pub struct LoggingGenerator {
    inner: Arc<dyn QuestionGenerator>,
    backend_id: String,
}

impl LoggingGenerator {
    pub fn new(inner: Arc<dyn QuestionGenerator>) -> Self {
        let backend_id = inner.backend_id().to_string();
        Self { inner, backend_id }
    }
}

#[async_trait]
impl QuestionGenerator for LoggingGenerator {
    async fn generate(
        &self,
        technology: &str,
        context: &CandidateContext,
    ) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(technology, context).await;
        let duration = start.elapsed();

        match &result {
            Ok(question) => {
                tracing::info!(
                    backend = %self.backend_id,
                    %technology,
                    duration_ms = %duration.as_millis(),
                    question_len = question.len(),
                    "question generated"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.backend_id,
                    %technology,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "question generation failed"
                );
            }
        }

        result
    }

    fn backend_id(&self) -> &str {
        &self.backend_id
    }
}

/// Configuration for the question backend, read from the environment once
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub google_api_key: Option<String>,
    /// Gemini model name, defaults to `gemini-pro`
    pub model: Option<String>,
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        Self {
            google_api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("GEMINI_MODEL").ok().filter(|m| !m.is_empty()),
        }
    }
}

/// Build the configured backend, wrapped with logging.
///
/// With an API key present the live Gemini backend is used; otherwise the
/// offline bank keeps the interview flow working without network access.
pub fn build_generator(config: &GeneratorConfig) -> Arc<dyn QuestionGenerator> {
    let inner: Arc<dyn QuestionGenerator> = match &config.google_api_key {
        Some(key) => Arc::new(GeminiGenerator::new(key.clone(), config.model.clone())),
        None => Arc::new(StaticQuestionBank::default()),
    };
    Arc::new(LoggingGenerator::new(inner))
}
