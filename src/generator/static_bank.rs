//! Offline question bank keyed by lower-cased technology name
//!
//! Used when no API key is configured, and handy for demos and tests.

use super::error::GenerationError;
use super::{CandidateContext, QuestionGenerator};
use async_trait::async_trait;
use std::collections::HashMap;

/// Lookup-table generator with a fixed set of common technologies
pub struct StaticQuestionBank {
    questions: HashMap<&'static str, &'static str>,
}

impl Default for StaticQuestionBank {
    fn default() -> Self {
        let questions = HashMap::from([
            (
                "python",
                "In Python, what is the difference between a list and a tuple, and when would you reach for each?",
            ),
            (
                "rust",
                "How does Rust's borrow checker prevent data races at compile time?",
            ),
            (
                "javascript",
                "Explain how the JavaScript event loop handles promises versus setTimeout callbacks.",
            ),
            (
                "typescript",
                "What does TypeScript's structural typing mean for interface compatibility?",
            ),
            (
                "react",
                "When does a React component re-render, and how can unnecessary re-renders be avoided?",
            ),
            (
                "django",
                "How does Django's ORM translate a queryset into SQL, and when is the query actually executed?",
            ),
            (
                "docker",
                "What is the difference between a Docker image and a container?",
            ),
            (
                "kubernetes",
                "What problem does a Kubernetes Deployment solve that running bare Pods does not?",
            ),
            (
                "sql",
                "What is the difference between an INNER JOIN and a LEFT JOIN?",
            ),
            (
                "postgresql",
                "How do indexes in PostgreSQL speed up reads, and what do they cost on writes?",
            ),
            (
                "go",
                "How do goroutines and channels differ from OS threads and locks?",
            ),
            (
                "java",
                "What is the difference between the JVM heap and stack, and what lives where?",
            ),
            (
                "aws",
                "When would you choose SQS over SNS for communication between services?",
            ),
            (
                "git",
                "What is the difference between git merge and git rebase, and when is rebase risky?",
            ),
        ]);
        Self { questions }
    }
}

#[async_trait]
impl QuestionGenerator for StaticQuestionBank {
    async fn generate(
        &self,
        technology: &str,
        _context: &CandidateContext,
    ) -> Result<String, GenerationError> {
        let key = technology.trim().to_lowercase();
        self.questions
            .get(key.as_str())
            .map(|q| (*q).to_string())
            .ok_or_else(|| GenerationError::unknown_topic(technology))
    }

    fn backend_id(&self) -> &str {
        "static-bank"
    }
}
