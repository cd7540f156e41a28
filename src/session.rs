//! Session orchestration
//!
//! Runs one turn: appends the candidate's input to the transcript, drives the
//! stage machine to quiescence (executing generator calls and persistence
//! along the way), and appends the assistant's replies. The conversation
//! state is owned by the caller and threaded through each turn.

use crate::generator::{CandidateContext, QuestionGenerator, FALLBACK_QUESTION};
use crate::state_machine::{
    transition, ConversationState, Effect, Event, Field, TranscriptEntry, TransitionError,
    TurnContext,
};
use crate::store::{CandidateRecord, RecordStore};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Upper bound on a single generator call; on expiry the turn degrades to
/// the fallback question instead of hanging.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Orchestrates turns for one candidate session
pub struct SessionController {
    generator: Arc<dyn QuestionGenerator>,
    store: Arc<dyn RecordStore>,
}

impl SessionController {
    pub fn new(generator: Arc<dyn QuestionGenerator>, store: Arc<dyn RecordStore>) -> Self {
        Self { generator, store }
    }

    /// Run one turn against the given state.
    ///
    /// The input is appended to the transcript unconditionally, exit keywords
    /// included. The turn completes only once any in-flight generator call
    /// has resolved, so the caller may not submit a second turn for the same
    /// state concurrently.
    pub async fn submit_turn(
        &self,
        state: &mut ConversationState,
        raw_input: &str,
    ) -> Result<(), SessionError> {
        state.transcript.push(TranscriptEntry::user(raw_input));

        let ctx = TurnContext::current();
        let mut event = Event::user_message(raw_input);
        loop {
            let result = transition(state, &ctx, event)?;
            *state = result.new_state;

            let mut next_event = None;
            for effect in result.effects {
                match effect {
                    Effect::Reply { text } => {
                        state.transcript.push(TranscriptEntry::assistant(text));
                    }
                    Effect::GenerateQuestion { index, technology } => {
                        let question = self.generate_or_fallback(&technology, state).await;
                        next_event = Some(Event::QuestionReady { index, question });
                    }
                    Effect::PersistRecord => self.persist(state),
                }
            }

            match next_event {
                Some(e) => event = e,
                None => break,
            }
        }
        Ok(())
    }

    /// Single generation attempt; any failure degrades to the fallback text
    /// and is logged, never surfaced to the candidate.
    async fn generate_or_fallback(&self, technology: &str, state: &ConversationState) -> String {
        let context = CandidateContext {
            experience_years: state.fields.get(&Field::Experience).cloned(),
            position: state.fields.get(&Field::Position).cloned(),
        };

        match timeout(
            GENERATION_TIMEOUT,
            self.generator.generate(technology, &context),
        )
        .await
        {
            Ok(Ok(question)) => question,
            Ok(Err(e)) => {
                tracing::warn!(
                    %technology,
                    error = %e,
                    "question generation failed, substituting fallback"
                );
                FALLBACK_QUESTION.to_string()
            }
            Err(_) => {
                tracing::warn!(%technology, "question generation timed out, substituting fallback");
                FALLBACK_QUESTION.to_string()
            }
        }
    }

    /// Best-effort persistence: a write failure is logged and never blocks
    /// the farewell from reaching the candidate.
    fn persist(&self, state: &ConversationState) {
        let record = CandidateRecord::from_state(state);
        match self.store.append(&record) {
            Ok(()) => {
                tracing::info!(session_id = %state.session_id, "candidate record persisted");
            }
            Err(e) => {
                tracing::error!(
                    session_id = %state.session_id,
                    error = %e,
                    "failed to persist candidate record"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationError, QuestionGenerator};
    use crate::state_machine::{Speaker, Stage};
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubGenerator;

    #[async_trait]
    impl QuestionGenerator for StubGenerator {
        async fn generate(
            &self,
            technology: &str,
            _context: &CandidateContext,
        ) -> Result<String, GenerationError> {
            Ok(format!("What is your favorite part of {technology}?"))
        }

        fn backend_id(&self) -> &str {
            "stub"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl QuestionGenerator for FailingGenerator {
        async fn generate(
            &self,
            _technology: &str,
            _context: &CandidateContext,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::network("connection refused"))
        }

        fn backend_id(&self) -> &str {
            "failing-stub"
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<CandidateRecord>>,
    }

    impl MemoryStore {
        fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    impl RecordStore for MemoryStore {
        fn append(&self, record: &CandidateRecord) -> Result<(), StoreError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn append(&self, _record: &CandidateRecord) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    fn controller_with(
        generator: impl QuestionGenerator + 'static,
    ) -> (SessionController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let controller = SessionController::new(Arc::new(generator), store.clone());
        (controller, store)
    }

    async fn run(controller: &SessionController, state: &mut ConversationState, inputs: &[&str]) {
        for input in inputs {
            controller.submit_turn(state, input).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_full_screening_flow() {
        let (controller, store) = controller_with(StubGenerator);
        let mut state = ConversationState::new();

        run(
            &controller,
            &mut state,
            &[
                "hi",
                "Ada Lovelace",
                "ada@x.com",
                "5",
                "Backend Engineer",
                "Python, SQL",
                "I like generators",
                "I like window functions",
            ],
        )
        .await;

        assert_eq!(state.stage, Stage::Finished);
        assert!(state.terminated);
        assert_eq!(state.qa_pairs.len(), 2);
        assert_eq!(state.qa_pairs[0].technology, "Python");
        assert_eq!(state.qa_pairs[1].technology, "SQL");

        // Four fixed-field answers plus the completion stamp
        for field in [
            Field::FullName,
            Field::Email,
            Field::Experience,
            Field::Position,
            Field::ApplicationDate,
        ] {
            assert!(state.fields.contains_key(&field), "missing {field:?}");
        }

        // Exactly one persisted record
        assert_eq!(store.len(), 1);
        let records = store.records.lock().unwrap();
        assert_eq!(records[0].get("Full Name"), Some("Ada Lovelace"));
        assert_eq!(
            records[0].get("Answer 2 (SQL)"),
            Some("I like window functions")
        );

        // The transcript captures everything the candidate saw
        let last = state.transcript.last().unwrap();
        assert_eq!(last.speaker, Speaker::Assistant);
        assert!(last.text.contains("Have a great day!"));
    }

    #[tokio::test]
    async fn test_cap_asks_four_questions_for_long_stack() {
        let (controller, store) = controller_with(StubGenerator);
        let mut state = ConversationState::new();

        run(
            &controller,
            &mut state,
            &["hi", "A B", "a@b.c", "3", "Dev", "a, b, c, d, e, f"],
        )
        .await;
        for i in 0..4 {
            controller
                .submit_turn(&mut state, &format!("answer {i}"))
                .await
                .unwrap();
        }

        assert_eq!(state.stage, Stage::Finished);
        assert_eq!(state.qa_pairs.len(), 4);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_tech_stack_concludes_without_questions() {
        let (controller, store) = controller_with(StubGenerator);
        let mut state = ConversationState::new();

        run(
            &controller,
            &mut state,
            &["hi", "A B", "a@b.c", "3", "Dev", "   "],
        )
        .await;

        assert_eq!(state.stage, Stage::Finished);
        assert!(state.qa_pairs.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_substitutes_fallback() {
        let (controller, store) = controller_with(FailingGenerator);
        let mut state = ConversationState::new();

        run(
            &controller,
            &mut state,
            &["hi", "A B", "a@b.c", "3", "Dev", "Fortran", "my answer"],
        )
        .await;

        assert_eq!(state.stage, Stage::Finished);
        assert_eq!(state.qa_pairs.len(), 1);
        assert_eq!(state.qa_pairs[0].question, FALLBACK_QUESTION);
        assert_eq!(state.qa_pairs[0].answer, "my answer");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_exit_keyword_skips_persistence() {
        let (controller, store) = controller_with(StubGenerator);
        let mut state = ConversationState::new();

        run(&controller, &mut state, &["hi", "A B", "quit"]).await;

        assert_eq!(state.stage, Stage::Finished);
        assert!(state.terminated);
        assert_eq!(store.len(), 0);

        // The exit itself is still on the record of the transcript
        let texts: Vec<&str> = state.transcript.iter().map(|e| e.text.as_str()).collect();
        assert!(texts.contains(&"quit"));
        assert!(state
            .transcript
            .last()
            .unwrap()
            .text
            .contains("The conversation has now ended"));
    }

    #[tokio::test]
    async fn test_input_after_finish_is_ignored_and_not_repersisted() {
        let (controller, store) = controller_with(StubGenerator);
        let mut state = ConversationState::new();

        run(
            &controller,
            &mut state,
            &["hi", "A B", "a@b.c", "3", "Dev", "", "hello?"],
        )
        .await;

        assert_eq!(state.stage, Stage::Finished);
        assert_eq!(store.len(), 1);
        // The stray input is still captured for audit, with no reply
        assert_eq!(state.transcript.last().unwrap().text, "hello?");
        assert_eq!(state.transcript.last().unwrap().speaker, Speaker::User);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_block_farewell() {
        let controller =
            SessionController::new(Arc::new(StubGenerator), Arc::new(BrokenStore));
        let mut state = ConversationState::new();

        run(
            &controller,
            &mut state,
            &["hi", "A B", "a@b.c", "3", "Dev", "   "],
        )
        .await;

        assert_eq!(state.stage, Stage::Finished);
        assert!(state
            .transcript
            .last()
            .unwrap()
            .text
            .contains("Have a great day!"));
    }
}
