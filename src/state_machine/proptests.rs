//! Property tests for the stage machine
//!
//! Drives full sessions with generated input and checks the structural
//! invariants that the transition function promises.

use super::state::{ConversationState, Stage, TurnContext};
use super::transition::{transition, MAX_TECHNICAL_QUESTIONS};
use super::{Effect, Event};
use proptest::prelude::*;

/// Run one turn the way the session controller does, substituting canned
/// question text for the generator call.
fn drive_turn(state: &mut ConversationState, input: &str) {
    let ctx = TurnContext::current();
    let mut event = Event::user_message(input);
    loop {
        let result = transition(state, &ctx, event).expect("driver produced invalid transition");
        *state = result.new_state;
        let mut next_event = None;
        for effect in result.effects {
            if let Effect::GenerateQuestion { index, technology } = effect {
                next_event = Some(Event::QuestionReady {
                    index,
                    question: format!("What do you know about {technology}?"),
                });
            }
        }
        match next_event {
            Some(e) => event = e,
            None => break,
        }
    }
}

fn check_invariants(state: &ConversationState) {
    assert!(state.question_index <= state.tech_stack.len());
    assert!(state.question_index <= MAX_TECHNICAL_QUESTIONS);
    assert_eq!(state.qa_pairs.len(), state.question_index);
    if state.terminated {
        assert_eq!(state.stage, Stage::Finished);
    }
    for (i, pair) in state.qa_pairs.iter().enumerate() {
        assert_eq!(pair.technology, state.tech_stack[i]);
        assert!(!pair.question.is_empty());
    }
}

proptest! {
    /// Arbitrary printable input never panics, never errors, and never
    /// violates the cursor/stage invariants.
    #[test]
    fn arbitrary_sessions_hold_invariants(inputs in proptest::collection::vec("[ -~]{0,40}", 0..12)) {
        let mut state = ConversationState::new();
        for input in &inputs {
            drive_turn(&mut state, input);
            check_invariants(&state);
        }
    }

    /// Exit keywords terminate from any point, regardless of case or padding.
    #[test]
    fn exit_keyword_always_terminates(
        turns_before in 0usize..6,
        keyword in prop::sample::select(vec!["exit", "quit", "bye", "goodbye"]),
        uppercase in any::<bool>(),
        padding in "[ \t]{0,3}",
    ) {
        let mut state = ConversationState::new();
        let answers = ["hi", "Ada Lovelace", "ada@x.com", "5", "Backend Engineer", "Python, SQL"];
        for answer in answers.iter().take(turns_before) {
            drive_turn(&mut state, answer);
        }

        let word = if uppercase { keyword.to_uppercase() } else { keyword.to_string() };
        let input = format!("{padding}{word}{padding}");
        drive_turn(&mut state, &input);

        prop_assert!(state.terminated);
        prop_assert_eq!(&state.stage, &Stage::Finished);
    }

    /// A full session asks exactly min(stack length, cap) questions.
    #[test]
    fn question_count_is_min_of_stack_and_cap(stack_len in 0usize..8) {
        let stack: Vec<String> = (0..stack_len).map(|i| format!("tech{i}")).collect();
        let stack_input = stack.join(", ");

        let mut state = ConversationState::new();
        for input in ["hi", "Ada Lovelace", "ada@x.com", "5", "Backend Engineer"] {
            drive_turn(&mut state, input);
        }
        drive_turn(&mut state, &stack_input);
        while !state.terminated {
            drive_turn(&mut state, "an answer");
        }

        prop_assert_eq!(state.qa_pairs.len(), stack_len.min(MAX_TECHNICAL_QUESTIONS));
        prop_assert_eq!(&state.stage, &Stage::Finished);
    }
}
