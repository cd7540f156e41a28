//! Pure stage transition function
//!
//! Owns the fixed field-gathering sequence and the technical-question
//! sub-loop. Given the same state, context, and event it always produces the
//! same outputs, with no I/O side effects.

use super::state::{parse_tech_stack, ConversationState, Field, Stage, TurnContext};
use super::{Effect, Event};
use thiserror::Error;

/// Cap on generated technical questions, regardless of stack length
pub const MAX_TECHNICAL_QUESTIONS: usize = 4;

/// Keywords that end the conversation from any non-terminal stage
const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "bye", "goodbye"];

pub const WELCOME_MESSAGE: &str = "Welcome to TalentScout! I'm your intelligent hiring assistant. \
    To start, I'll ask a few questions to get to know you. \
    You can type 'exit' at any time to end our conversation.";

const NAME_PROMPT: &str = "To begin, could you please tell me your full name?";
const EXPERIENCE_PROMPT: &str =
    "Perfect. And how many years of professional experience do you have?";
const POSITION_PROMPT: &str =
    "Great. What specific position or type of role are you looking for?";
const TECH_STACK_PROMPT: &str = "Understood. Please list the programming languages, frameworks, \
    and tools in your primary tech stack. (e.g., Python, Django, React, Docker)";
const TECH_INTRO: &str = "Thanks for sharing your tech stack. I will now ask a few technical \
    questions based on what you've listed.";
const NO_STACK_NOTICE: &str =
    "It seems no tech stack was provided. We'll proceed with the information we have.";
const TECH_SECTION_DONE: &str =
    "Thank you for your answers. That's all the technical questions for now.";
const FAREWELL: &str = "Thank you for your time and for completing this initial screening. \
    Your information has been recorded. Our recruitment team will review your profile and get \
    in touch if your skills are a match. Have a great day!";
const EXIT_FAREWELL: &str = "Thank you for your time. The conversation has now ended.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition.
///
/// These indicate a driver bug, not a user-facing condition: a correctly
/// sequenced session never produces them.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ConversationState,
    ctx: &TurnContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let mut next = state.clone();
    let stage = state.stage.clone();

    match (stage, event) {
        // Terminal stage ignores any further input
        (Stage::Finished, Event::UserMessage { .. }) => Ok(TransitionResult::new(next)),

        // Exit override: ends the session from any non-terminal stage,
        // bypassing stage logic. Partial data is not persisted.
        (_, Event::UserMessage { text }) if is_exit_keyword(&text) => {
            next.stage = Stage::Finished;
            next.terminated = true;
            Ok(TransitionResult::new(next).with_effect(Effect::reply(EXIT_FAREWELL)))
        }

        // The first message is consumed without storing a field
        (Stage::Greeting, Event::UserMessage { .. }) => {
            next.stage = Stage::Name;
            Ok(TransitionResult::new(next).with_effect(Effect::reply(NAME_PROMPT)))
        }

        (Stage::Name, Event::UserMessage { text }) => {
            let prompt = email_prompt(&text);
            store_field(&mut next, Field::FullName, text)?;
            next.stage = Stage::Email;
            Ok(TransitionResult::new(next).with_effect(Effect::reply(prompt)))
        }

        (Stage::Email, Event::UserMessage { text }) => {
            store_field(&mut next, Field::Email, text)?;
            next.stage = Stage::Experience;
            Ok(TransitionResult::new(next).with_effect(Effect::reply(EXPERIENCE_PROMPT)))
        }

        (Stage::Experience, Event::UserMessage { text }) => {
            store_field(&mut next, Field::Experience, text)?;
            next.stage = Stage::Position;
            Ok(TransitionResult::new(next).with_effect(Effect::reply(POSITION_PROMPT)))
        }

        (Stage::Position, Event::UserMessage { text }) => {
            store_field(&mut next, Field::Position, text)?;
            next.stage = Stage::TechStack;
            Ok(TransitionResult::new(next).with_effect(Effect::reply(TECH_STACK_PROMPT)))
        }

        (Stage::TechStack, Event::UserMessage { text }) => {
            next.tech_stack = parse_tech_stack(&text);
            next.question_index = 0;
            store_field(&mut next, Field::TechStack, text)?;

            if next.tech_stack.is_empty() {
                // Bypass rule A: nothing to ask, conclude directly
                let mut result = TransitionResult::new(next)
                    .with_effect(Effect::reply(format!("{TECH_INTRO}\n\n{NO_STACK_NOTICE}")));
                conclude(&mut result.new_state, ctx, &mut result.effects);
                Ok(result)
            } else {
                let technology = next.tech_stack[0].clone();
                next.stage = Stage::AwaitingQuestion { index: 0 };
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::generate_question(0, technology)))
            }
        }

        (Stage::AwaitingQuestion { index }, Event::QuestionReady { index: ready, question })
            if ready == index =>
        {
            let Some(technology) = next.tech_stack.get(index).cloned() else {
                return Err(TransitionError::InvalidTransition(format!(
                    "question index {index} out of bounds for stack of {}",
                    next.tech_stack.len()
                )));
            };

            let reply = if index == 0 {
                format!("{TECH_INTRO}\n\nLet's start with {technology}: {question}")
            } else {
                format!("Great, thank you. Now for {technology}: {question}")
            };
            next.stage = Stage::TechnicalQ { index, question };
            Ok(TransitionResult::new(next).with_effect(Effect::reply(reply)))
        }

        (Stage::TechnicalQ { index, question }, Event::UserMessage { text }) => {
            let Some(technology) = next.tech_stack.get(index).cloned() else {
                return Err(TransitionError::InvalidTransition(format!(
                    "question index {index} out of bounds for stack of {}",
                    next.tech_stack.len()
                )));
            };

            next.qa_pairs.push(super::QaPair {
                technology,
                question,
                answer: text,
            });
            next.question_index = index + 1;

            // The cap and the stack length jointly bound the sub-loop
            let limit = next.tech_stack.len().min(MAX_TECHNICAL_QUESTIONS);
            if next.question_index < limit {
                let next_index = next.question_index;
                let technology = next.tech_stack[next_index].clone();
                next.stage = Stage::AwaitingQuestion { index: next_index };
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::generate_question(next_index, technology)))
            } else {
                // Bypass rule B: cap or exhaustion reached
                let mut result =
                    TransitionResult::new(next).with_effect(Effect::reply(TECH_SECTION_DONE));
                conclude(&mut result.new_state, ctx, &mut result.effects);
                Ok(result)
            }
        }

        (stage, event) => Err(TransitionError::InvalidTransition(format!(
            "no transition from {stage:?} with event {event:?}"
        ))),
    }
}

/// Finalize the session: stamp the application date, emit the farewell, and
/// request persistence. Idempotent; re-entry after termination is a no-op.
fn conclude(state: &mut ConversationState, ctx: &TurnContext, effects: &mut Vec<Effect>) {
    if state.terminated {
        return;
    }
    state
        .fields
        .insert(Field::ApplicationDate, ctx.now.date_naive().to_string());
    state.stage = Stage::Finished;
    state.terminated = true;
    effects.push(Effect::reply(FAREWELL));
    effects.push(Effect::PersistRecord);
}

fn is_exit_keyword(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    EXIT_KEYWORDS.contains(&normalized.as_str())
}

/// Fields are write-once; the stage order makes a duplicate unreachable, so
/// hitting one means the driver replayed a stage.
fn store_field(
    state: &mut ConversationState,
    field: Field,
    value: String,
) -> Result<(), TransitionError> {
    if state.fields.contains_key(&field) {
        return Err(TransitionError::InvalidTransition(format!(
            "field {field:?} already recorded"
        )));
    }
    state.fields.insert(field, value);
    Ok(())
}

fn email_prompt(full_name: &str) -> String {
    match full_name.split_whitespace().next() {
        Some(first) => format!("Thank you, {first}. What is your email address?"),
        None => "Thank you. What is your email address?".to_string(),
    }
}
