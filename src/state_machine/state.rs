//! Conversation state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::transition::WELCOME_MESSAGE;

// ============================================================================
// Transcript
// ============================================================================

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label used when the transcript is serialized as `speaker: text` lines
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

/// One line of the conversation, in the order it was exchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

// ============================================================================
// Collected candidate data
// ============================================================================

/// Fixed fields collected by the scripted stages
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Email,
    Experience,
    Position,
    TechStack,
    ApplicationDate,
}

impl Field {
    /// Human-readable key used at the serialization boundary
    pub fn display_key(self) -> &'static str {
        match self {
            Field::FullName => "Full Name",
            Field::Email => "Email Address",
            Field::Experience => "Years of Experience",
            Field::Position => "Desired Position(s)",
            Field::TechStack => "Tech Stack",
            Field::ApplicationDate => "Application Date",
        }
    }
}

/// One generated technical question paired with the candidate's answer.
///
/// Written exactly once per technology; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub technology: String,
    pub question: String,
    pub answer: String,
}

// ============================================================================
// Stage
// ============================================================================

/// Current point in the fixed conversation sequence.
///
/// Stages only move forward. `AwaitingQuestion` marks an in-flight generator
/// call and exists only within a single turn: the session controller drives
/// the machine to quiescence before accepting further input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    /// Awaiting the candidate's first message; nothing is stored for it
    Greeting,
    /// Awaiting the candidate's full name
    Name,
    /// Awaiting the email address
    Email,
    /// Awaiting years of professional experience
    Experience,
    /// Awaiting the desired position
    Position,
    /// Awaiting the comma-separated tech stack
    TechStack,
    /// Generator call in flight for `tech_stack[index]`
    AwaitingQuestion { index: usize },
    /// Question for `tech_stack[index]` asked, awaiting the answer
    TechnicalQ { index: usize, question: String },
    /// Terminal; no further input-driven transitions
    Finished,
}

// ============================================================================
// Conversation State
// ============================================================================

/// Full state of one screening session.
///
/// Owned by the caller and threaded through `submit_turn`; mutated only via
/// the transition function and the session controller's transcript appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: String,
    pub stage: Stage,
    pub fields: BTreeMap<Field, String>,
    /// Technology names parsed from the tech-stack answer, in declared order
    pub tech_stack: Vec<String>,
    /// 0-based cursor into `tech_stack`; monotonically non-decreasing
    pub question_index: usize,
    pub qa_pairs: Vec<QaPair>,
    pub transcript: Vec<TranscriptEntry>,
    pub terminated: bool,
}

impl ConversationState {
    /// Create a fresh session with the welcome message already in the transcript
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            stage: Stage::Greeting,
            fields: BTreeMap::new(),
            tech_stack: Vec::new(),
            question_index: 0,
            qa_pairs: Vec::new(),
            transcript: vec![TranscriptEntry::assistant(WELCOME_MESSAGE)],
            terminated: false,
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-turn inputs the transition function needs but must not fetch itself
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub now: DateTime<Utc>,
}

impl TurnContext {
    #[allow(dead_code)] // Constructor for fixed-clock tests
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Context stamped with the wall clock
    pub fn current() -> Self {
        Self { now: Utc::now() }
    }
}

/// Derive the ordered tech-stack list from the raw comma-separated answer.
///
/// Entries are trimmed; empty segments are dropped.
pub fn parse_tech_stack(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(ToString::to_string)
        .collect()
}
