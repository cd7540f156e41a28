//! Effects produced by state transitions

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Assistant output; the controller appends it to the transcript
    Reply { text: String },

    /// Ask the question generator for `tech_stack[index]`. The controller
    /// feeds the result back as `Event::QuestionReady` within the same turn.
    GenerateQuestion { index: usize, technology: String },

    /// Append the completed candidate record to the store, exactly once
    PersistRecord,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }

    pub fn generate_question(index: usize, technology: impl Into<String>) -> Self {
        Effect::GenerateQuestion {
            index,
            technology: technology.into(),
        }
    }
}
