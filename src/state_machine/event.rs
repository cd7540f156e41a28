//! Events that drive the screening conversation

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// One line of input from the candidate
    UserMessage { text: String },

    /// A generator call resolved. The session controller substitutes the
    /// fallback text on failure before feeding this event, so the machine
    /// itself never observes generation errors.
    QuestionReady { index: usize, question: String },
}

impl Event {
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage { text: text.into() }
    }
}
