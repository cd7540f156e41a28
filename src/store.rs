//! Append-only candidate record export
//!
//! One self-contained record per completed session. Display keys such as
//! `Question 1 (Python)` are derived here, at the serialization boundary,
//! never inside the state machine.

use crate::state_machine::{ConversationState, Field};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flattened record for one session, in export column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    columns: Vec<(String, String)>,
}

impl CandidateRecord {
    /// Flatten a finished session into export columns
    pub fn from_state(state: &ConversationState) -> Self {
        let mut columns = vec![("Session ID".to_string(), state.session_id.clone())];

        for field in [
            Field::FullName,
            Field::Email,
            Field::Experience,
            Field::Position,
            Field::TechStack,
        ] {
            columns.push((
                field.display_key().to_string(),
                state.fields.get(&field).cloned().unwrap_or_default(),
            ));
        }

        for (i, pair) in state.qa_pairs.iter().enumerate() {
            let n = i + 1;
            columns.push((
                format!("Question {n} ({})", pair.technology),
                pair.question.clone(),
            ));
            columns.push((
                format!("Answer {n} ({})", pair.technology),
                pair.answer.clone(),
            ));
        }

        columns.push((
            Field::ApplicationDate.display_key().to_string(),
            state
                .fields
                .get(&Field::ApplicationDate)
                .cloned()
                .unwrap_or_default(),
        ));

        let chat_history = state
            .transcript
            .iter()
            .map(|entry| format!("{}: {}", entry.speaker.label(), entry.text))
            .collect::<Vec<_>>()
            .join("\n");
        columns.push(("Chat History".to_string(), chat_history));

        Self { columns }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, v)| v.as_str())
    }

    #[allow(dead_code)] // Lookup utility, exercised in tests
    pub fn get(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Append-only store for completed session records
pub trait RecordStore: Send + Sync {
    fn append(&self, record: &CandidateRecord) -> Result<(), StoreError>;
}

/// CSV file store. The header row is written when the file is created; each
/// session afterwards appends one row.
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordStore for CsvFileStore {
    fn append(&self, record: &CandidateRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", csv_row(record.keys()))?;
        }
        writeln!(file, "{}", csv_row(record.values()))?;
        file.flush()?;
        Ok(())
    }
}

fn csv_row<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.map(csv_escape).collect::<Vec<_>>().join(",")
}

/// RFC 4180 quoting: fields containing a comma, quote, CR, or LF are wrapped
/// in quotes with embedded quotes doubled.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
