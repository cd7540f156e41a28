//! TalentScout - scripted screening-interview assistant
//!
//! A terminal chat front end over the conversation state machine: fixed
//! information-gathering prompts, generated technical questions from the
//! declared tech stack, and a CSV export of the completed screening.

mod generator;
mod session;
mod state_machine;
mod store;

use generator::{build_generator, GeneratorConfig};
use session::SessionController;
use state_machine::{ConversationState, Speaker};
use std::io::{BufRead, Write};
use std::sync::Arc;
use store::CsvFileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talentscout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let export_path = std::env::var("TALENTSCOUT_EXPORT_PATH")
        .unwrap_or_else(|_| "candidates.csv".to_string());

    let generator_config = GeneratorConfig::from_env();
    let generator = build_generator(&generator_config);
    tracing::info!(backend = %generator.backend_id(), "question generator initialized");

    let store = Arc::new(CsvFileStore::new(&export_path));
    let controller = SessionController::new(generator, store);

    let mut state = ConversationState::new();
    tracing::info!(session_id = %state.session_id, export = %export_path, "session started");

    // The welcome entry is already in the transcript
    for entry in &state.transcript {
        println!("{}", entry.text);
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    while !state.terminated {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF ends the session without a record
            break;
        }
        let input = line.trim_end_matches(['\n', '\r']);

        let before = state.transcript.len();
        controller.submit_turn(&mut state, input).await?;

        for entry in &state.transcript[before..] {
            if entry.speaker == Speaker::Assistant {
                println!("\n{}\n", entry.text);
            }
        }
    }

    if state.terminated {
        println!("The conversation has concluded. Thank you for using TalentScout!");
    }
    Ok(())
}
