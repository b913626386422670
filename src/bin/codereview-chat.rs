//! Interactive code review chat backed by Gemini.
//!
//! Paste code line by line, then `/send` it for review.  The review is printed
//! when it arrives and added to the transcript.
//!
//! # Usage
//!
//! ```bash
//! # Key from the environment
//! GEMINI_API_KEY=AIza... codereview-chat
//!
//! # Key on the command line
//! codereview-chat --api-key AIza...
//!
//! # Prompted for the key, with a faster model
//! codereview-chat --model gemini-2.5-flash
//!
//! # Disable colors (useful for piping output)
//! codereview-chat --no-color
//! ```
//!
//! Set `RUST_LOG=codereview=debug` to see request logging on stderr.

use std::io;

use arrrg::CommandLine;
use dialoguer::Password;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use codereview::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, SessionMode,
    help_text, parse_draft_line,
};
use codereview::{GeminiReviewer, Model, SystemClipboard, TracingLogger};

const API_KEY_HELP: &str = "Get your API key from Google AI Studio: https://makersuite.google.com/app/apikey";

/// Main entry point for the codereview-chat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("codereview-chat [OPTIONS]");
    let config = ChatConfig::from(args).with_env_api_key();
    let reviewer = config
        .reviewer()
        .with_logger(std::sync::Arc::new(TracingLogger));

    let mut session = ChatSession::new(reviewer);
    if let Some(key) = &config.api_key {
        session.set_api_key(key.clone());
        session.confirm_api_key();
    }
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut clipboard = SystemClipboard;
    let mut rl = DefaultEditor::new()?;

    println!("CodeReview AI (model: {})", session.backend().model());
    println!("Type /help for commands, /quit to exit\n");

    if session.mode() == SessionMode::AwaitingApiKey && !prompt_for_key(&mut session, &mut renderer)?
    {
        return Ok(());
    }
    print_transcript(&session, &mut renderer);

    loop {
        let prompt = if session.draft().is_empty() { "> " } else { ". " };
        match rl.readline(prompt) {
            Ok(line) => {
                let Some(cmd) = parse_draft_line(&line, !session.draft().is_empty()) else {
                    session.push_draft_line(&line);
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                match cmd {
                    ChatCommand::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                    ChatCommand::Help => {
                        for line in help_text().lines() {
                            println!("    {}", line);
                        }
                    }
                    ChatCommand::Send => {
                        let Some(pending) = session.begin_submit() else {
                            renderer.print_info("Nothing to review: the draft is empty.");
                            continue;
                        };
                        let user_index = session.message_count() - 1;
                        renderer.print_message(user_index, &session.messages()[user_index]);
                        renderer.print_loading();
                        let review = session.run_review(&pending).await;
                        session.complete_review(pending, review);
                        let index = session.message_count() - 1;
                        renderer.print_message(index, &session.messages()[index]);
                    }
                    ChatCommand::Discard => {
                        session.clear_draft();
                        renderer.print_info("Draft discarded.");
                    }
                    ChatCommand::ChangeKey => {
                        session.request_key_change();
                        if !prompt_for_key(&mut session, &mut renderer)? {
                            break;
                        }
                    }
                    ChatCommand::Copy(index) => {
                        let Some(index) = index.or_else(|| session.last_assistant_index()) else {
                            renderer.print_error("Nothing to copy.");
                            continue;
                        };
                        match session.copy_to_clipboard(&mut clipboard, index) {
                            Ok(()) => renderer.print_copied(index),
                            Err(err) => renderer.print_error(&format!("Copy failed: {err}")),
                        }
                    }
                    ChatCommand::History => {
                        print_transcript(&session, &mut renderer);
                    }
                    ChatCommand::Model(model_name) => {
                        let model = model_name
                            .parse()
                            .unwrap_or_else(|_| Model::Custom(model_name.clone()));
                        session.backend_mut().set_model(model);
                        renderer.print_info(&format!("Model changed to: {}", model_name));
                    }
                    ChatCommand::Status => {
                        print_status(&session);
                    }
                    ChatCommand::Unknown(word) => {
                        renderer.print_error(&format!("Unknown command: /{}", word));
                    }
                    ChatCommand::Invalid(message) => {
                        renderer.print_error(&message);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt discards the draft
                if !session.draft().is_empty() {
                    session.clear_draft();
                    renderer.print_info("Draft discarded.");
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Asks for a key until one is confirmed.  Returns false if input was closed.
///
/// An empty answer keeps the key already held by the session.
fn prompt_for_key(
    session: &mut ChatSession<GeminiReviewer>,
    renderer: &mut PlainTextRenderer,
) -> Result<bool, Box<dyn std::error::Error>> {
    renderer.print_info(API_KEY_HELP);
    loop {
        let entered = match Password::new()
            .with_prompt("Gemini API key")
            .allow_empty_password(true)
            .interact()
        {
            Ok(entered) => entered,
            Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        if !entered.trim().is_empty() {
            session.set_api_key(entered.trim());
        }
        if session.confirm_api_key() {
            return Ok(true);
        }
        renderer.print_error("An API key is required to start reviewing.");
    }
}

fn print_transcript(session: &ChatSession<GeminiReviewer>, renderer: &mut PlainTextRenderer) {
    for (index, message) in session.messages().iter().enumerate() {
        renderer.print_message(index, message);
        if session.copied_index() == Some(index) {
            renderer.print_copied(index);
        }
    }
}

fn print_status(session: &ChatSession<GeminiReviewer>) {
    let stats = session.stats();
    println!("    Session Status:");
    println!("      Model: {}", session.backend().model());
    println!("      Messages: {}", stats.message_count);
    println!("      Reviews requested: {}", stats.submissions);
    println!("      Draft lines: {}", stats.draft_lines);
    println!(
        "      API key: {}",
        if stats.has_api_key { "set" } else { "(none)" }
    );
}
