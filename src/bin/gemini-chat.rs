//! Interactive chat application for conversing with Gemini.
//!
//! This binary provides a streaming REPL over one chat session.  Every input and every
//! answer is kept in the session's transcript; a failed model call shows up as an
//! `Error: ...` answer and the session carries on.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! gemini-chat
//!
//! # Specify a model
//! gemini-chat --model gemini-2.5-flash
//!
//! # Read the API key from another secrets file
//! gemini-chat --secrets ~/.config/gemini/secrets.toml
//!
//! # Send only the newest input to the model
//! gemini-chat --stateless
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/history` - Show the whole conversation again
//! - `/new` - Start a new conversation
//! - `/model <name>` - Change the model
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use gemini_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, Environment, PlainTextRenderer, Renderer,
    SecretsFile, help_text, parse_command, render_transcript,
};
use gemini_chat::{Gemini, Model};

/// Main entry point for the gemini-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("gemini-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let secrets = SecretsFile::new(config.secrets_path.clone());
    let mut session = match ChatSession::connect(&[&secrets, &Environment], config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{}", err.message());
            std::process::exit(1);
        }
    };
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Gemini Chat (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
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
                        ChatCommand::History => {
                            if session.transcript().is_empty() {
                                renderer.print_info("No messages yet.");
                            } else {
                                render_transcript(session.transcript(), &mut renderer);
                            }
                        }
                        ChatCommand::New => {
                            session = fresh_session(&session);
                            renderer.print_info("Started a new conversation.");
                        }
                        ChatCommand::Model(model_name) => {
                            let model = model_name
                                .parse()
                                .unwrap_or_else(|_| Model::Custom(model_name.clone()));
                            session.set_model(model);
                            renderer.print_info(&format!("Model changed to: {}", model_name));
                        }
                        ChatCommand::System(prompt) => {
                            session.set_system_prompt(prompt.clone());
                            match prompt {
                                Some(p) => {
                                    renderer.print_info(&format!("System prompt set to: {}", p))
                                }
                                None => renderer.print_info("System prompt cleared."),
                            }
                        }
                        ChatCommand::MaxTokens(value) => {
                            session.set_max_tokens(Some(value));
                            renderer.print_info(&format!("max_tokens set to {value}"));
                        }
                        ChatCommand::ClearMaxTokens => {
                            session.set_max_tokens(None);
                            renderer.print_info("max_tokens reset to model default");
                        }
                        ChatCommand::Temperature(value) => {
                            session.set_temperature(Some(value));
                            renderer.print_info(&format!("temperature set to {:.2}", value));
                        }
                        ChatCommand::ClearTemperature => {
                            session.set_temperature(None);
                            renderer.print_info("temperature reset to model default");
                        }
                        ChatCommand::TopP(value) => {
                            session.set_top_p(Some(value));
                            renderer.print_info(&format!("top_p set to {:.2}", value));
                        }
                        ChatCommand::ClearTopP => {
                            session.set_top_p(None);
                            renderer.print_info("top_p reset to model default");
                        }
                        ChatCommand::TopK(value) => {
                            session.set_top_k(Some(value));
                            renderer.print_info(&format!("top_k set to {value}"));
                        }
                        ChatCommand::ClearTopK => {
                            session.set_top_k(None);
                            renderer.print_info("top_k reset to model default");
                        }
                        ChatCommand::Context(mode) => {
                            session.set_context(mode);
                            renderer.print_info(&format!("Context mode set to {mode}"));
                        }
                        ChatCommand::Save(path) => match session.save_transcript_to(&path) {
                            Ok(_) => renderer.print_info(&format!("Transcript saved to {}", path)),
                            Err(err) => {
                                renderer.print_error(&format!("Failed to save transcript: {}", err))
                            }
                        },
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                session.submit(line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
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

/// A new, empty session with the same service and settings.
fn fresh_session(session: &ChatSession<Gemini>) -> ChatSession<Gemini> {
    ChatSession::new(session.service().clone(), session.config().clone())
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Turns: {}", stats.turn_count);
    println!("      Failed turns: {}", stats.failed_turns);
    println!(
        "      Total tokens: {} in / {} out ({} requests)",
        stats.total_prompt_tokens, stats.total_candidate_tokens, stats.total_requests
    );
}

fn print_config(session: &ChatSession) {
    let stats = session.stats();
    println!("    Current Configuration:");
    println!("      Model: {}", stats.model);
    println!("      Context: {}", stats.context);
    println!("      Max tokens: {}", describe_u32(stats.max_tokens));
    println!("      Temperature: {}", describe_float(stats.temperature));
    println!("      Top-p: {}", describe_float(stats.top_p));
    println!("      Top-k: {}", describe_u32(stats.top_k));
    if let Some(prompt) = stats.system_prompt.as_deref() {
        println!("      System prompt: {}", prompt);
    } else {
        println!("      System prompt: (none)");
    }
}

fn describe_float(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}

fn describe_u32(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "default".to_string())
}
