//! Browser front end for Gemini chat sessions.
//!
//! Serves a single chat page and the JSON session API on `--bind`
//! (default `127.0.0.1:8501`).  Each browser tab gets its own session.
//!
//! ```bash
//! gemini-chat-web --bind 0.0.0.0:8501 --secrets /etc/gemini/secrets.toml
//! ```

use std::time::Duration;

use arrrg::CommandLine;

use gemini_chat::chat::{
    ChatArgs, ChatConfig, CredentialSource, Environment, SecretsFile, resolve_api_key,
};
use gemini_chat::web::{AppState, build_router};
use gemini_chat::{Gemini, Result};

fn connect(config: &ChatConfig) -> Result<Gemini> {
    let secrets = SecretsFile::new(config.secrets_path.clone());
    let sources: [&dyn CredentialSource; 2] = [&secrets, &Environment];
    let api_key = resolve_api_key(&sources)?;
    Gemini::new(api_key)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("gemini-chat-web [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = match connect(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", err.message());
            std::process::exit(1);
        }
    };

    let bind = config.bind.clone();
    let state = AppState::new(client, config);
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            sweeper.evict_idle();
        }
    });

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    println!("Gemini Chat listening on http://{bind}");
    axum::serve(listener, router).await?;
    Ok(())
}
