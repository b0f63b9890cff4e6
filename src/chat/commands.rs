//! Slash command parsing for the chat REPL.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the API.

use crate::chat::config::ContextMode;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Re-render the whole transcript.
    History,

    /// End the current session and start a new, empty one.
    New,

    /// Change the model.
    Model(String),

    /// Set or clear the system prompt.
    /// `None` clears the current system prompt.
    System(Option<String>),

    /// Set the maximum tokens per response.
    MaxTokens(u32),

    /// Clear the maximum tokens per response (use model default).
    ClearMaxTokens,

    /// Set the sampling temperature.
    Temperature(f32),

    /// Clear the sampling temperature (use model default).
    ClearTemperature,

    /// Set the top-p value.
    TopP(f32),

    /// Clear the top-p value.
    ClearTopP,

    /// Set the top-k value.
    TopK(u32),

    /// Clear the top-k value.
    ClearTopK,

    /// Choose what the model sees of the conversation.
    Context(ContextMode),

    /// Save the transcript to a file.
    Save(String),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent to the model.
///
/// # Examples
///
/// ```
/// # use gemini_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model gemini-2.5-flash").is_some());
/// assert!(parse_command("Hello, Gemini!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "history" | "transcript" => ChatCommand::History,
        "new" | "reset" => ChatCommand::New,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "system" => ChatCommand::System(argument.map(|s| s.to_string())),
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        "max_tokens" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearMaxTokens,
            _ => parse_u32_command(argument, ChatCommand::MaxTokens, "/max_tokens"),
        },
        "temperature" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTemperature,
            Some(arg) => match parse_f32_in_range(arg, 0.0, 2.0) {
                Ok(value) => ChatCommand::Temperature(value),
                Err(err) => ChatCommand::Invalid(format!("/temperature {err}")),
            },
            None => ChatCommand::Invalid("/temperature requires a value".to_string()),
        },
        "top_p" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTopP,
            Some(arg) => match parse_f32_in_range(arg, 0.0, 1.0) {
                Ok(value) => ChatCommand::TopP(value),
                Err(err) => ChatCommand::Invalid(format!("/top_p {err}")),
            },
            None => ChatCommand::Invalid("/top_p requires a value".to_string()),
        },
        "top_k" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTopK,
            _ => parse_u32_command(argument, ChatCommand::TopK, "/top_k"),
        },
        "context" => match argument.map(str::parse::<ContextMode>) {
            Some(Ok(mode)) => ChatCommand::Context(mode),
            Some(Err(err)) => ChatCommand::Invalid(format!("/context {err}")),
            None => ChatCommand::Invalid(
                "/context requires 'transcript' or 'stateless'".to_string(),
            ),
        },
        "save" => match argument {
            Some(arg) => ChatCommand::Save(arg.to_string()),
            None => ChatCommand::Invalid("/save requires a file path".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

fn parse_u32_command<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(u32) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.parse::<u32>() {
            Ok(value) => constructor(value),
            Err(_) => ChatCommand::Invalid(format!("{name} expects a positive integer")),
        },
        None => ChatCommand::Invalid(format!("{name} requires a value")),
    }
}

fn parse_f32_in_range(value: &str, min: f32, max: f32) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| format!("expects a value between {min} and {max}"))?;
    if parsed.is_finite() && parsed >= min && parsed <= max {
        Ok(parsed)
    } else {
        Err(format!("expects a value between {min} and {max}"))
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /history               Show the whole conversation again
  /new                   End this conversation and start a new one
  /model <name>          Change the model (e.g., /model gemini-2.5-flash)
  /system [prompt]       Set system prompt (no argument clears it)
  /max_tokens <n>        Set maximum response tokens (or 'clear')
  /temperature <v>       Set temperature 0.0-2.0 (or 'clear')
  /top_p <v>             Set top-p 0.0-1.0 (or 'clear')
  /top_k <n>             Set top-k (or 'clear')
  /context <mode>        'transcript' sends earlier turns, 'stateless' does not
  /save <file>           Save the transcript as JSON
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_history_and_new() {
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/HISTORY"), Some(ChatCommand::History));
        assert_eq!(parse_command("/new"), Some(ChatCommand::New));
    }

    #[test]
    fn parse_model() {
        assert_eq!(
            parse_command("/model gemini-2.5-flash"),
            Some(ChatCommand::Model("gemini-2.5-flash".to_string()))
        );
        assert_eq!(
            parse_command("/model   gemini-1.5-pro  "),
            Some(ChatCommand::Model("gemini-1.5-pro".to_string()))
        );
        assert_eq!(
            parse_command("/model"),
            Some(ChatCommand::Invalid(
                "/model requires a model name".to_string()
            ))
        );
    }

    #[test]
    fn parse_system() {
        assert_eq!(
            parse_command("/system You are a helpful assistant"),
            Some(ChatCommand::System(Some(
                "You are a helpful assistant".to_string()
            )))
        );
        assert_eq!(parse_command("/system"), Some(ChatCommand::System(None)));
    }

    #[test]
    fn parse_temperature() {
        assert_eq!(
            parse_command("/temperature 1.5"),
            Some(ChatCommand::Temperature(1.5))
        );
        assert_eq!(
            parse_command("/temperature clear"),
            Some(ChatCommand::ClearTemperature)
        );
        assert!(matches!(
            parse_command("/temperature 2.5"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("between")
        ));
        assert!(matches!(
            parse_command("/temperature"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
    }

    #[test]
    fn parse_sampling_limits() {
        assert_eq!(parse_command("/top_p 0.5"), Some(ChatCommand::TopP(0.5)));
        assert_eq!(parse_command("/top_k 40"), Some(ChatCommand::TopK(40)));
        assert_eq!(parse_command("/top_k clear"), Some(ChatCommand::ClearTopK));
        assert_eq!(
            parse_command("/max_tokens 512"),
            Some(ChatCommand::MaxTokens(512))
        );
        assert_eq!(
            parse_command("/max_tokens clear"),
            Some(ChatCommand::ClearMaxTokens)
        );
        assert!(matches!(
            parse_command("/max_tokens lots"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("positive integer")
        ));
    }

    #[test]
    fn parse_context() {
        assert_eq!(
            parse_command("/context stateless"),
            Some(ChatCommand::Context(ContextMode::Stateless))
        );
        assert_eq!(
            parse_command("/context transcript"),
            Some(ChatCommand::Context(ContextMode::Transcript))
        );
        assert!(matches!(
            parse_command("/context maybe"),
            Some(ChatCommand::Invalid(msg)) if msg.starts_with("/context expects")
        ));
    }

    #[test]
    fn parse_save() {
        assert_eq!(
            parse_command("/save session.json"),
            Some(ChatCommand::Save("session.json".to_string()))
        );
        assert!(matches!(
            parse_command("/save"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_stats_and_config() {
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/config"), Some(ChatCommand::ShowConfig));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/clear"),
            Some(ChatCommand::Invalid("Unknown command: /clear".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello, Gemini!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_lists_commands() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/history"));
        assert!(help.contains("/model"));
        assert!(help.contains("/context"));
    }
}
