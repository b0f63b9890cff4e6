//! Chat sessions driven through the public API with a scripted completion service.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use gemini_chat::chat::{ChatConfig, ChatSession, ContextMode, SecretsFile, take_turn};
use gemini_chat::{
    Completion, CompletionRequest, CompletionService, Error, NullRenderer, Renderer, Result, Role,
    Transcript, Turn, render_transcript,
};

/// Answers from a queue of canned results.
struct Scripted {
    replies: Mutex<VecDeque<Result<Completion>>>,
    calls: Mutex<usize>,
}

impl Scripted {
    fn new(replies: Vec<Result<Completion>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CompletionService for Scripted {
    async fn generate(&self, _request: &CompletionRequest) -> Result<Completion> {
        *self.calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::unknown("script exhausted")))
    }
}

/// Always answers with a numbered reply.
struct Counting {
    next: Mutex<usize>,
}

#[async_trait]
impl CompletionService for Counting {
    async fn generate(&self, _request: &CompletionRequest) -> Result<Completion> {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        Ok(Completion::text(format!("reply {}", *next)))
    }
}

/// Collects everything rendered, tagged by kind.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl Renderer for Recorder {
    fn start_turn(&mut self, role: Role) {
        self.events.push(format!("turn:{role}"));
    }
    fn print_text(&mut self, text: &str) {
        self.events.push(format!("text:{text}"));
    }
    fn print_error(&mut self, error: &str) {
        self.events.push(format!("error:{error}"));
    }
    fn print_info(&mut self, info: &str) {
        self.events.push(format!("info:{info}"));
    }
    fn start_waiting(&mut self) {
        self.events.push("waiting".to_string());
    }
    fn stop_waiting(&mut self) {
        self.events.push("done waiting".to_string());
    }
    fn finish_response(&mut self) {
        self.events.push("finish".to_string());
    }
}

#[tokio::test]
async fn n_inputs_produce_2n_alternating_turns() {
    let service = Counting {
        next: Mutex::new(0),
    };
    let mut session = ChatSession::new(service, ChatConfig::default());
    let inputs = ["first", "second", "third", "fourth", "fifth"];
    for input in inputs {
        session.respond(input).await;
    }

    let turns = session.transcript().all();
    assert_eq!(turns.len(), 2 * inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        assert_eq!(turns[2 * i], Turn::user(*input));
        assert_eq!(turns[2 * i + 1], Turn::assistant(format!("reply {}", i + 1)));
    }
}

#[tokio::test]
async fn hello_gets_hi() {
    let service = Scripted::new(vec![Ok(Completion::text("hi"))]);
    let mut session = ChatSession::new(service, ChatConfig::default());
    session.respond("hello").await;
    assert_eq!(
        session.transcript().all(),
        &[Turn::user("hello"), Turn::assistant("hi")]
    );
}

#[tokio::test]
async fn quota_error_is_recorded_and_session_continues() {
    let service = Scripted::new(vec![
        Err(Error::rate_limit("quota exceeded", Some(30))),
        Ok(Completion::text("fine now")),
    ]);
    let mut session = ChatSession::new(service, ChatConfig::default());

    let turn = session.respond("one").await;
    assert_eq!(turn.role(), Role::Assistant);
    assert_eq!(turn.content(), "Error: quota exceeded");

    let turn = session.respond("two").await;
    assert_eq!(turn.content(), "fine now");
    assert_eq!(session.transcript().len(), 4);
    assert_eq!(session.service().calls(), 2);
}

#[tokio::test]
async fn blocked_response_is_recorded() {
    let service = Scripted::new(vec![Err(Error::blocked(
        "the prompt was blocked (SAFETY)",
        Some("SAFETY".to_string()),
    ))]);
    let mut session = ChatSession::new(service, ChatConfig::default());
    let turn = session.respond("something risky").await;
    assert_eq!(turn.content(), "Error: the prompt was blocked (SAFETY)");
    assert!(turn.is_error());
}

#[tokio::test]
async fn submit_renders_the_answer() {
    let service = Scripted::new(vec![Ok(Completion::text("hi"))]);
    let mut session = ChatSession::new(service, ChatConfig::default());
    let mut recorder = Recorder::default();
    session.submit("hello", &mut recorder).await;
    assert_eq!(
        recorder.events,
        vec!["turn:assistant", "waiting", "text:hi", "done waiting", "finish"]
    );
}

#[tokio::test]
async fn submit_renders_the_failure() {
    let service = Scripted::new(vec![Err(Error::timeout("request timed out", Some(60.0)))]);
    let mut session = ChatSession::new(service, ChatConfig::default());
    let mut recorder = Recorder::default();
    session.submit("hello", &mut recorder).await;
    assert!(
        recorder
            .events
            .contains(&"error:Error: request timed out".to_string())
    );
    assert_eq!(recorder.events.last().map(String::as_str), Some("finish"));
}

#[tokio::test]
async fn reads_are_stable() {
    let service = Scripted::new(vec![Ok(Completion::text("a")), Ok(Completion::text("b"))]);
    let mut session = ChatSession::new(service, ChatConfig::default());
    session.respond("1").await;
    let before = session.transcript().all().to_vec();
    assert_eq!(session.transcript().all(), session.transcript().all());

    session.respond("2").await;
    let after = session.transcript().all();
    assert_eq!(&after[..before.len()], before.as_slice());
    assert_eq!(after.len(), before.len() + 2);
}

#[tokio::test]
async fn take_turn_on_bare_transcript() {
    let service = Scripted::new(vec![Ok(Completion::text("pong"))]);
    let config = ChatConfig::default().with_context(ContextMode::Stateless);
    let mut transcript = Transcript::new();
    let outcome = take_turn(&service, &config, &mut transcript, "ping", &mut NullRenderer).await;
    assert!(outcome.succeeded);
    assert_eq!(
        transcript.all(),
        &[Turn::user("ping"), Turn::assistant("pong")]
    );
}

#[test]
fn history_replays_every_turn() {
    let service = Scripted::new(vec![
        Ok(Completion::text("hi")),
        Err(Error::connection("network unreachable", None)),
    ]);
    let mut session = ChatSession::new(service, ChatConfig::default());
    tokio_test::block_on(async {
        session.respond("hello").await;
        session.respond("again").await;
    });

    let mut recorder = Recorder::default();
    render_transcript(session.transcript(), &mut recorder);
    assert_eq!(
        recorder.events,
        vec![
            "turn:user",
            "text:hello",
            "finish",
            "turn:assistant",
            "text:hi",
            "finish",
            "turn:user",
            "text:again",
            "finish",
            "turn:assistant",
            "error:Error: network unreachable",
            "finish",
        ]
    );
}

#[test]
fn missing_credential_halts_before_any_turn() {
    let secrets = SecretsFile::new("/nonexistent/gemini-chat/secrets.toml");
    let environment: HashMap<String, String> = HashMap::new();
    let mut constructed = false;
    let result = ChatSession::bootstrap(&[&secrets, &environment], ChatConfig::default(), |_| {
        constructed = true;
        Ok(Scripted::new(vec![]))
    });
    let err = match result {
        Ok(_) => panic!("session should not start without a key"),
        Err(err) => err,
    };
    assert!(err.is_configuration());
    assert!(err.message().contains("GOOGLE_API_KEY"));
    assert!(!constructed);
}
