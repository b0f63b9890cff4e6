use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("gemini_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("gemini_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("gemini_chat.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("gemini_chat.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("gemini_chat.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("gemini_chat.stream.bytes");

pub(crate) static SESSION_TURNS: Counter = Counter::new("gemini_chat.session.turns");
pub(crate) static SESSION_FAILED_TURNS: Counter =
    Counter::new("gemini_chat.session.failed_turns");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("gemini_chat.session.turn_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_FAILED_TURNS);
    collector.register_moments(&SESSION_TURN_DURATION);
}
