//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` answers with a sequence of events, each carrying one
//! JSON-encoded [`GenerateContentResponse`] chunk on its `data:` lines.  Events are separated
//! by a blank line, written as either `\n\n` or `\r\n\r\n`.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::{Error, GenerateContentResponse, Result};

/// Process a stream of bytes into a stream of response chunks.
///
/// Bytes are buffered until a whole event is available, so multi-byte characters split
/// across network reads decode correctly.  Comment-only events are skipped.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, false),
        move |(mut stream, mut buffer, mut done)| async move {
            loop {
                if let Some(raw) = take_event(&mut buffer) {
                    match parse_event(&raw) {
                        Some(event) => {
                            record(&event);
                            return Some((event, (stream, buffer, done)));
                        }
                        None => continue,
                    }
                }

                if done {
                    // A final event may arrive without its trailing blank line.
                    if buffer.iter().all(u8::is_ascii_whitespace) {
                        return None;
                    }
                    let raw = std::mem::take(&mut buffer);
                    let event = parse_event(&raw)?;
                    record(&event);
                    return Some((event, (stream, buffer, done)));
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, done)));
                    }
                    None => done = true,
                }
            }
        },
    )
}

fn record(event: &Result<GenerateContentResponse>) {
    match event {
        Ok(_) => STREAM_EVENTS.click(),
        Err(_) => STREAM_ERRORS.click(),
    }
}

/// Remove the first complete event from the buffer, without its delimiter.
fn take_event(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let (end, delimiter_len) = find_delimiter(buffer)?;
    let event = buffer[..end].to_vec();
    buffer.drain(..end + delimiter_len);
    Some(event)
}

fn find_delimiter(buffer: &[u8]) -> Option<(usize, usize)> {
    (0..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else {
            None
        }
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Error { error: ErrorBody },
    Chunk(GenerateContentResponse),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Parse one event.  Returns `None` for events that carry no data.
fn parse_event(raw: &[u8]) -> Option<Result<GenerateContentResponse>> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            return Some(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            )));
        }
    };

    let data = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<Payload>(data) {
        Ok(Payload::Chunk(chunk)) => Some(Ok(chunk)),
        Ok(Payload::Error { error }) => {
            let message = error
                .message
                .unwrap_or_else(|| "the server ended the stream with an error".to_string());
            match error.code {
                Some(code) => Some(Err(Error::from_status(code, error.status, message, None))),
                None => Some(Err(Error::streaming(message, None))),
            }
        }
        Err(e) => Some(Err(Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        ))),
    }
}
