//! Stdio framing: line-delimited or `Content-Length`-prefixed JSON-RPC
//! (spec §4.2), auto-detected per message on read and remembered for
//! the matching write.
//!
//! A single shared stdout mutex is the sole writer, matching
//! `turbomcp-stdio::transport::StdioTransport`'s split between a
//! `std::sync::Mutex` for state that never crosses `.await` and a
//! `tokio::sync::Mutex` for the I/O handle that does.

use gasoline_protocol::{JsonRpcErrorCode, JsonRpcResponse, ResponseId};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    Line,
    ContentLength,
}

/// The most recently observed framing mode, shared between the stdin
/// reader and the stdout writer (including the push-notification
/// forwarder, which has no input frame of its own to key off).
#[derive(Debug, Default)]
pub struct FramingState {
    content_length: AtomicBool,
}

impl FramingState {
    #[must_use]
    pub fn current(&self) -> FramingMode {
        if self.content_length.load(Ordering::Relaxed) {
            FramingMode::ContentLength
        } else {
            FramingMode::Line
        }
    }

    fn note(&self, mode: FramingMode) {
        self.content_length.store(mode == FramingMode::ContentLength, Ordering::Relaxed);
    }
}

fn parse_content_length(line: &str) -> Option<usize> {
    line.strip_prefix("Content-Length:")?.trim().parse().ok()
}

/// Read the next JSON-RPC message off `reader`, blank lines skipped.
/// Returns `Ok(None)` at EOF.
pub async fn read_message<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    state: &FramingState,
) -> std::io::Result<Option<String>> {
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(len) = parse_content_length(trimmed) {
            // Consume any remaining header lines up to the blank separator.
            loop {
                let mut header_line = String::new();
                if reader.read_line(&mut header_line).await? == 0 {
                    return Ok(None);
                }
                if header_line.trim().is_empty() {
                    break;
                }
            }
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body).await?;
            state.note(FramingMode::ContentLength);
            return Ok(Some(String::from_utf8_lossy(&body).into_owned()));
        }

        state.note(FramingMode::Line);
        return Ok(Some(trimmed.to_string()));
    }
}

/// The sole stdout writer. Shared by the request/response loop and the
/// push-notification forwarder (spec §4.2/§4.7: "all writes serialize
/// on a single stdout mutex").
pub struct StdoutWriter {
    stdout: tokio::sync::Mutex<tokio::io::Stdout>,
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutWriter {
    #[must_use]
    pub fn new() -> Self {
        Self { stdout: tokio::sync::Mutex::new(tokio::io::stdout()) }
    }

    /// Write one framed message. If `payload` is not valid JSON, a
    /// JSON-RPC error envelope is emitted in its place rather than raw
    /// (possibly malformed) bytes.
    pub async fn write_frame(&self, mode: FramingMode, payload: &str) -> std::io::Result<()> {
        let trimmed = payload.trim();
        let body = if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
            trimmed.to_string()
        } else {
            JsonRpcResponse::error(ResponseId::null(), JsonRpcErrorCode::ParseError.into())
                .to_value()
                .to_string()
        };

        let mut stdout = self.stdout.lock().await;
        match mode {
            FramingMode::Line => {
                stdout.write_all(body.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            FramingMode::ContentLength => {
                let header = format!("Content-Length: {}\r\n\r\n", body.len());
                stdout.write_all(header.as_bytes()).await?;
                stdout.write_all(body.as_bytes()).await?;
            }
        }
        stdout.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn reads_line_mode_message_and_notes_mode() {
        let state = FramingState::default();
        let mut reader = BufReader::new(Cursor::new(b"{\"a\":1}\n".to_vec()));
        let msg = read_message(&mut reader, &state).await.unwrap().unwrap();
        assert_eq!(msg, "{\"a\":1}");
        assert_eq!(state.current(), FramingMode::Line);
    }

    #[tokio::test]
    async fn reads_content_length_mode_message_and_notes_mode() {
        let state = FramingState::default();
        let body = b"{\"a\":1}";
        let mut input = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
        input.extend_from_slice(body);
        let mut reader = BufReader::new(Cursor::new(input));
        let msg = read_message(&mut reader, &state).await.unwrap().unwrap();
        assert_eq!(msg, "{\"a\":1}");
        assert_eq!(state.current(), FramingMode::ContentLength);
    }

    #[tokio::test]
    async fn eof_returns_none() {
        let state = FramingState::default();
        let mut reader = BufReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(read_message(&mut reader, &state).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_lines_between_messages_are_skipped() {
        let state = FramingState::default();
        let mut reader = BufReader::new(Cursor::new(b"\n\n{\"a\":1}\n".to_vec()));
        let msg = read_message(&mut reader, &state).await.unwrap().unwrap();
        assert_eq!(msg, "{\"a\":1}");
    }
}
