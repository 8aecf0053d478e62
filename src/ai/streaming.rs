use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

/// `{"error": {...}}` payload a provider sends when it fails mid-stream.
#[derive(Debug, Deserialize)]
struct StreamFailure {
    error: serde_json::Value,
}

impl StreamFailure {
    fn message(&self) -> String {
        match self.error.get("message").and_then(|m| m.as_str()) {
            Some(message) => message.to_string(),
            None => match self.error.as_str() {
                Some(text) => text.to_string(),
                None => self.error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Token(String),
    Done,
    /// The provider reported a failure; no further events follow.
    Error(String),
}

/// Incremental decoder for chat-completion server-sent events.
///
/// Bytes may be split anywhere, including inside a UTF-8 sequence, so
/// incomplete lines stay buffered until their newline arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.decode_line(&line, &mut events);
            if self.finished {
                break;
            }
        }

        events
    }

    /// Decode whatever is still buffered once the body has ended. The last
    /// line of a stream may arrive without its newline.
    pub fn finish_input(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if self.finished || self.buffer.is_empty() {
            return events;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line, &mut events);
        events
    }

    /// True once `[DONE]`, a finish reason or an error has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn decode_line(&mut self, line: &[u8], events: &mut Vec<SseEvent>) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();

        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            self.finish(events);
            return;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                for choice in chunk.choices {
                    if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                        events.push(SseEvent::Token(content));
                    }
                    if choice.finish_reason.is_some() {
                        self.finish(events);
                        return;
                    }
                }
            }
            Err(e) => match serde_json::from_str::<StreamFailure>(data) {
                Ok(failure) => {
                    self.finished = true;
                    self.buffer.clear();
                    events.push(SseEvent::Error(failure.message()));
                }
                Err(_) => log::debug!("Skipping unparseable stream line: {}", e),
            },
        }
    }

    fn finish(&mut self, events: &mut Vec<SseEvent>) {
        self.finished = true;
        self.buffer.clear();
        events.push(SseEvent::Done);
    }
}
