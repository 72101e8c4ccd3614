// Push adapter: Firebase RTDB event stream (put/patch records, keep-alive, cancel/auth_revoked)

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::Deserialize;
use std::collections::VecDeque;

use super::read_json;
use crate::config::PushConfig;
use crate::error::SourceError;
use crate::models::PushRecord;

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Longest line accepted before the stream is treated as malformed.
pub const MAX_LINE_BYTES: usize = 256 * 1024;

/// Incremental `text/event-stream` decoder. Chunks may split lines (and UTF-8
/// sequences) anywhere.
#[derive(Debug, Default)]
pub struct SseParser {
    line: Vec<u8>,
    event: String,
    data: Vec<String>,
}

impl SseParser {
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, SourceError> {
        let mut out = Vec::new();
        for &b in chunk {
            if b == b'\n' {
                let line = std::mem::take(&mut self.line);
                self.handle_line(line, &mut out);
            } else if self.line.len() >= MAX_LINE_BYTES {
                self.line.clear();
                return Err(SourceError::Malformed(serde::de::Error::custom(format!(
                    "event stream line exceeds {MAX_LINE_BYTES} bytes"
                ))));
            } else {
                self.line.push(b);
            }
        }
        Ok(out)
    }

    fn handle_line(&mut self, mut raw: Vec<u8>, out: &mut Vec<SseEvent>) {
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        let line = String::from_utf8_lossy(&raw);
        if line.is_empty() {
            if !self.event.is_empty() || !self.data.is_empty() {
                let event = std::mem::take(&mut self.event);
                out.push(SseEvent {
                    event: if event.is_empty() {
                        "message".into()
                    } else {
                        event
                    },
                    data: self.data.join("\n"),
                });
                self.data.clear();
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line.as_ref(), ""),
        };
        match field {
            "event" => self.event = value.to_string(),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Record(PushRecord),
    /// keep-alive, null data, nested paths, unknown events.
    Ignored,
    /// The server revoked or cancelled the subscription.
    Closed(String),
}

#[derive(Deserialize)]
struct Envelope {
    path: String,
    data: serde_json::Value,
}

pub fn interpret(event: &SseEvent) -> Result<StreamUpdate, SourceError> {
    match event.event.as_str() {
        "put" | "patch" => {
            let envelope: Envelope = serde_json::from_str(&event.data)?;
            record_at(&envelope.path, envelope.data)
        }
        "cancel" | "auth_revoked" => Ok(StreamUpdate::Closed(event.event.clone())),
        _ => Ok(StreamUpdate::Ignored),
    }
}

/// `/` carries the whole (or partial, for patch) record; `/tempIn` carries one field.
fn record_at(path: &str, data: serde_json::Value) -> Result<StreamUpdate, SourceError> {
    if data.is_null() {
        return Ok(StreamUpdate::Ignored);
    }
    let key = path.trim_matches('/');
    let body = if key.is_empty() {
        data
    } else if !key.contains('/') {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), data);
        serde_json::Value::Object(map)
    } else {
        return Ok(StreamUpdate::Ignored);
    };
    if !body.is_object() {
        return Ok(StreamUpdate::Ignored);
    }
    let record: PushRecord = serde_json::from_value(body)?;
    if record.is_empty() {
        Ok(StreamUpdate::Ignored)
    } else {
        Ok(StreamUpdate::Record(record))
    }
}

/// Client for the single "latest telemetry" record.
#[derive(Clone)]
pub struct FirebaseStream {
    client: reqwest::Client,
    database_url: String,
    path: String,
    auth: Option<String>,
}

impl FirebaseStream {
    pub fn new(client: reqwest::Client, config: &PushConfig) -> Self {
        Self {
            client,
            database_url: config.database_url.clone(),
            path: config.path.clone(),
            auth: config.auth.clone(),
        }
    }

    pub fn record_url(&self) -> String {
        let mut url = format!(
            "{}/{}.json",
            self.database_url.trim_end_matches('/'),
            self.path.trim_matches('/')
        );
        if let Some(auth) = self.auth.as_deref().filter(|a| !a.is_empty()) {
            url.push_str("?auth=");
            url.push_str(auth);
        }
        url
    }

    pub async fn open(&self) -> Result<EventStream, SourceError> {
        let response = self
            .client
            .get(self.record_url())
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        Ok(EventStream {
            body: response.bytes_stream().boxed(),
            parser: SseParser::default(),
            pending: VecDeque::new(),
        })
    }

    /// Replaces the whole record (PUT).
    pub async fn write_record(&self, record: &PushRecord) -> Result<(), SourceError> {
        let response = self
            .client
            .put(self.record_url())
            .json(record)
            .send()
            .await?;
        let _: serde_json::Value = read_json(response).await?;
        Ok(())
    }
}

/// Record written by the `push_dummy` demo.
pub fn sample_record() -> PushRecord {
    PushRecord {
        temp_in: Some(23.5),
        temp_out: Some(30.1),
        hum_in: Some(55.0),
        hum_out: Some(48.0),
        pressure: Some(1013.0),
        rainfall: Some(2.5),
        wind_direction: Some("NE".into()),
        wind_speed: Some(3.2),
        wind_avg: Some(2.8),
    }
}

/// An open subscription; yields one record per relevant event.
pub struct EventStream {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    parser: SseParser,
    pending: VecDeque<SseEvent>,
}

impl EventStream {
    /// Next record. `Ok(None)` when the server closed the connection.
    pub async fn next_record(&mut self) -> Result<Option<PushRecord>, SourceError> {
        loop {
            while let Some(event) = self.pending.pop_front() {
                match interpret(&event) {
                    Ok(StreamUpdate::Record(record)) => return Ok(Some(record)),
                    Ok(StreamUpdate::Ignored) => {}
                    Ok(StreamUpdate::Closed(reason)) => {
                        return Err(SourceError::StreamClosed(reason));
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            operation = "interpret_push_event",
                            event = %event.event,
                            "Skipping malformed push event"
                        );
                    }
                }
            }
            match self.body.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.parser.feed(&chunk)?),
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }
}
