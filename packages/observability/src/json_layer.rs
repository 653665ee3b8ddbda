//! Tracing layer that renders each event as one JSON line.
//!
//! Line fields: timestamp (RFC 3339), level, service, pid, target, message,
//! and, when present, the event's structured fields under `fields`.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

const REDACTED: &str = "[redacted]";

const SENSITIVE_KEYS: [&str; 6] = [
    "api_key",
    "token",
    "authorization",
    "password",
    "secret",
    "cookie",
];

/// Collects an event's message and fields. Anything that is not a number
/// or a bool is stored as text.
#[derive(Default)]
struct Fields {
    message: String,
    values: Map<String, Value>,
}

impl Fields {
    fn put(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
        } else if is_sensitive_key(name) {
            self.values.insert(name.to_string(), Value::from(REDACTED));
        } else {
            self.values.insert(name.to_string(), value);
        }
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }
}

/// JSONL layer writing through any `MakeWriter`.
pub struct JsonLayer<W> {
    service_name: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service_name: String, make_writer: W) -> Self {
        Self {
            service_name,
            pid: std::process::id(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);

        let metadata = event.metadata();
        let mut line = json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            "level": metadata.level().as_str(),
            "service": self.service_name,
            "pid": self.pid,
            "target": metadata.target(),
            "message": fields.message,
        });
        if !fields.values.is_empty() {
            line["fields"] = Value::Object(fields.values);
        }

        let mut writer = self.make_writer.make_writer();
        let _ = writeln!(writer, "{line}");
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|entry| lower.contains(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn event_is_written_as_json_line() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(JsonLayer::new("range-server".to_string(), capture.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(key = "4444", attempts = 3u64, "peer attached");
        });

        let raw = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(raw.trim()).unwrap();
        assert_eq!(line["service"], "range-server");
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["message"], "peer attached");
        assert_eq!(line["fields"]["key"], "4444");
        assert_eq!(line["fields"]["attempts"], 3);
    }

    #[test]
    fn sensitive_fields_are_redacted() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(JsonLayer::new("range-server".to_string(), capture.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(api_key = "hunter2", "credential rejected");
        });

        let raw = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(!raw.contains("hunter2"));
        assert!(raw.contains(REDACTED));
    }

    #[test]
    fn event_without_fields_omits_field_map() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(JsonLayer::new("range-server".to_string(), capture.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("listening");
        });

        let raw = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(raw.trim()).unwrap();
        assert_eq!(line["level"], "DEBUG");
        assert!(line.get("fields").is_none());
    }

    #[test]
    fn sensitive_key_matching() {
        assert!(is_sensitive_key("api_key"));
        assert!(is_sensitive_key("X_API_KEY"));
        assert!(is_sensitive_key("bearer_token"));
        assert!(!is_sensitive_key("port"));
    }
}
