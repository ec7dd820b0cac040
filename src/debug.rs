use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSONL event sink with named counters folded into a summary record.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    pub fn log_json(&self, json: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{json}");
        }
    }

    /// One `{"type":<event>,"name":<name>,...}` record with integer fields.
    pub fn log_event(&self, event: &str, name: &str, fields: &[(&str, u64)]) {
        let mut json = format!(
            "{{\"type\":\"{}\",\"name\":\"{}\"",
            json_escape(event),
            json_escape(name)
        );
        for (key, value) in fields {
            json.push_str(&format!(",\"{}\":{}", json_escape(key), value));
        }
        json.push('}');
        self.log_json(&json);
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    /// Writes the accumulated counters under `context` and resets them.
    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let counts_json = json_object(&counters);
            let json = format!(
                "{{\"type\":\"debug.summary\",\"context\":\"{}\",\"counts\":{}}}",
                json_escape(context),
                counts_json
            );
            let _ = writeln!(state.writer, "{json}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

fn json_object(entries: &[(String, u64)]) -> String {
    let mut out = String::from("{");
    for (idx, (key, value)) in entries.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&format!("\"{}\":{}", json_escape(key), value));
    }
    out.push('}');
    out
}

pub(crate) fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_path;

    #[test]
    fn summary_sorts_and_resets_counters() {
        let path = temp_path("debug_summary.jsonl");
        let logger = DebugLogger::new(&path).unwrap();
        logger.increment("layer.render", 2);
        logger.increment("font_cache.hit", 1);
        logger.increment("layer.render", 1);
        logger.emit_summary("scene");
        logger.emit_summary("empty");
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "{\"type\":\"debug.summary\",\"context\":\"scene\",\"counts\":{\"font_cache.hit\":1,\"layer.render\":3}}"
        );
        assert_eq!(
            lines[1],
            "{\"type\":\"debug.summary\",\"context\":\"empty\",\"counts\":{}}"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn events_escape_names() {
        let path = temp_path("debug_event.jsonl");
        let logger = DebugLogger::new(&path).unwrap();
        logger.log_event("layer.render", "te\"xt", &[("items", 4)]);
        logger.flush();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.trim_end(),
            "{\"type\":\"layer.render\",\"name\":\"te\\\"xt\",\"items\":4}"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn escape_handles_control_characters() {
        assert_eq!(json_escape("a\tb\u{1}"), "a\\tb\\u0001");
    }
}
