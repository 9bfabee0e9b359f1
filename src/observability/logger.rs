//! Structured JSON logger
//!
//! One log line per event, built by hand so key order is deterministic:
//! `event` first, `severity` second, then caller fields sorted by key.
//! Writes are synchronous with no buffering.

use std::fmt;
use std::io::{self, Write};

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured logger with deterministic output.
pub struct Logger;

impl Logger {
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(severity, event, fields, &mut io::stdout());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut line = String::with_capacity(256);
        line.push_str("{\"event\":\"");
        Self::escape(&mut line, event);
        line.push_str("\",\"severity\":\"");
        line.push_str(severity.as_str());
        line.push('"');

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);
        for (key, value) in sorted {
            line.push_str(",\"");
            Self::escape(&mut line, key);
            line.push_str("\":\"");
            Self::escape(&mut line, value);
            line.push('"');
        }
        line.push_str("}\n");

        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    fn escape(out: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(Severity::Error, event, fields, &mut io::stderr());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut buffer = Vec::new();
        Logger::log_to_writer(severity, event, fields, &mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_valid_json_one_line() {
        let line = capture(Severity::Info, "cache.hit", &[("key", "abc")]);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "cache.hit");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["key"], "abc");
    }

    #[test]
    fn test_field_order_is_deterministic() {
        let a = capture(Severity::Info, "e", &[("z", "1"), ("a", "2")]);
        let b = capture(Severity::Info, "e", &[("a", "2"), ("z", "1")]);
        assert_eq!(a, b);
        assert!(a.find("\"a\"").unwrap() < a.find("\"z\"").unwrap());
    }

    #[test]
    fn test_escapes_quotes_and_newlines() {
        let line = capture(Severity::Warn, "e", &[("msg", "a \"b\"\nc")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], "a \"b\"\nc");
    }
}
