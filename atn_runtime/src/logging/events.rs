//! Log events emitted by the runtime

use super::codes::{self, Code};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    #[serde(rename = "ERROR")]
    Error = 0,
    #[serde(rename = "WARN")]
    Warning = 1,
    #[serde(rename = "INFO")]
    Info = 2,
    #[serde(rename = "DEBUG")]
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One event. `grammar` names the recognizer that was running on the
/// emitting thread, if any.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

/// Registry metadata attached to error events in JSON output
#[derive(Serialize)]
struct ErrorDetails {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    event: &'a LogEvent,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<ErrorDetails>,
}

impl LogEvent {
    pub fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate_message(message),
            grammar: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    /// Uncoded warning
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, codes::UNCODED_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, codes::UNCODED_INFO, message)
    }

    /// Info event carrying a success code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, codes::UNCODED_DEBUG, message)
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_grammar(mut self, grammar: &str) -> Self {
        self.grammar = Some(grammar.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    /// Decision number from the context, for prediction events
    pub fn decision(&self) -> Option<usize> {
        self.context.get("decision").and_then(|d| d.parse().ok())
    }

    /// `[LEVEL] CODE [grammar] - message (k=v, ...)`
    pub fn format(&self) -> String {
        let mut output = format!("[{}] {}", self.level.as_str(), self.code);
        if let Some(grammar) = &self.grammar {
            output.push_str(&format!(" [{}]", grammar));
        }
        output.push_str(" - ");
        output.push_str(&self.message);

        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" ({})", pairs.join(", ")));
        }

        output
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let code = self.code.as_str();
        let record = JsonRecord {
            event: self,
            category: self.category(),
            severity: self.severity(),
            error_metadata: self.is_error().then(|| ErrorDetails {
                recoverable: codes::is_recoverable(code),
                requires_halt: codes::requires_halt(code),
                description: codes::get_description(code),
                recommended_action: codes::get_action(code),
            }),
        };
        serde_json::to_string(&record)
    }
}

fn truncate_message(message: &str) -> String {
    let limit = super::config::get_max_log_message_length();
    match message.char_indices().nth(limit) {
        None => message.to_string(),
        Some((end, _)) => format!("{}...", &message[..end]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_metadata() {
        let event = LogEvent::error(codes::prediction::NO_VIABLE_ALTERNATIVE, "no viable alt");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E040");
        assert_eq!(event.category(), "Prediction");
    }

    #[test]
    fn test_format_includes_grammar_and_context() {
        let event = LogEvent::warning_with_code(codes::prediction::AMBIGUITY, "ambiguity")
            .with_grammar("Expr")
            .with_context("decision", "3")
            .with_context("alts", "{1, 2}");

        assert!(event.is_warning());
        assert_eq!(event.decision(), Some(3));
        assert_eq!(
            event.format(),
            format!(
                "[WARN] {} [Expr] - ambiguity (alts={{1, 2}}, decision=3)",
                codes::prediction::AMBIGUITY
            )
        );
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::lexer::TOKEN_RECOGNITION_ERROR, "bad char")
            .with_context("index", "7");

        let json = event.format_json().unwrap();
        assert!(json.contains("\"level\":\"ERROR\""));
        assert!(json.contains("\"code\":\"E060\""));
        assert!(json.contains("\"index\":\"7\""));
        assert!(json.contains("\"recoverable\":true"));
        assert!(!json.contains("\"grammar\""));

        let info = LogEvent::info("loaded").format_json().unwrap();
        assert!(!info.contains("error_metadata"));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let limit = crate::logging::config::get_max_log_message_length();
        let message = "x".repeat(limit + 50);
        let event = LogEvent::info(&message);
        assert_eq!(event.message.chars().count(), limit + 3);
    }
}
