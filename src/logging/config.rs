use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// A log line reported by a browser, e.g. a failed geocode lookup on the
/// quote form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientLogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    /// Page the entry was recorded on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ClientLogBatch {
    pub logs: Vec<ClientLogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
    pub received: usize,
    pub processed: usize,
}

/// Entries accepted per batch; the rest are counted but dropped.
pub const MAX_BATCH_SIZE: usize = 50;
/// Messages longer than this are truncated before logging.
pub const MAX_MESSAGE_CHARS: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_parses_lowercase_level() {
        let entry: ClientLogEntry = serde_json::from_str(
            r#"{"timestamp":"2024-07-21T10:00:00Z","level":"warn","message":"geocode failed"}"#,
        )
        .unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert!(entry.page.is_none());
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let result: Result<ClientLogEntry, _> = serde_json::from_str(
            r#"{"timestamp":"t","level":"fatal","message":"m"}"#,
        );
        assert!(result.is_err());
    }
}
