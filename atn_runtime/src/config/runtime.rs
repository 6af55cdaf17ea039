// RUNTIME PREFERENCES (tuning knobs within the compile-time ceilings)

use super::compile_time;
use crate::logging::codes;
use crate::simulator::PredictionMode;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors raised while loading or validating runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{setting} = {value} exceeds the compile-time ceiling {ceiling}")]
    LimitExceeded {
        setting: &'static str,
        value: usize,
        ceiling: usize,
    },

    #[error("{setting} must be greater than zero")]
    ZeroLimit { setting: &'static str },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConfigError::Io { .. } => codes::config::CONFIG_IO_ERROR,
            ConfigError::Parse(_) => codes::config::INVALID_CONFIG,
            ConfigError::LimitExceeded { .. } | ConfigError::ZeroLimit { .. } => {
                codes::config::LIMIT_OUT_OF_RANGE
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionPreferences {
    /// SLL only, SLL with LL fallback, or LL with exact ambiguity detection
    pub mode: PredictionMode,

    /// Whether DFA states and edges are read and written (off = always simulate)
    pub enable_dfa_cache: bool,

    /// Lookahead ceiling for a single prediction (bounded by MAX_LOOKAHEAD_SYMBOLS)
    pub max_lookahead: usize,

    /// Whether to report context sensitivity after a successful LL fallback
    pub report_context_sensitivity: bool,

    /// Whether conflicts resolved in SLL-only mode are reported as ambiguities
    pub report_sll_conflicts: bool,

    /// Whether to emit a debug event for every DFA cache miss
    pub log_dfa_misses: bool,

    /// On a dead end, predict an alternative that already left the decision
    /// rule instead of failing, so the caller reports the error past the rule
    pub recover_at_rule_end: bool,
}

impl Default for PredictionPreferences {
    fn default() -> Self {
        Self {
            mode: env::var("ATN_PREDICTION_MODE")
                .ok()
                .and_then(|v| PredictionMode::parse(&v))
                .unwrap_or(PredictionMode::Ll),
            enable_dfa_cache: env::var("ATN_PREDICTION_ENABLE_DFA_CACHE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            max_lookahead: env::var("ATN_PREDICTION_MAX_LOOKAHEAD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(compile_time::prediction::MAX_LOOKAHEAD_SYMBOLS),
            report_context_sensitivity: env::var("ATN_PREDICTION_REPORT_CONTEXT_SENSITIVITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            report_sll_conflicts: env::var("ATN_PREDICTION_REPORT_SLL_CONFLICTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_dfa_misses: env::var("ATN_PREDICTION_LOG_DFA_MISSES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            recover_at_rule_end: env::var("ATN_PREDICTION_RECOVER_AT_RULE_END")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerPreferences {
    /// Whether the lexer DFA cache is used
    pub enable_dfa_cache: bool,

    /// Longest token accepted before the match is aborted
    pub max_token_length: usize,

    /// Whether to emit a debug event per committed token
    pub log_tokens: bool,
}

impl Default for LexerPreferences {
    fn default() -> Self {
        Self {
            enable_dfa_cache: env::var("ATN_LEXER_ENABLE_DFA_CACHE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            max_token_length: env::var("ATN_LEXER_MAX_TOKEN_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(compile_time::lexer::MAX_TOKEN_LENGTH),
            log_tokens: env::var("ATN_LEXER_LOG_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("ATN_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("ATN_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("ATN_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
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

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub prediction: PredictionPreferences,
    pub lexer: LexerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections and keys fall back to defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check runtime preferences against the compile-time ceilings
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_limit(
            "prediction.max_lookahead",
            self.prediction.max_lookahead,
            compile_time::prediction::MAX_LOOKAHEAD_SYMBOLS,
        )?;
        check_limit(
            "lexer.max_token_length",
            self.lexer.max_token_length,
            compile_time::lexer::MAX_TOKEN_LENGTH,
        )?;
        Ok(())
    }
}

fn check_limit(setting: &'static str, value: usize, ceiling: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroLimit { setting });
    }
    if value > ceiling {
        return Err(ConfigError::LimitExceeded {
            setting,
            value,
            ceiling,
        });
    }
    Ok(())
}

/// Environment variable names for configuration
pub mod env_vars {
    // Prediction
    pub const PREDICTION_MODE: &str = "ATN_PREDICTION_MODE";
    pub const PREDICTION_ENABLE_DFA_CACHE: &str = "ATN_PREDICTION_ENABLE_DFA_CACHE";
    pub const PREDICTION_MAX_LOOKAHEAD: &str = "ATN_PREDICTION_MAX_LOOKAHEAD";
    pub const PREDICTION_REPORT_CONTEXT_SENSITIVITY: &str =
        "ATN_PREDICTION_REPORT_CONTEXT_SENSITIVITY";
    pub const PREDICTION_REPORT_SLL_CONFLICTS: &str = "ATN_PREDICTION_REPORT_SLL_CONFLICTS";
    pub const PREDICTION_LOG_DFA_MISSES: &str = "ATN_PREDICTION_LOG_DFA_MISSES";
    pub const PREDICTION_RECOVER_AT_RULE_END: &str = "ATN_PREDICTION_RECOVER_AT_RULE_END";

    // Lexer
    pub const LEXER_ENABLE_DFA_CACHE: &str = "ATN_LEXER_ENABLE_DFA_CACHE";
    pub const LEXER_MAX_TOKEN_LENGTH: &str = "ATN_LEXER_MAX_TOKEN_LENGTH";
    pub const LEXER_LOG_TOKENS: &str = "ATN_LEXER_LOG_TOKENS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ATN_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ATN_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ATN_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [prediction]
            mode = "sll"
            enable_dfa_cache = false
            "#,
        )
        .unwrap();

        assert_eq!(config.prediction.mode, PredictionMode::Sll);
        assert!(!config.prediction.enable_dfa_cache);
        assert_eq!(config.lexer, LexerPreferences::default());
    }

    #[test]
    fn test_lookahead_above_ceiling_is_rejected() {
        let source = format!(
            "[prediction]\nmax_lookahead = {}\n",
            compile_time::prediction::MAX_LOOKAHEAD_SYMBOLS + 1
        );
        let err = RuntimeConfig::from_toml_str(&source).unwrap_err();
        assert_matches!(
            err,
            ConfigError::LimitExceeded {
                setting: "prediction.max_lookahead",
                ..
            }
        );
        assert_eq!(err.error_code(), codes::config::LIMIT_OUT_OF_RANGE);
    }

    #[test]
    fn test_zero_token_length_is_rejected() {
        let err = RuntimeConfig::from_toml_str("[lexer]\nmax_token_length = 0\n").unwrap_err();
        assert_matches!(err, ConfigError::ZeroLimit { .. });
    }

    #[test]
    fn test_malformed_toml() {
        let err = RuntimeConfig::from_toml_str("[prediction\nmode = ").unwrap_err();
        assert_matches!(err, ConfigError::Parse(_));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nmin_log_level = \"debug\"").unwrap();

        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert_matches!(err, ConfigError::Io { .. });
        assert_eq!(err.error_code(), codes::config::CONFIG_IO_ERROR);
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(!env_vars::PREDICTION_MODE.is_empty());
        assert!(!env_vars::LOGGING_MIN_LEVEL.is_empty());
    }
}
