//! Logging configuration: compile-time ceilings plus runtime preferences
//!
//! Buffer sizes and message limits come from the build profile and cannot be
//! changed at runtime. Level and output format are user preferences, set once
//! per process (usually from the `[logging]` table of a `RuntimeConfig`).

use crate::config::build_info;
use crate::config::compile_time::logging::*;
use crate::config::runtime::{env_vars, LogLevel as RuntimeLogLevel, LoggingPreferences};
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; may only be called once per process
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Installed preferences, else the profile defaults overlaid by `ATN_LOGGING_*`
fn runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES
        .get()
        .cloned()
        .unwrap_or_else(|| profile_preferences(build_info::profile()))
}

/// Defaults for a build profile. Environment variables still win.
pub fn profile_preferences(profile: &str) -> LoggingPreferences {
    let env = LoggingPreferences::default();
    let overridden = |var: &str| std::env::var(var).is_ok();

    let (structured, console, level) = match profile {
        "production" => (true, false, RuntimeLogLevel::Warning),
        _ => (false, true, RuntimeLogLevel::Info),
    };

    LoggingPreferences {
        use_structured_logging: if overridden(env_vars::LOGGING_USE_STRUCTURED) {
            env.use_structured_logging
        } else {
            structured
        },
        enable_console_logging: if overridden(env_vars::LOGGING_ENABLE_CONSOLE) {
            env.enable_console_logging
        } else {
            console
        },
        min_log_level: if overridden(env_vars::LOGGING_MIN_LEVEL) {
            env.min_log_level
        } else {
            level
        },
    }
}

pub fn get_min_log_level() -> LogLevel {
    runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    runtime_preferences().enable_console_logging
}

/// Number of events a MemoryLogger retains before dropping the oldest
pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Number of diagnostics a RecordingListener retains
pub fn get_max_recorded_diagnostics() -> usize {
    MAX_RECORDED_DIAGNOSTICS
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("Log buffer size must be greater than zero".to_string());
    }
    if MAX_LOG_MESSAGE_LENGTH < 16 {
        return Err(format!(
            "Max log message length too small: {}",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    if MAX_RECORDED_DIAGNOSTICS == 0 {
        return Err("Recorded diagnostics ceiling must be greater than zero".to_string());
    }
    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = runtime_preferences();

    format!(
        "Logging ({}):\n\
         - buffer {} events, messages up to {} chars, {} recorded diagnostics\n\
         - level {:?}, structured {}, console {}",
        build_info::source_info(),
        LOG_BUFFER_SIZE,
        MAX_LOG_MESSAGE_LENGTH,
        MAX_RECORDED_DIAGNOSTICS,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.enable_console_logging,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_profiles_differ_in_verbosity() {
        // The test environment leaves ATN_LOGGING_* unset.
        let dev = profile_preferences("development");
        let prod = profile_preferences("production");
        assert!(dev.min_log_level > prod.min_log_level);
        assert!(prod.use_structured_logging);
        assert!(dev.enable_console_logging);
    }

    #[test]
    fn test_summary_lists_limits() {
        let summary = get_config_summary();
        assert!(summary.contains(&LOG_BUFFER_SIZE.to_string()));
        assert!(summary.contains(build_info::profile()));
    }
}
