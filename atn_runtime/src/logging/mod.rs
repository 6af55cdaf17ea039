//! Global logging for the prediction runtime
//!
//! Provides a process-wide logging service, per-thread recognizer context
//! that tags events with the grammar being run, and the `log_*!` macros.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, EventSummary, Logger, LoggingService, MemoryLogger, StructuredLogger};

#[cfg(feature = "log-facade")]
pub use service::LogFacadeLogger;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static RECOGNIZER_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::prediction::NO_VIABLE_ALTERNATIVE,
        codes::lexer::TOKEN_RECOGNITION_ERROR,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    );

    Ok(())
}

/// Initialize with a caller-supplied service (embedding hosts and tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether an event at `level` would reach a logger
pub fn is_enabled(level: LogLevel) -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(level))
}

// ============================================================================
// RECOGNIZER CONTEXT
// ============================================================================

/// Run `f` with events on this thread tagged by `grammar`
pub fn with_recognizer_context<F, R>(grammar: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = RECOGNIZER_CONTEXT.with(|ctx| ctx.replace(Some(grammar.to_string())));
    let result = f();
    RECOGNIZER_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_recognizer() -> Option<String> {
    RECOGNIZER_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Tag with the recognizer context and hand to the global logger
pub fn dispatch(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    let event = match get_current_recognizer() {
        Some(grammar) => event.with_grammar(&grammar),
        None => event,
    };
    logger.log_event(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_context_nests_and_restores() {
        assert_eq!(get_current_recognizer(), None);
        with_recognizer_context("Expr", || {
            assert_eq!(get_current_recognizer().as_deref(), Some("Expr"));
            with_recognizer_context("ExprLexer", || {
                assert_eq!(get_current_recognizer().as_deref(), Some("ExprLexer"));
            });
            assert_eq!(get_current_recognizer().as_deref(), Some("Expr"));
        });
        assert_eq!(get_current_recognizer(), None);
    }

    #[test]
    fn test_macros_without_logger_are_silent() {
        // Tests never install the global logger; the macros must be no-ops.
        crate::log_error!(codes::prediction::NO_VIABLE_ALTERNATIVE, "no viable alt");
        crate::log_success!(codes::success::PARSE_COMPLETE, "done", "rule" => "s",);
        crate::log_debug!("closure step", "state" => 4);
        crate::log_warning!(code = codes::prediction::AMBIGUITY, "ambiguity", "decision" => 0);
        crate::log_info!("loaded", "states" => 12);
    }
}
