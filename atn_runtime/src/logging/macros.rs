//! Logging macros taking `"key" => value` context pairs
//!
//! Context values accept any `Display` type. Events are only built when a
//! global logger is installed and the level passes its filter, so the
//! macros are cheap on prediction hot paths.

/// Build, tag and dispatch one event when `$level` is enabled
#[doc(hidden)]
#[macro_export]
macro_rules! __log_event {
    ($level:ident, $event:expr $(, $key:expr => $value:expr)*) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::$level) {
            #[allow(unused_mut)]
            let mut event = $event;
            $(
                event = event.with_context($key, &format!("{}", $value));
            )*
            $crate::logging::dispatch(event);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!(
            Error,
            $crate::logging::LogEvent::error($code, $message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!(
            Info,
            $crate::logging::LogEvent::success($code, $message)
            $(, $key => $value)*
        )
    };
}

/// Warnings take an optional leading `code = ...`
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!(
            Warning,
            $crate::logging::LogEvent::warning_with_code($code, $message)
            $(, $key => $value)*
        )
    };

    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!(
            Warning,
            $crate::logging::LogEvent::warning($message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!(
            Info,
            $crate::logging::LogEvent::info($message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!(
            Debug,
            $crate::logging::LogEvent::debug($message)
            $(, $key => $value)*
        )
    };
}
