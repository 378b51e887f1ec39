//! `log_*!` macros. Context values are rendered with `Display`, so callers can
//! pass line numbers, paths or counts without converting them first.

/// Render `key => value` pairs into owned strings; used by the other macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, $value.to_string())),*];
            context
        }
    };
}

/// Apply rendered context to an event
#[doc(hidden)]
pub fn with_rendered_context(
    event: crate::logging::LogEvent,
    context: &[(&str, String)],
) -> crate::logging::LogEvent {
    context
        .iter()
        .fold(event, |event, (key, value)| event.with_context(key, value))
}

/// Log an error with a `Code`, an optional `span = ...` and optional context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let context = $crate::__log_context!($($key => $value),*);
        let event = $crate::logging::macros::with_rendered_context(
            $crate::logging::LogEvent::error($code, $message).with_span($span),
            &context,
        );
        $crate::logging::dispatch_with_file_context(event)
    }};

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let context = $crate::__log_context!($($key => $value),*);
        let event = $crate::logging::macros::with_rendered_context(
            $crate::logging::LogEvent::error($code, $message),
            &context,
        );
        $crate::logging::dispatch_with_file_context(event)
    }};
}

/// Log a stage completion with a success `Code`
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let context = $crate::__log_context!($($key => $value),*);
        let event = $crate::logging::macros::with_rendered_context(
            $crate::logging::LogEvent::success($code, $message),
            &context,
        );
        $crate::logging::dispatch_with_file_context(event)
    }};
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let context = $crate::__log_context!($($key => $value),*);
        let event = $crate::logging::macros::with_rendered_context(
            $crate::logging::LogEvent::info($message),
            &context,
        );
        $crate::logging::dispatch_with_file_context(event)
    }};
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let context = $crate::__log_context!($($key => $value),*);
        let event = $crate::logging::macros::with_rendered_context(
            $crate::logging::LogEvent::warning($message),
            &context,
        );
        $crate::logging::dispatch_with_file_context(event)
    }};
}

/// Debug events are skipped, context included, unless debug output is on
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            let context = $crate::__log_context!($($key => $value),*);
            let event = $crate::logging::macros::with_rendered_context(
                $crate::logging::LogEvent::debug($message),
                &context,
            );
            $crate::logging::dispatch_with_file_context(event)
        }
    }};
}
