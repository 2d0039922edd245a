//! Structured log helpers.
//!
//! Every event carries a `component` field so log pipelines can split the
//! handshake, channel and tool output without parsing messages.

/// Log an event with a component field.
#[macro_export]
macro_rules! log_event {
    // Info level with component
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with component
    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with component
    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with component
    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a session event with the standard `established` and `variant` fields.
#[macro_export]
macro_rules! log_session_event {
    ($level:ident, $component:expr, $msg:expr, $established:expr, $variant:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            established = $established,
            variant = %$variant,
            $($($field)*,)?
            $msg
        )
    };
}
