//! Per-step tracing for computations and bind layers.

/// Log one step (resume, pass-through, scope release) on target `rescue::step`.
///
/// Only the `trace_logs` feature turns this into a `log::trace!` call. Without
/// it the arguments are still type-checked but nothing is formatted.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "trace_logs")]
        {
            ::log::trace!(target: "rescue::step", $($arg)*);
        }
        #[cfg(not(feature = "trace_logs"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}
