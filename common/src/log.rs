//! Tracing targets understood by the terminal formatter.

/// Events on this target carry a pre-rendered line in the `raw_msg` field.
pub const PRINT_TARGET: &str = "pingsweep::print";

/// Events on this target are rendered with a success marker.
pub const SUCCESS_TARGET: &str = "pingsweep::success";

#[doc(hidden)]
pub use tracing as __tracing;

/// Logs a positive outcome, e.g. a finished sweep.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::log::__tracing::info!(target: "pingsweep::success", $($arg)*)
    };
}
