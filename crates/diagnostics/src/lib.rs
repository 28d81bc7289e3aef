//! Lightweight structured logging for the unifs workspace.
//!
//! Usage:
//! - Set UNIFS_LOG=off (default) - no logs
//! - Set UNIFS_LOG=info - basic operation logs
//! - Set UNIFS_LOG=debug - detailed diagnostic logs

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

static INIT: Once = Once::new();

/// Initialize diagnostics based on the UNIFS_LOG environment variable.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let log_level = std::env::var("UNIFS_LOG").unwrap_or_else(|_| "off".to_string());

        let rt = match log_level.as_str() {
            "off" => return, // No setup needed
            "debug" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Debug))
                .init(),
            "info" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Info))
                .init(),
            "warn" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Warn))
                .init(),
            "error" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Error))
                .init(),
            _ => {
                let rt = emit::setup()
                    .emit_to(emit_term::stderr())
                    .emit_when(emit::level::min_filter(emit::Level::Info))
                    .init();
                eprintln!("Warning: Unknown UNIFS_LOG value '{}', using 'info'", log_level);
                rt
            }
        };

        // The runtime must outlive the process; there is no shutdown hook.
        std::mem::forget(rt);
    });
}

/// Log basic operations (filesystem operations, stream opens, etc.)
///
/// Use this for operations that users might want to see in normal usage.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (path resolution, per-node walk steps, etc.)
///
/// Use this for detailed information useful for debugging.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log warning conditions (dropped metadata fields, swallowed hook errors)
///
/// Use this for issues that don't prevent operation but should be noted.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log critical error conditions (failures that abort an operation)
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}
