//! Console logging shim
//!
//! Routes diagnostics to the browser console on wasm32 and to stderr in
//! native tests. Every fail-soft path in the crate logs through here with
//! the `[ClauseCore]` prefix.

const PREFIX: &str = "[ClauseCore]";

/// Log a warning (recoverable condition, scanning continues or degrades).
pub fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("{} {}", PREFIX, message).into());

    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{} {}", PREFIX, message);
}

/// Log an informational message.
pub fn info(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&format!("{} {}", PREFIX, message).into());

    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{} {}", PREFIX, message);
}

/// Log an error (a unit of work was lost, the pipeline itself survives).
pub fn error(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&format!("{} {}", PREFIX, message).into());

    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{} {}", PREFIX, message);
}
