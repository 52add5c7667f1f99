//! The `logging` module wires up `tracing` output for the `fanout`
//! application.
//!
//! Verbosity comes from the server configuration rather than an environment
//! filter, so startup behavior is predictable regardless of the shell.

/// Initializes tracing at the given level. Unrecognized level names fall
/// back to `info`.
pub fn init(default_level: &str) {
    let level = match default_level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" | "warning" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };

    // try_init keeps repeated calls, as from tests, from panicking.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
