//! ReelForge
//!
//! Turns a text topic into a short vertical video: an LLM provider writes a
//! script, a TTS provider reads it, an image provider illustrates each line,
//! and the engine assembles animated image clips, timed captions, and
//! background music into an FFmpeg render.

pub mod core;

use std::path::Path;
use std::sync::OnceLock;

/// Keeps the non-blocking appender alive for the process lifetime
static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes logging to stdout and a daily-rolling file.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(log_dir: &Path, debug: bool) {
    use tracing_subscriber::prelude::*;

    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, "reelforge.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}
