//! Log subscriber setup

use crate::config::Environment;

/// Subscriber settings for an environment: (max level, include targets, ANSI colours)
fn settings(environment: Environment) -> (tracing::Level, bool, bool) {
    match environment {
        Environment::Dev => (tracing::Level::DEBUG, true, true),
        Environment::Prod => (tracing::Level::INFO, false, false),
    }
}

/// Install the global `tracing` subscriber
///
/// `dev` logs at DEBUG with module targets; `prod` logs at INFO without
/// colour codes so output stays clean in collected logs. Calling this more
/// than once is harmless: later calls leave the first subscriber in place.
pub fn init(environment: Environment) {
    let (level, with_target, with_ansi) = settings(environment);

    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(with_target)
        .with_ansi(with_ansi)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(?environment, %level, "logging initialized");
    }
}
