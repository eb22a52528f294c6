//! cli::tracing_setup
//!
//! Tracing subscriber for the binary.
//!
//! # Priority (highest to lowest)
//!
//! 1. `SLUGSYNC_LOG` (directives, e.g. `slugsync=debug`)
//! 2. `RUST_LOG`
//! 3. CLI flags (`--debug` -> debug, `--quiet` -> error)
//! 4. Default level: `warn`
//!
//! Logs go to stderr so `--json` output on stdout stays parseable.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Default level for a verbosity.
pub fn default_level(verbosity: Verbosity) -> Level {
    match verbosity {
        Verbosity::Quiet => Level::ERROR,
        Verbosity::Normal => Level::WARN,
        Verbosity::Debug => Level::DEBUG,
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: Verbosity) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_target(verbosity == Verbosity::Debug);

    let result = if verbosity == Verbosity::Debug {
        tracing_subscriber::registry()
            .with(build_filter(verbosity))
            .with(layer.with_timer(fmt::time::uptime()))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(build_filter(verbosity))
            .with(layer.without_time().compact())
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn build_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var("SLUGSYNC_LOG") {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = default_level(verbosity);
    EnvFilter::new(level.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_verbosity() {
        assert_eq!(default_level(Verbosity::Quiet), Level::ERROR);
        assert_eq!(default_level(Verbosity::Normal), Level::WARN);
        assert_eq!(default_level(Verbosity::Debug), Level::DEBUG);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(Verbosity::Normal);
        init(Verbosity::Debug);
    }
}
