//! Tracing subscriber setup for the churnlens binary
//!
//! Filter priority, highest first: `CHURNLENS_LOG`, `RUST_LOG`, then the
//! `-v` / `-q` flags (debug / error). Without any of these the level is `info`.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding crate-specific filter directives
pub const LOG_ENV_VAR: &str = "CHURNLENS_LOG";

/// Verbosity level derived from CLI flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
        }
    }

    /// Fallback directive used when no environment filter is set
    pub fn directive(self) -> String {
        match self {
            Self::Verbose => format!("{},tower_http=debug", self.default_level()),
            _ => self.default_level().to_string(),
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Must be called once, before any other work in `main`.
pub fn init_subscriber(verbosity: Verbosity) {
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let registry = tracing_subscriber::registry().with(build_env_filter(verbosity));
    if verbosity == Verbosity::Verbose {
        registry.with(fmt_layer.with_timer(fmt::time::uptime())).init();
    } else {
        registry.with(fmt_layer.compact()).init();
    }
}

/// Unparseable directives fall through to the next source instead of failing
pub fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV_VAR) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = verbosity.default_level();
    EnvFilter::try_new(verbosity.directive()).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
    }

    #[test]
    fn test_default_levels() {
        assert_eq!(Verbosity::Quiet.default_level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.default_level(), Level::INFO);
        assert_eq!(Verbosity::Verbose.default_level(), Level::DEBUG);
    }

    #[test]
    fn test_verbose_directive_includes_http_traces() {
        assert_eq!(Verbosity::Verbose.directive(), "DEBUG,tower_http=debug");
        assert_eq!(Verbosity::Normal.directive(), "INFO");
    }
}
