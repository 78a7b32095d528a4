//! Logger setup for programs using the NEWT client

use env_logger::Builder;
use log::LevelFilter;

/// Parse a configured level name, falling back to `info`
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::Info
        }
    }
}

/// Install an env_logger at `level`; `RUST_LOG` still refines per-module filters.
/// Does nothing if a logger is already installed.
pub fn init_logging(level: &str) {
    let mut builder = Builder::from_default_env();
    builder
        .filter_level(parse_level(level))
        .try_init()
        .ok(); // Ignore error if logger is already initialized
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("error", LevelFilter::Error)]
    #[case("WARN", LevelFilter::Warn)]
    #[case("debug", LevelFilter::Debug)]
    #[case("trace", LevelFilter::Trace)]
    #[case("verbose", LevelFilter::Info)]
    fn test_parse_level(#[case] level: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(level), expected);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging("debug");
        init_logging("info");
    }
}
