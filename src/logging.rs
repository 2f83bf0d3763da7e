//! Diagnostics channel. Everything logged goes to stderr so it never mixes
//! with the decision document on stdout.

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Install the stderr logger. Best-effort: if a logger is already installed
/// the call only adjusts the level.
pub fn init(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // The logger itself passes everything; the global max level filters.
    let _ = TermLogger::init(
        LevelFilter::Trace,
        config,
        TerminalMode::Stderr,
        ColorChoice::Never,
    );
    set_level(level);
}

/// Change the level after init (e.g. once the config file has been read).
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Parse a level name such as `"info"` or `"WARN"`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_levels() {
        assert_eq!(parse_level("info"), Some(LevelFilter::Info));
        assert_eq!(parse_level("WARN"), Some(LevelFilter::Warn));
        assert_eq!(parse_level(" debug "), Some(LevelFilter::Debug));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
