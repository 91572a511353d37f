// Diagnostic logging for the CLI

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Level picked from `--quiet` / `--verbose`; `RUST_LOG` overrides it.
pub fn level_for(quiet: bool, verbose: u8) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Install a stderr subscriber so log lines never mix with command output.
pub fn init_logging(quiet: bool, verbose: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(quiet, verbose).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(false, 0), LevelFilter::WARN);
        assert_eq!(level_for(false, 2), LevelFilter::DEBUG);
        assert_eq!(level_for(false, 9), LevelFilter::TRACE);
        assert_eq!(level_for(true, 3), LevelFilter::ERROR);
    }
}
