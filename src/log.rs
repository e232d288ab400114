//! Logger setup for binaries built on this crate. The library itself only talks to the [`log`] facade.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install an `env_logger` showing this crate's and the `solver` binary's messages at `Debug` if `debug_enabled`,
/// else `Info`. Other crates, varisat included, only get to report warnings.
///
/// `RUST_LOG`, when set, replaces these filters entirely.
/// Calling this more than once keeps the first logger.
pub fn init_logger(debug_enabled: bool) {
    let level = match debug_enabled {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    let filters = format!("warn,edgelink={level},solver={level}");

    let installed = Builder::from_env(Env::default().default_filter_or(filters))
        .format_timestamp(None)
        .format_target(false)
        .try_init();

    if installed.is_ok() {
        log::debug!("logging edgelink at {level}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_keeps_first_logger() {
        init_logger(true);
        init_logger(false);
        assert!(log::log_enabled!(target: "edgelink", log::Level::Info));
    }
}
