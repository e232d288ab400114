//! Settings for a solve.

use std::time::Duration;

/// How long the solver may search before giving up.
const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

/// Knobs for [`Puzzle::solve`](crate::puzzle::Puzzle::solve).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolveConfig {
    /// Upper bound on the whole solve stage, both searches included. `None` searches for as long as it takes.
    pub time_limit: Option<Duration>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self { time_limit: Some(DEFAULT_TIME_LIMIT) }
    }
}

impl SolveConfig {
    /// Stop after `time_limit`.
    pub fn with_time_limit(time_limit: Duration) -> Self {
        Self { time_limit: Some(time_limit) }
    }

    /// Search for as long as it takes.
    pub fn without_time_limit() -> Self {
        Self { time_limit: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert_eq!(SolveConfig::default().time_limit, Some(Duration::from_secs(60)));
        assert_eq!(SolveConfig::without_time_limit().time_limit, None);
        assert_eq!(SolveConfig::with_time_limit(Duration::from_millis(5)).time_limit, Some(Duration::from_millis(5)));
    }
}
