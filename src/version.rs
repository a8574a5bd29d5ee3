use std::fmt;

use chrono::DateTime;

const UNKNOWN: &str = "unknown";

/// Build metadata reported by the `version` subcommand.
///
/// Commit and build time are injected at compile time through the
/// `DRONE_STACK_COMMIT` and `DRONE_STACK_BUILD_TIME` (unix seconds)
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

impl BuildInfo {
    #[must_use]
    pub fn current() -> Self {
        Self::from_parts(
            env!("CARGO_PKG_VERSION"),
            option_env!("DRONE_STACK_COMMIT"),
            option_env!("DRONE_STACK_BUILD_TIME"),
        )
    }

    #[must_use]
    pub fn from_parts(version: &str, commit: Option<&str>, build_time: Option<&str>) -> Self {
        Self {
            version: if version.is_empty() { "dev" } else { version }.to_string(),
            commit: commit
                .filter(|c| !c.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string(),
            build_time: format_build_time(build_time),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "drone-stack version: {}, commit: {}, built at: {}",
            self.version, self.commit, self.build_time
        )
    }
}

/// Render a unix timestamp as e.g. `Mon Jan  2 15:04:05 2006` (UTC).
#[must_use]
pub fn format_build_time(raw: Option<&str>) -> String {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || UNKNOWN.to_string(),
            |t| t.format("%a %b %e %H:%M:%S %Y").to_string(),
        )
}
