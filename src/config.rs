use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::cgroup::stats::DEFAULT_V1_UNLIMITED_THRESHOLD;

/// Environment variable that relocates the cgroup root, e.g. to a host tree mounted at
/// `/rootfs/sys/fs/cgroup`.
pub const CGROUP_ROOT_ENV: &str = "CGROUP_MONITOR_ROOT";

const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Settings for one run of the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the cgroup pseudo-files are read from.
    pub cgroup_root: PathBuf,
    /// Delay between two reports.
    pub interval: Duration,
    /// v1 memory limits at or above this value are reported as unlimited.
    pub v1_unlimited_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            interval: DEFAULT_INTERVAL,
            v1_unlimited_threshold: DEFAULT_V1_UNLIMITED_THRESHOLD,
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds the configuration using `lookup` to resolve environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(CGROUP_ROOT_ENV).filter(|root| !root.is_empty()) {
            config.cgroup_root = PathBuf::from(root);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.cgroup_root, PathBuf::from("/sys/fs/cgroup"));
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.v1_unlimited_threshold, 1 << 60);
    }

    #[test]
    fn test_cgroup_root_override() {
        let config = Config::from_lookup(|key| {
            (key == CGROUP_ROOT_ENV).then(|| OsString::from("/rootfs/sys/fs/cgroup"))
        });
        assert_eq!(config.cgroup_root, PathBuf::from("/rootfs/sys/fs/cgroup"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let config = Config::from_lookup(|_| Some(OsString::new()));
        assert_eq!(config, Config::default());
    }
}
