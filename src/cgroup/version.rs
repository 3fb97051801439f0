use std::fmt;
use std::path::Path;

/// File that only exists at the root of a unified (v2) cgroup hierarchy.
const CONTROLLERS_FILE: &str = "cgroup.controllers";

/// The cgroup hierarchy schema exposed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgroupVersion {
    /// Legacy per-controller hierarchies.
    V1,
    /// Unified hierarchy.
    V2,
}

impl CgroupVersion {
    /// Detects the hierarchy mounted at `cgroup_root`.
    ///
    /// Returns [`CgroupVersion::V2`] if `cgroup.controllers` exists below the root and
    /// [`CgroupVersion::V1`] otherwise, even if legacy controller directories are mounted too.
    /// The file's content is never read. A failed existence check counts as absent.
    pub fn detect(cgroup_root: impl AsRef<Path>) -> Self {
        let controllers = cgroup_root.as_ref().join(CONTROLLERS_FILE);
        match controllers.try_exists() {
            Ok(true) => Self::V2,
            Ok(false) => Self::V1,
            Err(err) => {
                log::debug!(
                    "Failed to check `{}`, assuming cgroup v1: {}",
                    controllers.display(),
                    err
                );
                Self::V1
            }
        }
    }
}

impl fmt::Display for CgroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("V1"),
            Self::V2 => f.write_str("V2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_v2() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("cgroup.controllers"), "cpu memory\n").unwrap();
        assert_eq!(CgroupVersion::detect(root.path()), CgroupVersion::V2);
    }

    #[test]
    fn test_detect_v2_ignores_content() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("cgroup.controllers"), "").unwrap();
        assert_eq!(CgroupVersion::detect(root.path()), CgroupVersion::V2);
    }

    #[test]
    fn test_detect_v2_wins_over_v1_files() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("memory")).unwrap();
        std::fs::write(root.path().join("memory/memory.limit_in_bytes"), "1024\n").unwrap();
        std::fs::write(root.path().join("cgroup.controllers"), "memory\n").unwrap();
        assert_eq!(CgroupVersion::detect(root.path()), CgroupVersion::V2);
    }

    #[test]
    fn test_detect_v1() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("cpu")).unwrap();
        assert_eq!(CgroupVersion::detect(root.path()), CgroupVersion::V1);
    }

    #[test]
    fn test_detect_missing_root() {
        assert_eq!(
            CgroupVersion::detect("/definitely/does/not/exist"),
            CgroupVersion::V1
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CgroupVersion::V1.to_string(), "V1");
        assert_eq!(CgroupVersion::V2.to_string(), "V2");
    }
}
