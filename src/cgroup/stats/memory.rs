//! Parsers for the memory controller files of both cgroup hierarchies.
//!
//! - [`MemoryLimit`] from the v2 `memory.max` file (`max` or a byte count), or from the v1
//!   `memory.limit_in_bytes` file through [`MemoryLimit::from_legacy`].
//! - [`MemoryUsage`] from `memory.current` (v2) or `memory.usage_in_bytes` (v1).
//! - [`MemoryStat`] and [`LegacyMemoryStat`] from the `memory.stat` file of each hierarchy.
//!   Only an allow-list of keys is kept, in the order the kernel wrote them.
//!
//! # Examples
//!
//! ```rust
//! use cgroup_monitor::cgroup::stats::{MemoryLimit, MemoryStat, SelectedStat, SingleLineStat};
//!
//! let stat = MemoryStat::from_reader(&mut "anon 1000\nsock 5\nfile 2000\n".as_bytes()).unwrap();
//! assert_eq!(stat.entries(), [("anon", 1000), ("file", 2000)]);
//!
//! let limit = MemoryLimit::from_reader(&mut "max\n".as_bytes()).unwrap();
//! assert!(limit.is_unlimited());
//! ```

use std::io::BufRead;

use super::parser::{SelectedStat, SingleLineStat, parse_single_value, read_single_line};

/// Values of `memory.limit_in_bytes` at or above this are treated as "no limit".
///
/// cgroup v1 has no textual marker for an unlimited cgroup; the kernel reports a page-aligned
/// value close to `i64::MAX` instead. The cutoff is a heuristic, not a kernel guarantee.
pub const DEFAULT_V1_UNLIMITED_THRESHOLD: u64 = 1 << 60;

/// A memory limit in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryLimit {
    /// Memory limit in bytes. `None` means no limit is set.
    pub limit_bytes: Option<u64>,
}

impl MemoryLimit {
    pub fn is_unlimited(&self) -> bool {
        self.limit_bytes.is_none()
    }

    /// Interprets a raw cgroup v1 limit, mapping anything at or above `threshold` to unlimited.
    pub fn from_legacy(raw: u64, threshold: u64) -> Self {
        Self {
            limit_bytes: (raw < threshold).then_some(raw),
        }
    }
}

impl SingleLineStat for MemoryLimit {
    /// Parses a `memory.max` file: either `max` or a byte count.
    ///
    /// # Errors
    ///
    /// Returns [`super::StatParseError::InvalidValue`] if the content is neither.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_single_line(buf)?;
        let limit_bytes = match line.as_str() {
            "max" => None,
            value => Some(parse_single_value(value, 1)?),
        };

        Ok(MemoryLimit { limit_bytes })
    }
}

/// Current memory usage in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub usage_bytes: u64,
}

impl SingleLineStat for MemoryUsage {
    /// Parses a single numeric value such as the content of `memory.current`.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `InvalidData` if the value cannot be parsed as a `u64`.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_single_line(buf)?;
        let usage_bytes = parse_single_value(&line, 1)?;
        Ok(Self { usage_bytes })
    }
}

/// Selected entries of the cgroup v2 `memory.stat` file: `anon`, `file`, `kernel_stack` and `slab`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryStat {
    entries: Vec<(&'static str, u64)>,
}

impl MemoryStat {
    /// Allow-listed keys in file order, with their byte counts.
    pub fn entries(&self) -> &[(&'static str, u64)] {
        &self.entries
    }
}

impl SelectedStat for MemoryStat {
    fn selected_keys() -> &'static [&'static str] {
        &["anon", "file", "kernel_stack", "slab"]
    }

    fn from_entries(entries: Vec<(&'static str, u64)>) -> Self {
        Self { entries }
    }
}

/// Selected entries of the cgroup v1 `memory.stat` file: `cache`, `rss`, `mapped_file` and
/// `inactive_anon`.
///
/// The hierarchical `total_*` counterparts are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyMemoryStat {
    entries: Vec<(&'static str, u64)>,
}

impl LegacyMemoryStat {
    /// Allow-listed keys in file order, with their byte counts.
    pub fn entries(&self) -> &[(&'static str, u64)] {
        &self.entries
    }
}

impl SelectedStat for LegacyMemoryStat {
    fn selected_keys() -> &'static [&'static str] {
        &["cache", "rss", "mapped_file", "inactive_anon"]
    }

    fn from_entries(entries: Vec<(&'static str, u64)>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgroup::stats::StatParseError;
    use crate::cgroup::stats::error::extract_stat_parse_error;

    #[test]
    fn test_parse_empty_memory_stat() {
        let stat = MemoryStat::from_reader(&mut "".as_bytes()).unwrap();
        assert_eq!(stat, MemoryStat::default());
        assert!(stat.entries().is_empty());
    }

    #[test]
    fn test_parse_memory_stat_keeps_file_order() {
        let data = "\
slab 400
anon 1000
sock 500
shmem 600
kernel_stack 300
file 2000
file_mapped 700
";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(
            stat.entries(),
            [
                ("slab", 400),
                ("anon", 1000),
                ("kernel_stack", 300),
                ("file", 2000)
            ]
        );
    }

    #[test]
    fn test_parse_partial_memory_stat() {
        let data = "anon 1000\nfile 2000\n";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.entries(), [("anon", 1000), ("file", 2000)]);
    }

    #[test]
    fn test_parse_invalid_memory_stat() {
        let data = "\
invalid line
anon abc
file 2000
";
        let err = MemoryStat::from_reader(&mut data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidKeyValue {
                key, value, line, ..
            } => {
                assert_eq!(key, "anon");
                assert_eq!(value, "abc");
                assert_eq!(*line, 2);
            }
            other => panic!("Expected InvalidKeyValue error, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_malformed_key_is_ignored() {
        let data = "anon 1\nworkingset_refault_anon n/a\n";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.entries(), [("anon", 1)]);
    }

    #[test]
    fn test_memory_stat_keeps_repeated_keys() {
        let data = "anon 1\nfile 2\nanon 3\n";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.entries(), [("anon", 1), ("file", 2), ("anon", 3)]);
    }

    #[test]
    fn test_memory_stat_skips_lines_without_exactly_two_fields() {
        let data = "anon 1 kB\nfile\nslab 7\n kernel_stack 9\nanon_thp 4\n";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.entries(), [("slab", 7)]);
    }

    #[test]
    fn test_legacy_memory_stat_filters_unrelated_keys() {
        let data = "cache 100\nrss 200\nunrelated_key 999";
        let stat = LegacyMemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.entries(), [("cache", 100), ("rss", 200)]);
    }

    #[test]
    fn test_legacy_memory_stat_ignores_totals() {
        let data = "\
cache 4096
rss 8192
rss_huge 0
mapped_file 1024
inactive_anon 2048
total_cache 40960
total_rss 81920
";
        let stat = LegacyMemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(
            stat.entries(),
            [
                ("cache", 4096),
                ("rss", 8192),
                ("mapped_file", 1024),
                ("inactive_anon", 2048)
            ]
        );
    }

    #[test]
    fn test_parse_memory_usage() {
        let usage = MemoryUsage::from_reader(&mut "8192\n".as_bytes()).unwrap();
        assert_eq!(usage.usage_bytes, 8192);

        let err = MemoryUsage::from_reader(&mut "abcd\n".as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidValue { value, line, .. } => {
                assert_eq!(value, "abcd");
                assert_eq!(*line, 1);
            }
            other => panic!("Expected InvalidValue error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_memory_usage() {
        let err = MemoryUsage::from_reader(&mut "".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_parse_memory_limit() {
        let limit = MemoryLimit::from_reader(&mut "max\n".as_bytes()).unwrap();
        assert_eq!(limit.limit_bytes, None);

        let limit = MemoryLimit::from_reader(&mut "104857600\n".as_bytes()).unwrap();
        assert_eq!(limit.limit_bytes, Some(104_857_600));
    }

    #[test]
    fn test_invalid_memory_limit() {
        let err = MemoryLimit::from_reader(&mut "abc\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_legacy_limit_threshold() {
        let threshold = DEFAULT_V1_UNLIMITED_THRESHOLD;
        assert!(MemoryLimit::from_legacy(1 << 60, threshold).is_unlimited());
        assert!(MemoryLimit::from_legacy(9_223_372_036_854_771_712, threshold).is_unlimited());
        assert_eq!(
            MemoryLimit::from_legacy((1 << 60) - 1, threshold).limit_bytes,
            Some((1 << 60) - 1)
        );
        assert_eq!(
            MemoryLimit::from_legacy(512 * 1024 * 1024, threshold).limit_bytes,
            Some(512 * 1024 * 1024)
        );
    }
}
