//! Parsers for the CPU controller files of both cgroup hierarchies.
//!
//! - [`CpuLimit`] from the v2 `cpu.max` file: exactly two whitespace-separated fields, the
//!   quota (`max` or an integer) and the period.
//! - [`CfsQuota`] and [`CfsPeriod`] from the v1 `cpu.cfs_quota_us` and `cpu.cfs_period_us`
//!   files, combined into a [`CpuLimit`] with [`CpuLimit::from_cfs`].
//! - [`CpuAcctUsage`] from the v1 `cpuacct.usage` file.
//! - [`CpuStat`] from the v2 `cpu.stat` file. Unlike memory statistics, every line is kept
//!   verbatim, since the set of keys differs between kernel versions.
//!
//! # Examples
//!
//! ```rust
//! use cgroup_monitor::cgroup::stats::{CpuLimit, CpuStat, SingleLineStat};
//!
//! let limit = CpuLimit::from_reader(&mut "200000 100000\n".as_bytes()).unwrap();
//! assert_eq!(limit.cores(), Some(2.0));
//!
//! let stat = CpuStat::from_reader(&mut "usage_usec 1000\nnr_periods 3\n".as_bytes()).unwrap();
//! assert_eq!(stat.lines().len(), 2);
//! ```

use std::io::BufRead;

use super::parser::{SingleLineStat, parse_single_value, read_single_line};
use super::StatParseError;

/// A CPU bandwidth limit: `quota` microseconds of CPU time per `period` microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuLimit {
    /// Allowed CPU time per period. `None` means no quota is enforced.
    pub quota: Option<u64>,
    /// Length of the enforcement period.
    pub period: u64,
    /// The values the limit was derived from, as the kernel wrote them.
    pub raw: RawCpuLimit,
}

/// Source values of a [`CpuLimit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCpuLimit {
    /// The two tokens of `cpu.max` (v2).
    CpuMax { quota: String, period: String },
    /// `cpu.cfs_quota_us` and `cpu.cfs_period_us` (v1).
    Cfs { quota: CfsQuota, period: CfsPeriod },
}

impl CpuLimit {
    /// Returns the limit in core-equivalents (`quota / period`), or `None` when unlimited.
    pub fn cores(&self) -> Option<f64> {
        self.quota.map(|quota| quota as f64 / self.period as f64)
    }

    /// Returns `true` if no quota is enforced.
    pub fn is_unlimited(&self) -> bool {
        self.quota.is_none()
    }

    /// Combines the two cgroup v1 CFS files into a limit.
    ///
    /// A quota of zero or below (the kernel writes `-1`) means unlimited, whatever the period.
    ///
    /// # Errors
    ///
    /// Returns [`StatParseError::ZeroPeriod`] if a positive quota comes with a zero period.
    pub fn from_cfs(quota: CfsQuota, period: CfsPeriod) -> std::io::Result<Self> {
        let bounded = u64::try_from(quota.0).ok().filter(|q| *q > 0);
        Self::checked(bounded, period.0, RawCpuLimit::Cfs { quota, period })
    }

    fn checked(quota: Option<u64>, period: u64, raw: RawCpuLimit) -> std::io::Result<Self> {
        match quota {
            Some(quota) if period == 0 => Err(StatParseError::ZeroPeriod { quota }.into()),
            _ => Ok(Self { quota, period, raw }),
        }
    }
}

impl SingleLineStat for CpuLimit {
    /// Parses a `cpu.max` line.
    ///
    /// # Errors
    ///
    /// - [`StatParseError::FieldCount`] unless the line has exactly two fields.
    /// - [`StatParseError::InvalidValue`] if a numeric field is not an integer.
    /// - [`StatParseError::ZeroPeriod`] if a bounded quota comes with a zero period.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_single_line(buf)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [quota, period] = fields[..] else {
            return Err(StatParseError::FieldCount {
                expected: 2,
                found: fields.len(),
                line: 1,
                content: line.clone(),
            }
            .into());
        };

        let raw = RawCpuLimit::CpuMax {
            quota: quota.to_owned(),
            period: period.to_owned(),
        };
        if quota == "max" {
            // the period is irrelevant once the quota is unlimited
            return Ok(Self {
                quota: None,
                period: period.parse().unwrap_or_default(),
                raw,
            });
        }

        let quota = parse_single_value::<u64>(quota, 1)?;
        let period = parse_single_value::<u64>(period, 1)?;
        Self::checked(Some(quota), period, raw)
    }
}

/// Raw content of the cgroup v1 `cpu.cfs_quota_us` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfsQuota(pub i64);

impl SingleLineStat for CfsQuota {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_single_line(buf)?;
        parse_single_value(&line, 1).map(Self)
    }
}

/// Raw content of the cgroup v1 `cpu.cfs_period_us` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfsPeriod(pub u64);

impl SingleLineStat for CfsPeriod {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_single_line(buf)?;
        parse_single_value(&line, 1).map(Self)
    }
}

/// Cumulative CPU time consumed by the cgroup, from the v1 `cpuacct.usage` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuAcctUsage {
    /// Nanoseconds of CPU time since the cgroup was created.
    pub usage_nanos: u64,
}

impl SingleLineStat for CpuAcctUsage {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_single_line(buf)?;
        let usage_nanos = parse_single_value(&line, 1)?;
        Ok(Self { usage_nanos })
    }
}

/// One line of `cpu.stat`, split into its key and the remainder of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub key: String,
    pub value: String,
}

/// Every non-blank line of the v2 `cpu.stat` file, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuStat {
    lines: Vec<StatLine>,
}

impl CpuStat {
    /// Parses `cpu.stat`. Values are kept as text and never validated.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` only if reading from `buf` fails.
    pub fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut lines = Vec::new();
        let mut line = String::new();
        while buf.read_line(&mut line)? != 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let (key, value) = trimmed
                    .split_once(char::is_whitespace)
                    .unwrap_or((trimmed, ""));
                lines.push(StatLine {
                    key: key.to_owned(),
                    value: value.trim_start().to_owned(),
                });
            }
            line.clear();
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[StatLine] {
        &self.lines
    }
}
