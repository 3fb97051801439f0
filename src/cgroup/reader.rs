use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use super::stats::{
    CfsPeriod, CfsQuota, CpuAcctUsage, CpuLimit, CpuStat, DEFAULT_V1_UNLIMITED_THRESHOLD,
    LegacyMemoryStat, MemoryLimit, MemoryStat, MemoryUsage, SelectedStat, SingleLineStat,
    parse_single_value, read_single_line,
};
use super::{CgroupVersion, Error, Result};
use crate::fsutil;

const V2_CPU_MAX: &str = "cpu.max";
const V2_CPU_STAT: &str = "cpu.stat";
const V2_MEMORY_MAX: &str = "memory.max";
const V2_MEMORY_CURRENT: &str = "memory.current";
const V2_MEMORY_STAT: &str = "memory.stat";

const V1_CPU_QUOTA: &str = "cpu/cpu.cfs_quota_us";
const V1_CPU_PERIOD: &str = "cpu/cpu.cfs_period_us";
const V1_CPUACCT_USAGE: &str = "cpu,cpuacct/cpuacct.usage";
const V1_MEMORY_LIMIT: &str = "memory/memory.limit_in_bytes";
const V1_MEMORY_USAGE: &str = "memory/memory.usage_in_bytes";
const V1_MEMORY_STAT: &str = "memory/memory.stat";

/// CPU figures read from the cgroup filesystem. Fields whose file is absent are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CgroupCpu {
    /// From `cpu.max` (v2), or the CFS quota and period files (v1) when both exist.
    pub limit: Option<CpuLimit>,
    /// Verbatim `cpu.stat` lines (v2 only).
    pub stat: Option<CpuStat>,
    /// Cumulative usage from `cpuacct.usage` (v1 only).
    pub usage: Option<CpuAcctUsage>,
}

/// Memory figures read from the cgroup filesystem. Fields whose file is absent are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CgroupMemory {
    pub limit: Option<MemoryLimit>,
    pub usage: Option<MemoryUsage>,
    /// Allow-listed `memory.stat` entries in file order.
    pub stat: Option<Vec<(&'static str, u64)>>,
}

/// Reads the CPU and memory pseudo-files of one cgroup hierarchy.
///
/// The version is fixed at construction, so every read of a run uses the same schema even if
/// the filesystem changes underneath. Files are opened, read and closed on every call.
#[derive(Debug, Clone)]
pub struct CgroupReader {
    root: PathBuf,
    version: CgroupVersion,
    v1_unlimited_threshold: u64,
}

impl CgroupReader {
    pub fn new(root: impl Into<PathBuf>, version: CgroupVersion) -> Self {
        Self {
            root: root.into(),
            version,
            v1_unlimited_threshold: DEFAULT_V1_UNLIMITED_THRESHOLD,
        }
    }

    /// Overrides the value at or above which a v1 memory limit counts as unlimited.
    pub fn with_v1_unlimited_threshold(mut self, threshold: u64) -> Self {
        self.v1_unlimited_threshold = threshold;
        self
    }

    pub fn version(&self) -> CgroupVersion {
        self.version
    }

    /// Reads the CPU section for the configured version.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a present file cannot be read or does not match its schema.
    /// Absent files never cause an error.
    pub fn read_cpu(&self) -> Result<CgroupCpu> {
        match self.version {
            CgroupVersion::V2 => self.read_cpu_v2(),
            CgroupVersion::V1 => self.read_cpu_v1(),
        }
    }

    /// Reads the memory section for the configured version.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a present file cannot be read or does not match its schema.
    /// Absent files never cause an error.
    pub fn read_memory(&self) -> Result<CgroupMemory> {
        match self.version {
            CgroupVersion::V2 => self.read_memory_v2(),
            CgroupVersion::V1 => self.read_memory_v1(),
        }
    }

    fn read_cpu_v2(&self) -> Result<CgroupCpu> {
        Ok(CgroupCpu {
            limit: self.read_optional(V2_CPU_MAX, CpuLimit::from_reader)?,
            stat: self.read_optional(V2_CPU_STAT, CpuStat::from_reader)?,
            usage: None,
        })
    }

    fn read_cpu_v1(&self) -> Result<CgroupCpu> {
        // neither CFS file is read unless both exist
        let limit = if self.is_present(V1_CPU_QUOTA) && self.is_present(V1_CPU_PERIOD) {
            let quota = self.read_optional(V1_CPU_QUOTA, CfsQuota::from_reader)?;
            let period = self.read_optional(V1_CPU_PERIOD, CfsPeriod::from_reader)?;
            match (quota, period) {
                (Some(quota), Some(period)) => {
                    Some(CpuLimit::from_cfs(quota, period).map_err(|source| Error::Read {
                        path: self.root.join(V1_CPU_PERIOD),
                        source,
                    })?)
                }
                _ => None,
            }
        } else {
            None
        };

        Ok(CgroupCpu {
            limit,
            stat: None,
            usage: self.read_optional(V1_CPUACCT_USAGE, CpuAcctUsage::from_reader)?,
        })
    }

    fn read_memory_v2(&self) -> Result<CgroupMemory> {
        Ok(CgroupMemory {
            limit: self.read_optional(V2_MEMORY_MAX, MemoryLimit::from_reader)?,
            usage: self.read_optional(V2_MEMORY_CURRENT, MemoryUsage::from_reader)?,
            stat: self
                .read_optional(V2_MEMORY_STAT, MemoryStat::from_reader)?
                .map(|stat| stat.entries().to_vec()),
        })
    }

    fn read_memory_v1(&self) -> Result<CgroupMemory> {
        let threshold = self.v1_unlimited_threshold;
        let limit = self.read_optional(V1_MEMORY_LIMIT, |buf| {
            let line = read_single_line(buf)?;
            let raw = parse_single_value::<u64>(&line, 1)?;
            Ok(MemoryLimit::from_legacy(raw, threshold))
        })?;

        Ok(CgroupMemory {
            limit,
            usage: self.read_optional(V1_MEMORY_USAGE, MemoryUsage::from_reader)?,
            stat: self
                .read_optional(V1_MEMORY_STAT, LegacyMemoryStat::from_reader)?
                .map(|stat| stat.entries().to_vec()),
        })
    }

    fn is_present(&self, file: &str) -> bool {
        let path = self.root.join(file);
        path.try_exists().unwrap_or_else(|err| {
            log::debug!("Failed to check `{}`: {err}", path.display());
            false
        })
    }

    /// Opens `file` below the root and parses it, or returns `Ok(None)` if it does not exist.
    fn read_optional<T>(
        &self,
        file: &str,
        parse: impl FnOnce(&mut BufReader<File>) -> std::io::Result<T>,
    ) -> Result<Option<T>> {
        let path = self.root.join(file);
        let Some(mut reader) = fsutil::open_optional_file_reader(&path)? else {
            log::trace!("`{}` is absent", path.display());
            return Ok(None);
        };

        parse(&mut reader)
            .map(Some)
            .map_err(|source| Error::Read { path, source })
    }
}
