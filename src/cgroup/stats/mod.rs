//! Pure parsers for cgroup pseudo-files.
//!
//! Everything in this module works on a [`std::io::BufRead`] and never touches the filesystem,
//! so each schema can be exercised against synthetic file contents. Opening the real files is
//! the job of [`super::CgroupReader`].
//!
//! # Main types
//!
//! - [`CpuLimit`]: a CPU bandwidth limit from `cpu.max` (v2) or the CFS files (v1).
//! - [`CpuStat`]: the verbatim lines of `cpu.stat` (v2).
//! - [`CpuAcctUsage`]: cumulative CPU time from `cpuacct.usage` (v1).
//! - [`MemoryLimit`], [`MemoryUsage`]: single-value memory files of both hierarchies.
//! - [`MemoryStat`], [`LegacyMemoryStat`]: allow-listed `memory.stat` entries (v2, v1).

mod cpu;
mod error;
mod memory;
mod parser;

pub use cpu::{CfsPeriod, CfsQuota, CpuAcctUsage, CpuLimit, CpuStat, RawCpuLimit, StatLine};
pub use error::StatParseError;
pub use memory::{
    DEFAULT_V1_UNLIMITED_THRESHOLD, LegacyMemoryStat, MemoryLimit, MemoryStat, MemoryUsage,
};
pub use parser::{KeyValueStat, SelectedStat, SingleLineStat, parse_single_value, read_single_line};
