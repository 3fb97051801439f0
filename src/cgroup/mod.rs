//! Resource limits and consumption of the cgroup this process runs in.
//!
//! This module detects which cgroup hierarchy the host exposes and reads the CPU and memory
//! pseudo-files of either schema.
//!
//! # Key Components
//!
//! - [`CgroupVersion`]: the detected hierarchy, decided once per run.
//! - [`CgroupReader`]: reads [`CgroupCpu`] and [`CgroupMemory`] for a fixed version.
//! - [`stats`]: pure parsers for the individual file formats.
//!
//! # Supported Files
//!
//! Relative to the cgroup root (usually `/sys/fs/cgroup`), if available:
//!
//! - v2: `cpu.max`, `cpu.stat`, `memory.max`, `memory.current`, `memory.stat`
//! - v1: `cpu/cpu.cfs_quota_us`, `cpu/cpu.cfs_period_us`, `cpu,cpuacct/cpuacct.usage`,
//!   `memory/memory.limit_in_bytes`, `memory/memory.usage_in_bytes`, `memory/memory.stat`
mod error;
mod reader;
pub mod stats;
mod version;

pub use error::{Error, Result};
pub use reader::{CgroupCpu, CgroupMemory, CgroupReader};
pub use version::CgroupVersion;
