//! One report per loop iteration and its textual rendering.
//!
//! A [`Sample`] is built fresh every iteration and never outlives it. Its CPU and memory
//! sections fail independently: a cgroup read error replaces only the cgroup part of the
//! affected section, while the host-runtime figures are always present.

mod format;
mod render;

pub use format::{format_bytes, format_cores, format_number};
pub use render::Banner;

use chrono::{DateTime, Local};

use crate::cgroup::{self, CgroupCpu, CgroupMemory, CgroupVersion};
use crate::runtime::RuntimeMemory;

/// The CPU section of a report.
#[derive(Debug)]
pub struct CpuReport {
    pub available_processors: usize,
    pub cgroup: cgroup::Result<CgroupCpu>,
}

/// The memory section of a report.
#[derive(Debug)]
pub struct MemoryReport {
    pub runtime: RuntimeMemory,
    pub cgroup: cgroup::Result<CgroupMemory>,
}

/// Everything emitted by a single iteration.
#[derive(Debug)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub version: CgroupVersion,
    pub cpu: CpuReport,
    pub memory: MemoryReport,
}
