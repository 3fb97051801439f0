use std::fmt::{self, Display, Formatter};

use super::format::{format_bytes, format_cores, format_number};
use super::{CpuReport, MemoryReport, Sample};
use crate::cgroup::stats::RawCpuLimit;
use crate::cgroup::{CgroupCpu, CgroupMemory, CgroupVersion};

const WIDTH: usize = 80;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn separator(f: &mut Formatter<'_>, c: char) -> fmt::Result {
    writeln!(f, "{}", c.to_string().repeat(WIDTH))
}

/// Printed once at startup, before the first report.
#[derive(Debug, Clone, Copy)]
pub struct Banner(pub CgroupVersion);

impl Display for Banner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        separator(f, '=')?;
        writeln!(f, "Resource Monitor Started")?;
        separator(f, '=')?;
        writeln!(f, "Detected cgroup version: {}", self.0)?;
        separator(f, '=')?;
        writeln!(f)
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.timestamp.format(TIMESTAMP_FORMAT))?;
        separator(f, '-')?;
        write_cpu(f, &self.cpu)?;
        writeln!(f)?;
        write_memory(f, self.version, &self.memory)?;
        writeln!(f)?;
        separator(f, '=')?;
        writeln!(f)
    }
}

fn write_cpu(f: &mut Formatter<'_>, cpu: &CpuReport) -> fmt::Result {
    writeln!(f, "CPU Resources:")?;
    writeln!(f, "  Available Processors: {}", cpu.available_processors)?;
    match &cpu.cgroup {
        Ok(cgroup) => write_cgroup_cpu(f, cgroup),
        Err(err) => writeln!(f, "  Unable to read cgroup CPU info: {err}"),
    }
}

fn write_cgroup_cpu(f: &mut Formatter<'_>, cpu: &CgroupCpu) -> fmt::Result {
    if let Some(limit) = &cpu.limit {
        match &limit.raw {
            RawCpuLimit::CpuMax { quota, period } => {
                writeln!(f, "  cgroup v2 cpu.max: {quota} {period}")?;
            }
            RawCpuLimit::Cfs { quota, period } => {
                writeln!(f, "  cgroup v1 cpu.cfs_quota_us: {}", quota.0)?;
                writeln!(f, "  cgroup v1 cpu.cfs_period_us: {}", period.0)?;
            }
        }
        match limit.cores() {
            Some(cores) => writeln!(f, "  CPU Limit: {}", format_cores(cores))?,
            None => writeln!(f, "  CPU Limit: unlimited")?,
        }
    }

    if let Some(stat) = &cpu.stat {
        writeln!(f, "  cgroup v2 cpu.stat:")?;
        for line in stat.lines() {
            if line.value.is_empty() {
                writeln!(f, "    {}", line.key)?;
            } else {
                writeln!(f, "    {} {}", line.key, line.value)?;
            }
        }
    }

    if let Some(usage) = &cpu.usage {
        writeln!(
            f,
            "  Total CPU usage (nanoseconds): {}",
            format_number(usage.usage_nanos)
        )?;
    }

    Ok(())
}

fn write_memory(
    f: &mut Formatter<'_>,
    version: CgroupVersion,
    memory: &MemoryReport,
) -> fmt::Result {
    let runtime = &memory.runtime;
    writeln!(f, "Memory Resources:")?;
    writeln!(f, "  Runtime Max Memory: {}", format_bytes(runtime.max))?;
    writeln!(f, "  Runtime Total Memory: {}", format_bytes(runtime.total))?;
    writeln!(f, "  Runtime Used Memory: {}", format_bytes(runtime.used()))?;
    writeln!(f, "  Runtime Free Memory: {}", format_bytes(runtime.free))?;
    match &memory.cgroup {
        Ok(cgroup) => write_cgroup_memory(f, version, cgroup),
        Err(err) => writeln!(f, "  Unable to read cgroup memory info: {err}"),
    }
}

fn write_cgroup_memory(
    f: &mut Formatter<'_>,
    version: CgroupVersion,
    memory: &CgroupMemory,
) -> fmt::Result {
    let (prefix, limit_file, usage_file) = match version {
        CgroupVersion::V2 => ("cgroup v2", "memory.max", "memory.current"),
        CgroupVersion::V1 => (
            "cgroup v1",
            "memory.limit_in_bytes",
            "memory.usage_in_bytes",
        ),
    };

    if let Some(limit) = &memory.limit {
        match limit.limit_bytes {
            Some(bytes) => writeln!(f, "  {prefix} {limit_file}: {}", format_bytes(bytes))?,
            None => writeln!(f, "  {prefix} {limit_file}: unlimited")?,
        }
    }

    if let Some(usage) = &memory.usage {
        writeln!(f, "  {prefix} {usage_file}: {}", format_bytes(usage.usage_bytes))?;
    }

    if let Some(stat) = &memory.stat {
        writeln!(f, "  {prefix} memory.stat (selected):")?;
        for (key, value) in stat {
            writeln!(f, "    {key}: {}", format_bytes(*value))?;
        }
    }

    Ok(())
}
