//! Figures supplied by the execution environment rather than the cgroup filesystem.
//!
//! The report always carries the available processor count and a memory overview of the
//! host. These are treated as infallible: [`SystemRuntime`] logs and falls back to zeros when
//! `/proc/meminfo` cannot be read.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::cgroup::stats::KeyValueStat;
use crate::error::ResultOkLogExt;
use crate::fsutil;

const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Memory figures of the host runtime, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeMemory {
    /// The most memory the process could ever be backed by.
    pub max: u64,
    /// Memory currently provisioned to the runtime.
    pub total: u64,
    /// Provisioned memory not in use.
    pub free: u64,
}

impl RuntimeMemory {
    /// `total - free`, saturating at zero.
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

/// The execution environment's view of processors and memory.
pub trait HostRuntime {
    fn available_processors(&self) -> usize;

    fn memory(&self) -> RuntimeMemory;
}

/// [`HostRuntime`] backed by `num_cpus` and `/proc/meminfo`.
///
/// - `max` is `MemTotal + SwapTotal`
/// - `total` is `MemTotal`
/// - `free` is `MemAvailable`, or `MemFree` on kernels that do not report it
#[derive(Debug, Clone)]
pub struct SystemRuntime {
    meminfo_path: PathBuf,
}

impl Default for SystemRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_MEMINFO_PATH)
    }
}

impl SystemRuntime {
    pub fn new(meminfo_path: impl Into<PathBuf>) -> Self {
        Self {
            meminfo_path: meminfo_path.into(),
        }
    }
}

impl HostRuntime for SystemRuntime {
    fn available_processors(&self) -> usize {
        num_cpus::get()
    }

    fn memory(&self) -> RuntimeMemory {
        let Some(mut reader) = fsutil::open_file_reader(&self.meminfo_path).ok_log() else {
            return RuntimeMemory::default();
        };
        match MemInfo::from_reader(&mut reader) {
            Ok(info) => info.into(),
            Err(err) => {
                log::error!(
                    "failed to parse `{}`: {}",
                    self.meminfo_path.display(),
                    err
                );
                RuntimeMemory::default()
            }
        }
    }
}

/// Selected `/proc/meminfo` fields, in kibibytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct MemInfo {
    mem_total: u64,
    mem_free: u64,
    mem_available: Option<u64>,
    swap_total: u64,
}

impl MemInfo {
    fn set_mem_total(&mut self, v: u64) {
        self.mem_total = v;
    }

    fn set_mem_free(&mut self, v: u64) {
        self.mem_free = v;
    }

    fn set_mem_available(&mut self, v: u64) {
        self.mem_available = Some(v);
    }

    fn set_swap_total(&mut self, v: u64) {
        self.swap_total = v;
    }
}

type Setter = fn(&mut MemInfo, u64);

// keys carry the trailing colon of the meminfo format
static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(4);

    m.insert("MemTotal:", MemInfo::set_mem_total);
    m.insert("MemFree:", MemInfo::set_mem_free);
    m.insert("MemAvailable:", MemInfo::set_mem_available);
    m.insert("SwapTotal:", MemInfo::set_swap_total);

    m
});

impl KeyValueStat for MemInfo {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

impl From<MemInfo> for RuntimeMemory {
    fn from(info: MemInfo) -> Self {
        const KIB: u64 = 1024;
        let total = info.mem_total.saturating_mul(KIB);
        Self {
            max: info
                .mem_total
                .saturating_add(info.swap_total)
                .saturating_mul(KIB),
            total,
            free: info
                .mem_available
                .unwrap_or(info.mem_free)
                .saturating_mul(KIB),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:         1024000 kB
MemAvailable:    8192000 kB
Buffers:          512000 kB
Cached:          4096000 kB
SwapCached:            0 kB
SwapTotal:       2048000 kB
SwapFree:        2048000 kB
";

    #[test]
    fn test_parse_meminfo() {
        let info = MemInfo::from_reader(&mut MEMINFO.as_bytes()).unwrap();
        assert_eq!(info.mem_total, 16_384_000);
        assert_eq!(info.mem_free, 1_024_000);
        assert_eq!(info.mem_available, Some(8_192_000));
        assert_eq!(info.swap_total, 2_048_000);
    }

    #[test]
    fn test_runtime_memory_from_meminfo() {
        let info = MemInfo::from_reader(&mut MEMINFO.as_bytes()).unwrap();
        let memory = RuntimeMemory::from(info);
        assert_eq!(memory.max, (16_384_000 + 2_048_000) * 1024);
        assert_eq!(memory.total, 16_384_000 * 1024);
        assert_eq!(memory.free, 8_192_000 * 1024);
        assert_eq!(memory.used(), (16_384_000 - 8_192_000) * 1024);
    }

    #[test]
    fn test_runtime_memory_without_mem_available() {
        let data = "MemTotal: 2048 kB\nMemFree: 1024 kB\n";
        let info = MemInfo::from_reader(&mut data.as_bytes()).unwrap();
        let memory = RuntimeMemory::from(info);
        assert_eq!(memory.free, 1024 * 1024);
        assert_eq!(memory.max, memory.total);
    }

    #[test]
    fn test_used_saturates() {
        let memory = RuntimeMemory {
            max: 10,
            total: 10,
            free: 20,
        };
        assert_eq!(memory.used(), 0);
    }

    #[test]
    fn test_system_runtime_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, MEMINFO.as_bytes()).unwrap();
        let runtime = SystemRuntime::new(file.path());
        assert_eq!(runtime.memory().total, 16_384_000 * 1024);
        assert!(runtime.available_processors() >= 1);
    }

    #[test]
    fn test_system_runtime_missing_file_falls_back() {
        let runtime = SystemRuntime::new("/definitely/does/not/exist");
        assert_eq!(runtime.memory(), RuntimeMemory::default());
    }

    #[test]
    fn test_system_runtime_malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"MemTotal: lots kB\n").unwrap();
        let runtime = SystemRuntime::new(file.path());
        assert_eq!(runtime.memory(), RuntimeMemory::default());
    }
}
