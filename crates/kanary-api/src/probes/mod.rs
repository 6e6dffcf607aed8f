//! Readiness checks: memory headroom, disk headroom, required configuration.
//!
//! Each readiness call evaluates all three checks fresh; nothing is cached.
//! Resource sampling sits behind `SystemSampler` so tests can pin readings.
//! When a sample is unavailable (unsupported platform, parse failure) the
//! check reports healthy with an "unavailable" message so readiness does not
//! flap on hosts we cannot measure.

use std::collections::BTreeMap;

use kanary_core::health::CheckResult;
use kanary_core::VersionInfo;

use crate::config::Settings;

const UTILIZATION_LIMIT_PERCENT: f64 = 90.0;

/// System memory reading, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemorySample {
    pub total: u64,
    pub available: u64,
}

impl MemorySample {
    /// MemAvailable is a kernel estimate and may exceed MemTotal.
    pub fn percent_used(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.total.saturating_sub(self.available) as f64 * 100.0 / self.total as f64
    }
}

/// Root-filesystem reading, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct DiskSample {
    pub total: u64,
    pub free: u64,
}

impl DiskSample {
    pub fn percent_used(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.total.saturating_sub(self.free) as f64 * 100.0 / self.total as f64
    }
}

/// Read-only capability for sampling host resources.
pub trait SystemSampler: Send + Sync {
    fn memory(&self) -> Option<MemorySample>;
    fn disk(&self) -> Option<DiskSample>;
}

/// Sampler returning pinned readings; used by tests and local experiments.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSampler {
    pub memory: Option<MemorySample>,
    pub disk: Option<DiskSample>,
}

impl SystemSampler for FixedSampler {
    fn memory(&self) -> Option<MemorySample> {
        self.memory
    }

    fn disk(&self) -> Option<DiskSample> {
        self.disk
    }
}

/// Production sampler: `/proc/meminfo` and `statvfs("/")` on Linux,
/// unavailable elsewhere.
pub struct ProcSampler;

impl SystemSampler for ProcSampler {
    fn memory(&self) -> Option<MemorySample> {
        read_proc_meminfo()
    }

    fn disk(&self) -> Option<DiskSample> {
        statvfs_root()
    }
}

#[cfg(target_os = "linux")]
fn read_proc_meminfo() -> Option<MemorySample> {
    let content = std::fs::read_to_string("/proc/meminfo").ok()?;
    let mut total_kb = None;
    let mut available_kb = None;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = rest.split_whitespace().next()?.parse::<u64>().ok();
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = rest.split_whitespace().next()?.parse::<u64>().ok();
        }
    }
    Some(MemorySample {
        total: total_kb? * 1024,
        available: available_kb? * 1024,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_proc_meminfo() -> Option<MemorySample> {
    None
}

// statvfs via inline FFI; no libc dependency. Layout matches glibc's
// 64-bit struct statvfs (bits/statvfs.h).
#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
fn statvfs_root() -> Option<DiskSample> {
    use std::os::raw::{c_char, c_int, c_ulong};

    #[repr(C)]
    struct StatVfs {
        f_bsize: c_ulong,
        f_frsize: c_ulong,
        f_blocks: u64,
        f_bfree: u64,
        f_bavail: u64,
        f_files: u64,
        f_ffree: u64,
        f_favail: u64,
        f_fsid: c_ulong,
        f_flag: c_ulong,
        f_namemax: c_ulong,
        f_spare: [c_int; 6],
    }

    extern "C" {
        fn statvfs(path: *const c_char, buf: *mut StatVfs) -> c_int;
    }

    let path = b"/\0";
    let mut buf = std::mem::MaybeUninit::<StatVfs>::uninit();
    let rc = unsafe { statvfs(path.as_ptr().cast::<c_char>(), buf.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    let st = unsafe { buf.assume_init() };
    let frsize = if st.f_frsize > 0 {
        st.f_frsize as u64
    } else {
        st.f_bsize as u64
    };
    let total = st.f_blocks.checked_mul(frsize)?;
    if total == 0 {
        return None;
    }
    Some(DiskSample {
        total,
        free: st.f_bavail.saturating_mul(frsize),
    })
}

#[cfg(not(all(target_os = "linux", target_pointer_width = "64")))]
fn statvfs_root() -> Option<DiskSample> {
    None
}

/// Run all three readiness checks. Key set is fixed: memory, disk, config.
pub fn run_checks(
    settings: &Settings,
    version: &VersionInfo,
    sampler: &dyn SystemSampler,
) -> BTreeMap<String, CheckResult> {
    let mut checks = BTreeMap::new();
    checks.insert("memory".to_string(), check_memory(sampler));
    checks.insert("disk".to_string(), check_disk(sampler));
    checks.insert("config".to_string(), check_configuration(settings, version));
    checks
}

fn check_memory(sampler: &dyn SystemSampler) -> CheckResult {
    match sampler.memory() {
        Some(mem) => {
            let percent = mem.percent_used();
            let message = format!("Memory usage: {:.1}%", percent);
            let result = if percent < UTILIZATION_LIMIT_PERCENT {
                CheckResult::healthy(message)
            } else {
                CheckResult::unhealthy(message)
            };
            result
                .with_detail("total", mem.total)
                .with_detail("available", mem.available)
                .with_detail("percent", round1(percent))
        }
        None => CheckResult::healthy("Memory stats unavailable"),
    }
}

fn check_disk(sampler: &dyn SystemSampler) -> CheckResult {
    match sampler.disk() {
        Some(disk) => {
            let percent = disk.percent_used();
            let message = format!("Disk usage: {:.1}%", percent);
            let result = if percent < UTILIZATION_LIMIT_PERCENT {
                CheckResult::healthy(message)
            } else {
                CheckResult::unhealthy(message)
            };
            result
                .with_detail("total", disk.total)
                .with_detail("free", disk.free)
                .with_detail("percent", round1(percent))
        }
        None => CheckResult::healthy("Disk stats unavailable"),
    }
}

fn check_configuration(settings: &Settings, version: &VersionInfo) -> CheckResult {
    let required = [
        ("APP_NAME", settings.app_name.as_str()),
        ("APP_ENV", settings.app_env.as_str()),
        ("VERSION", version.version.as_str()),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();

    let result = if missing.is_empty() {
        CheckResult::healthy("Configuration OK")
    } else {
        CheckResult::unhealthy(format!("Missing: {}", missing.join(", ")))
    };
    result
        .with_detail("app_env", settings.app_env.clone())
        .with_detail("debug", settings.debug)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
