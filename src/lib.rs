//! Cgroup Monitor: periodically reports the CPU and memory limits and consumption of the
//! cgroup the process runs in.
//!
//! The cgroup hierarchy (v1 or v2) is detected once at startup. Every iteration then reads the
//! matching pseudo-files, combines them with figures from the host runtime and prints a report
//! to stdout.
use std::io::Write;

use tokio_util::sync::CancellationToken;

pub mod cgroup;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod monitor;
pub mod report;
pub mod runtime;
pub mod shutdown;

pub use config::Config;
pub use error::{Error, Result};

/// Runs the monitor until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the startup banner cannot be written to stdout. Failures during the
/// reporting loop are logged and never returned.
pub async fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    log::debug!("Configuration: {config:?}");

    let version = cgroup::CgroupVersion::detect(&config.cgroup_root);
    log::debug!(
        "Detected cgroup {} at `{}`",
        version,
        config.cgroup_root.display()
    );

    let mut stdout = std::io::stdout();
    write!(stdout, "{}", report::Banner(version))?;
    stdout.flush()?;

    let reader = cgroup::CgroupReader::new(&config.cgroup_root, version)
        .with_v1_unlimited_threshold(config.v1_unlimited_threshold);
    let sampler = monitor::ResourceSampler::new(reader, runtime::SystemRuntime::default());

    let cancel = CancellationToken::new();
    let signal_task = shutdown::cancel_on_signal(cancel.clone());

    monitor::Monitor::new(sampler, stdout, config.interval)
        .run(cancel)
        .await;
    signal_task.abort();

    Ok(())
}
