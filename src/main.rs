/// Entry point for the Cgroup Monitor.
///
/// Detects the cgroup hierarchy, then prints a CPU and memory report to stdout every five
/// seconds until interrupted. Diagnostics go to stderr through `env_logger`; set `RUST_LOG`
/// to change their verbosity.
///
/// # Errors
///
/// Returns an error only if startup output cannot be written.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug CGROUP_MONITOR_ROOT=/rootfs/sys/fs/cgroup cargo run
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    cgroup_monitor::run().await
}
