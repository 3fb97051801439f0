//! The periodic reporting loop.
//!
//! [`Monitor::run`] emits one [`Sample`] per tick until its [`CancellationToken`] fires.
//! A failed iteration is logged and skipped; the next tick is the implicit retry. Once
//! cancellation is observed no further report is written, even if a sample was already taken.

use std::io::Write;
use std::time::Duration;

use chrono::Local;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cgroup::CgroupReader;
use crate::error::Result;
use crate::report::{CpuReport, MemoryReport, Sample};
use crate::runtime::HostRuntime;

/// Produces the report of one iteration.
pub trait Sampler {
    /// # Errors
    ///
    /// An error aborts the current iteration only.
    fn sample(&mut self) -> Result<Sample>;
}

/// [`Sampler`] combining the cgroup filesystem with the host runtime.
#[derive(Debug)]
pub struct ResourceSampler<H> {
    reader: CgroupReader,
    runtime: H,
}

impl<H: HostRuntime> ResourceSampler<H> {
    pub fn new(reader: CgroupReader, runtime: H) -> Self {
        Self { reader, runtime }
    }
}

impl<H: HostRuntime> Sampler for ResourceSampler<H> {
    fn sample(&mut self) -> Result<Sample> {
        let timestamp = Local::now();

        let cpu = CpuReport {
            available_processors: self.runtime.available_processors(),
            cgroup: self.reader.read_cpu(),
        };
        if let Err(err) = &cpu.cgroup {
            log::debug!("cgroup CPU section unavailable: {err}");
        }

        let memory = MemoryReport {
            runtime: self.runtime.memory(),
            cgroup: self.reader.read_memory(),
        };
        if let Err(err) = &memory.cgroup {
            log::debug!("cgroup memory section unavailable: {err}");
        }

        Ok(Sample {
            timestamp,
            version: self.reader.version(),
            cpu,
            memory,
        })
    }
}

/// Writes a report to `out` every `interval` until cancelled.
#[derive(Debug)]
pub struct Monitor<S, W> {
    sampler: S,
    out: W,
    interval: Duration,
}

impl<S: Sampler, W: Write> Monitor<S, W> {
    pub fn new(sampler: S, out: W, interval: Duration) -> Self {
        Self {
            sampler,
            out,
            interval,
        }
    }

    /// Runs the loop until `cancel` fires.
    ///
    /// The first report is written immediately. Cancellation interrupts the wait between two
    /// reports instead of waiting for it to elapse.
    pub async fn run(&mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let before = std::time::Instant::now();
            if let Err(err) = self.report_once(&cancel) {
                log::error!("Error reading resources: {err}");
            }
            log::trace!("report took {} microseconds", before.elapsed().as_micros());
        }

        log::info!("Interrupted, exiting...");
    }

    fn report_once(&mut self, cancel: &CancellationToken) -> Result<()> {
        let sample = self.sampler.sample()?;
        if cancel.is_cancelled() {
            log::debug!("Dropping sample taken at {} after cancellation", sample.timestamp);
            return Ok(());
        }

        write!(self.out, "{sample}")?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
