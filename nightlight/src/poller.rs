// SPDX-License-Identifier: GPL-3.0-only
//! Periodic intensity updates driven by host utilization.

use log::{debug, error, info, warn};
use nightlight_shared::{BlobStore, BlueLightFilter, Percent};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::sampler::UtilizationSampler;

/// What the poller saw before it started, used to put things back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Raw stored strength, so off-grid values come back unchanged.
    pub strength: u16,
    pub was_on: bool,
}

/// Outcome of a finished polling run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub restored: bool,
}

/// Owns the filter for the lifetime of the run; nothing else may write
/// the records while it is active.
pub struct IntensityPoller<S, U> {
    filter: BlueLightFilter<S>,
    sampler: U,
    interval: Duration,
    restore_on_exit: bool,
}

impl<S, U> IntensityPoller<S, U>
where
    S: BlobStore,
    U: UtilizationSampler,
{
    #[must_use]
    pub fn new(
        filter: BlueLightFilter<S>,
        sampler: U,
        interval: Duration,
        restore_on_exit: bool,
    ) -> Self {
        Self {
            filter,
            sampler,
            interval,
            restore_on_exit,
        }
    }

    /// Poll until `shutdown` fires (or its sender is dropped), then restore
    /// the startup state if configured to.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> PollReport {
        let snapshot = self.snapshot();
        let mut report = PollReport::default();

        info!(
            "Driving night light from {} utilization every {}ms",
            self.sampler.name(),
            self.interval.as_millis()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Poller received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    report.cycles += 1;
                    if !self.poll_once() {
                        report.failed_cycles += 1;
                    }
                }
            }
        }

        if self.restore_on_exit {
            report.restored = self.restore(snapshot);
        }
        report
    }

    /// Run one sample-and-apply cycle. Returns false if the update failed.
    pub fn poll_once(&mut self) -> bool {
        let usage = Percent::saturating(self.sampler.sample());
        debug!("Current {} usage: {usage}", self.sampler.name());

        match self.filter.set_intensity(usage) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to apply intensity {usage}: {e}");
                false
            }
        }
    }

    fn snapshot(&self) -> Option<Snapshot> {
        let strength = self.filter.strength();
        let was_on = self.filter.is_on();
        match (strength, was_on) {
            (Ok(strength), Ok(was_on)) => {
                info!(
                    "Captured startup state: {} at strength {strength}",
                    if was_on { "on" } else { "off" }
                );
                Some(Snapshot { strength, was_on })
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Could not capture startup state, it will not be restored: {e}");
                None
            }
        }
    }

    /// Best-effort write of the captured state. Each record is only written
    /// if it differs from the snapshot, and the state never flips twice.
    fn restore(&self, snapshot: Option<Snapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };

        if snapshot.was_on {
            if let Err(e) = self.filter.turn_on() {
                error!("Failed to turn night light back on: {e}");
                return false;
            }
        }
        if let Err(e) = self.filter.set_strength(snapshot.strength) {
            error!("Failed to restore strength {}: {e}", snapshot.strength);
            return false;
        }
        if !snapshot.was_on {
            if let Err(e) = self.filter.turn_off() {
                error!("Failed to turn night light back off: {e}");
                return false;
            }
        }

        info!("Restored night light to strength {}", snapshot.strength);
        true
    }
}
