//! Scan Driver
//!
//! Owns the single timer chain of a scanner slot. Starting a scan spawns one
//! tokio task that ticks the [`ScanSimulator`]; reset, confirm and drop abort
//! it. The simulator lock is never held across an await.
//!
//! Lock order is timer slot, then simulator. Start, confirm and reset hold the
//! timer slot for the whole transition, so the handle they abort or replace
//! always belongs to the scan they changed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::simulator::{ScanError, ScanSimulator, StepTick, UploadTick};
use crate::models::{DataPoint, ScanProfile, ScanResult, ScanSnapshot, ScanSource, ScanStatus};

/// Timer settings of the scan timeline
#[derive(Debug, Clone)]
pub struct ScanTimings {
    pub upload_interval: Duration,
    pub upload_increment: u8,
    pub file_step_interval: Duration,
    pub stream_step_interval: Duration,
    pub completion_delay: Duration,
}

impl Default for ScanTimings {
    fn default() -> Self {
        Self {
            upload_interval: Duration::from_millis(50),
            upload_increment: 5,
            file_step_interval: Duration::from_millis(1500),
            stream_step_interval: Duration::from_millis(600),
            completion_delay: Duration::from_millis(1000),
        }
    }
}

impl ScanTimings {
    pub fn step_interval(&self, profile: ScanProfile) -> Duration {
        match profile {
            ScanProfile::FileUpload => self.file_step_interval,
            ScanProfile::LiveStream => self.stream_step_interval,
        }
    }
}

pub struct ScanDriver {
    simulator: Arc<Mutex<ScanSimulator>>,
    timings: ScanTimings,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ScanDriver {
    pub fn new(point_total: usize, timings: ScanTimings) -> Self {
        let simulator = ScanSimulator::new(point_total, timings.upload_increment);
        Self {
            simulator: Arc::new(Mutex::new(simulator)),
            timings,
            timer: Mutex::new(None),
        }
    }

    /// Start a scan and spawn its timeline. Must run inside a tokio runtime.
    pub fn start<R: Rng + ?Sized>(&self, source: ScanSource, rng: &mut R) -> Result<ScanSnapshot, ScanError> {
        let profile = source.profile();
        let mut timer = self.timer.lock();
        let epoch = self.simulator.lock().start(source, rng)?;

        let task = tokio::spawn(run_timeline(
            self.simulator.clone(),
            epoch,
            self.timings.clone(),
            profile,
        ));

        if let Some(previous) = timer.replace(task) {
            previous.abort();
        }
        drop(timer);

        Ok(self.snapshot())
    }

    pub fn reset(&self) {
        let mut timer = self.timer.lock();
        self.simulator.lock().reset();
        if let Some(task) = timer.take() {
            task.abort();
        }
    }

    pub fn confirm(&self) -> Result<ScanResult, ScanError> {
        let mut timer = self.timer.lock();
        let result = self.simulator.lock().confirm()?;
        if let Some(task) = timer.take() {
            task.abort();
        }
        Ok(result)
    }

    pub fn select_point(&self, point_id: &str) -> Result<DataPoint, ScanError> {
        self.simulator.lock().select_point(point_id)
    }

    pub fn clear_selection(&self) {
        self.simulator.lock().clear_selection();
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.simulator.lock().snapshot()
    }

    pub fn status(&self) -> ScanStatus {
        self.simulator.lock().status()
    }

    fn cancel_timer(&self) {
        if let Some(task) = self.timer.lock().take() {
            task.abort();
        }
    }
}

impl Drop for ScanDriver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn run_timeline(
    simulator: Arc<Mutex<ScanSimulator>>,
    epoch: u64,
    timings: ScanTimings,
    profile: ScanProfile,
) {
    let mut upload = time::interval(timings.upload_interval);
    upload.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    upload.tick().await;

    loop {
        upload.tick().await;
        let tick = simulator.lock().tick_upload(epoch);
        match tick {
            UploadTick::Progress(_) => continue,
            UploadTick::Finished => break,
            UploadTick::Ignored => return,
        }
    }

    let mut steps = time::interval(timings.step_interval(profile));
    steps.set_missed_tick_behavior(MissedTickBehavior::Delay);
    steps.tick().await;

    loop {
        steps.tick().await;
        let tick = simulator.lock().tick_step(epoch);
        match tick {
            StepTick::Advanced(step) => tracing::debug!("Scan step {} reached", step),
            StepTick::Exhausted => break,
            StepTick::Ignored => return,
        }
    }

    time::sleep(timings.completion_delay).await;
    simulator.lock().complete(epoch);
}
