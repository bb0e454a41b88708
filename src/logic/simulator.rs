//! Scan Simulator
//!
//! Finite-state machine behind the scanner screen:
//!
//! ```text
//!   idle ──start──▶ uploading ──progress 100──▶ scanning ──last step + delay──▶ completed
//!    ▲                                                                            │
//!    └──────────────────────────── reset / confirm ───────────────────────────────┘
//! ```
//!
//! The machine itself holds no timers. [`crate::logic::driver`] calls the
//! tick methods on a schedule; every tick carries the epoch it was scheduled
//! for, and ticks from an older epoch are dropped.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::generator::{self, AdversarialShare};
use crate::models::{
    is_accepted_file, DataPoint, ScanProfile, ScanResult, ScanSnapshot, ScanSource, ScanStatus,
    ACCEPTED_EXTENSIONS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("A scan is already in progress")]
    InProgress,

    #[error("Unsupported dataset '{0}'. Accepted types: csv, json, log")]
    UnsupportedFile(String),

    #[error("No completed scan to confirm")]
    NotCompleted,

    #[error("Point '{0}' not found in the current scan")]
    PointNotFound(String),
}

/// Outcome of an upload tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTick {
    Progress(u8),
    /// Progress hit 100 and the machine moved to scanning
    Finished,
    /// Stale epoch or wrong state
    Ignored,
}

/// Outcome of a scanning tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTick {
    Advanced(usize),
    /// Already on the last step; completion is due after the final delay
    Exhausted,
    Ignored,
}

#[derive(Debug)]
pub struct ScanSimulator {
    status: ScanStatus,
    profile: Option<ScanProfile>,
    progress: u8,
    current_step: usize,
    result: Option<ScanResult>,
    selected_point: Option<String>,
    epoch: u64,
    point_total: usize,
    upload_increment: u8,
}

impl ScanSimulator {
    pub fn new(point_total: usize, upload_increment: u8) -> Self {
        Self {
            status: ScanStatus::Idle,
            profile: None,
            progress: 0,
            current_step: 0,
            result: None,
            selected_point: None,
            epoch: 0,
            point_total,
            upload_increment: upload_increment.max(1),
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn selected_point(&self) -> Option<&str> {
        self.selected_point.as_deref()
    }

    /// `idle → uploading`. Generates the scan result up front.
    ///
    /// Returns the epoch the timeline must tick with.
    pub fn start<R: Rng + ?Sized>(&mut self, source: ScanSource, rng: &mut R) -> Result<u64, ScanError> {
        if self.status != ScanStatus::Idle {
            return Err(ScanError::InProgress);
        }

        if let ScanSource::Upload { file_name, .. } = &source {
            if !is_accepted_file(file_name) {
                tracing::warn!(
                    "Rejected upload '{}' (accepted: {})",
                    file_name,
                    ACCEPTED_EXTENSIONS.join(", ")
                );
                return Err(ScanError::UnsupportedFile(file_name.clone()));
            }
        }

        let result = build_result(&source, self.point_total, rng);
        tracing::info!(
            "Scan started: {} ({}), {} threats staged",
            result.file_name,
            result.file_type,
            result.threats_detected
        );

        self.epoch += 1;
        self.status = ScanStatus::Uploading;
        self.profile = Some(source.profile());
        self.progress = 0;
        self.current_step = 0;
        self.selected_point = None;
        self.result = Some(result);

        Ok(self.epoch)
    }

    pub fn tick_upload(&mut self, epoch: u64) -> UploadTick {
        if epoch != self.epoch || self.status != ScanStatus::Uploading {
            return UploadTick::Ignored;
        }

        self.progress = self.progress.saturating_add(self.upload_increment).min(100);
        if self.progress >= 100 {
            self.status = ScanStatus::Scanning;
            tracing::debug!("Upload finished, scanning");
            return UploadTick::Finished;
        }

        UploadTick::Progress(self.progress)
    }

    pub fn tick_step(&mut self, epoch: u64) -> StepTick {
        if epoch != self.epoch || self.status != ScanStatus::Scanning {
            return StepTick::Ignored;
        }

        if self.current_step >= self.last_step() {
            return StepTick::Exhausted;
        }

        self.current_step += 1;
        StepTick::Advanced(self.current_step)
    }

    /// `scanning → completed`, only once every step has been shown
    pub fn complete(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch
            || self.status != ScanStatus::Scanning
            || self.current_step < self.last_step()
        {
            return false;
        }

        self.status = ScanStatus::Completed;
        if let Some(result) = &self.result {
            tracing::info!(
                "Scan completed: {} (safety score {})",
                result.file_name,
                result.safety_score
            );
        }
        true
    }

    /// Back to idle, discarding the result and the selection
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.status = ScanStatus::Idle;
        self.profile = None;
        self.progress = 0;
        self.current_step = 0;
        self.result = None;
        self.selected_point = None;
    }

    /// Hand the completed result over and return to idle
    pub fn confirm(&mut self) -> Result<ScanResult, ScanError> {
        if self.status != ScanStatus::Completed {
            return Err(ScanError::NotCompleted);
        }

        let result = self.result.take().ok_or(ScanError::NotCompleted)?;
        self.reset();
        Ok(result)
    }

    pub fn select_point(&mut self, point_id: &str) -> Result<DataPoint, ScanError> {
        let result = self
            .result
            .as_ref()
            .filter(|_| self.status == ScanStatus::Completed)
            .ok_or(ScanError::NotCompleted)?;

        let point = result
            .find_point(point_id)
            .cloned()
            .ok_or_else(|| ScanError::PointNotFound(point_id.to_string()))?;

        self.selected_point = Some(point.id.clone());
        Ok(point)
    }

    pub fn clear_selection(&mut self) {
        self.selected_point = None;
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        let steps = self
            .profile
            .map(|p| p.steps().iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        ScanSnapshot {
            status: self.status,
            profile: self.profile,
            progress: self.progress,
            current_step: self.current_step,
            steps,
            selected_point: self.selected_point.clone(),
            result: self
                .result
                .clone()
                .filter(|_| self.status == ScanStatus::Completed),
        }
    }

    fn last_step(&self) -> usize {
        self.profile
            .map(|p| p.steps().len().saturating_sub(1))
            .unwrap_or(0)
    }
}

/// SHA-256 hex digest of uploaded content
pub fn fingerprint(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

fn build_result<R: Rng + ?Sized>(source: &ScanSource, point_total: usize, rng: &mut R) -> ScanResult {
    let cloud = generator::generate(rng, point_total, AdversarialShare::Random);
    let safety_score = cloud.safety_score();
    let threats = cloud.adversarial_count as u32;
    let total = cloud.points.len();

    let fingerprint = match source {
        ScanSource::Upload { content: Some(content), .. } => Some(fingerprint(content)),
        _ => None,
    };

    let origin = match source {
        ScanSource::Upload { .. } => "uploaded dataset",
        ScanSource::LiveStream { .. } => "live Kafka stream",
    };

    let summary = format!(
        "{} data points scanned from {} '{}'. {} adversarial poisoning samples detected outside the normal clusters. Data integrity score: {}/100.",
        total,
        origin,
        source.display_name(),
        threats,
        safety_score
    );

    ScanResult {
        id: uuid::Builder::from_random_bytes(rng.gen()).into_uuid(),
        file_name: source.display_name().to_string(),
        file_type: source.file_type(),
        threats_detected: threats,
        data_points: cloud.into_points(),
        summary,
        timestamp: Utc::now().to_rfc3339(),
        safety_score,
        is_live_stream: matches!(source, ScanSource::LiveStream { .. }),
        fingerprint,
    }
}
