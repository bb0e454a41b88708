//! Scan models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::DataPoint;

/// Dataset extensions accepted by the upload scanner
pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "json", "log"];

/// Default topic shown for live-stream scans
pub const DEFAULT_STREAM_TOPIC: &str = "flight-bookings.raw";

/// Scanner status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Idle,
    Uploading,
    Scanning,
    Completed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Scanning => "scanning",
            Self::Completed => "completed",
        }
    }

    /// Position in the timeline, used to check ordering
    pub fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Uploading => 1,
            Self::Scanning => 2,
            Self::Completed => 3,
        }
    }
}

/// Which scanner variant drives the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanProfile {
    FileUpload,
    LiveStream,
}

const FILE_UPLOAD_STEPS: &[&str] = &[
    "Checking file signature & integrity",
    "Detecting adversarial poisoning patterns",
    "Running K-means cluster validation",
    "Generating Gemini AI security insights",
];

const LIVE_STREAM_STEPS: &[&str] = &[
    "Connecting to Confluent Cloud topic",
    "Sampling in-flight Kafka records",
    "Detecting adversarial poisoning patterns",
    "Running Isolation Forest on stream window",
    "Deploying Flink SQL quarantine filter",
];

impl ScanProfile {
    /// Ordered step labels shown while scanning
    pub fn steps(&self) -> &'static [&'static str] {
        match self {
            Self::FileUpload => FILE_UPLOAD_STEPS,
            Self::LiveStream => LIVE_STREAM_STEPS,
        }
    }
}

/// What a scan was started from
#[derive(Debug, Clone)]
pub enum ScanSource {
    Upload {
        file_name: String,
        content: Option<Vec<u8>>,
    },
    LiveStream {
        topic: String,
    },
}

impl ScanSource {
    pub fn profile(&self) -> ScanProfile {
        match self {
            Self::Upload { .. } => ScanProfile::FileUpload,
            Self::LiveStream { .. } => ScanProfile::LiveStream,
        }
    }

    /// Name of the scanned dataset
    pub fn display_name(&self) -> &str {
        match self {
            Self::Upload { file_name, .. } => file_name,
            Self::LiveStream { topic } => topic,
        }
    }

    /// Dataset type label derived from the file extension
    pub fn file_type(&self) -> String {
        match self {
            Self::Upload { file_name, .. } => file_extension(file_name)
                .map(|ext| ext.to_ascii_uppercase())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            Self::LiveStream { .. } => "Kafka Stream".to_string(),
        }
    }
}

/// Lower-cased extension of a file name, if any
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_accepted_file(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Terminal record of a completed scan. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub threats_detected: u32,
    pub data_points: Vec<DataPoint>,
    pub summary: String,
    pub timestamp: String,
    pub safety_score: u8,
    pub is_live_stream: bool,
    /// SHA-256 of uploaded content, when content was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl ScanResult {
    pub fn normal_count(&self) -> usize {
        self.data_points.iter().filter(|p| !p.is_adversarial()).count()
    }

    pub fn adversarial_count(&self) -> usize {
        self.data_points.iter().filter(|p| p.is_adversarial()).count()
    }

    pub fn find_point(&self, id: &str) -> Option<&DataPoint> {
        self.data_points.iter().find(|p| p.id == id)
    }
}

/// Serializable view of the scanner slot
#[derive(Debug, Clone, Serialize)]
pub struct ScanSnapshot {
    pub status: ScanStatus,
    pub profile: Option<ScanProfile>,
    pub progress: u8,
    pub current_step: usize,
    pub steps: Vec<String>,
    pub selected_point: Option<String>,
    /// Only exposed once the scan has completed
    pub result: Option<ScanResult>,
}

// Request/Response types

#[derive(Debug, Deserialize, Validate)]
pub struct StartScanRequest {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,
    /// Raw dataset content, fingerprinted when present
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ConnectStreamRequest {
    #[validate(length(min = 1, max = 249, message = "Topic name must be 1-249 characters"))]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectPointRequest {
    pub point_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("train.CSV").as_deref(), Some("csv"));
        assert_eq!(file_extension("archive.tar.json").as_deref(), Some("json"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(".hidden"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_accepted_files() {
        assert!(is_accepted_file("flights.csv"));
        assert!(is_accepted_file("events.log"));
        assert!(is_accepted_file("Dump.JSON"));
        assert!(!is_accepted_file("model.onnx"));
        assert!(!is_accepted_file("README"));
    }

    #[test]
    fn test_source_file_type() {
        let upload = ScanSource::Upload { file_name: "a.json".into(), content: None };
        assert_eq!(upload.file_type(), "JSON");
        assert_eq!(upload.profile(), ScanProfile::FileUpload);

        let stream = ScanSource::LiveStream { topic: "t".into() };
        assert_eq!(stream.file_type(), "Kafka Stream");
        assert_eq!(stream.profile(), ScanProfile::LiveStream);
    }

    #[test]
    fn test_snapshot_uses_snake_case_keys() {
        let snapshot = ScanSnapshot {
            status: ScanStatus::Scanning,
            profile: Some(ScanProfile::LiveStream),
            progress: 100,
            current_step: 2,
            steps: ScanProfile::LiveStream.steps().iter().map(|s| s.to_string()).collect(),
            selected_point: None,
            result: None,
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["status"], "scanning");
        assert_eq!(value["status"], ScanStatus::Scanning.as_str());
        assert_eq!(value["profile"], "live_stream");
        assert_eq!(value["current_step"], 2);
        assert!(value.get("selected_point").is_some());
        assert!(value.get("currentStep").is_none());
    }

    #[test]
    fn test_profile_steps() {
        assert_eq!(ScanProfile::FileUpload.steps().len(), 4);
        assert_eq!(ScanProfile::LiveStream.steps().len(), 5);
    }
}
