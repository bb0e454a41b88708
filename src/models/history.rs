//! Scan history model

use serde::{Deserialize, Serialize};

use super::ScanResult;

/// Threat count above which a scan is treated as critical
pub const CRITICAL_THREAT_THRESHOLD: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_threats(threats: u32) -> Self {
        match threats {
            0 => Self::Low,
            1..=CRITICAL_THREAT_THRESHOLD => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Status label shown next to the severity
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Low => "Verified Safe",
            Self::Medium => "Anomalies Blocked",
            Self::High => "Critical Poisoning",
        }
    }
}

/// One row of the dashboard's scan history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub dataset: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub status: String,
    pub severity: Severity,
    pub threats: u32,
}

impl HistoryItem {
    /// Derive the history row for a finished scan
    pub fn from_result(result: &ScanResult) -> Self {
        let severity = Severity::from_threats(result.threats_detected);

        let date = chrono::DateTime::parse_from_rfc3339(&result.timestamp)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| result.timestamp.clone());

        Self {
            id: result.id.to_string(),
            dataset: result.file_name.clone(),
            kind: result.file_type.clone(),
            date,
            status: severity.status_label().to_string(),
            severity,
            threats: result.threats_detected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn result_with_threats(threats: u32) -> ScanResult {
        ScanResult {
            id: Uuid::nil(),
            file_name: "flights.csv".to_string(),
            file_type: "CSV".to_string(),
            threats_detected: threats,
            data_points: vec![],
            summary: String::new(),
            timestamp: "2024-05-18T09:30:00+00:00".to_string(),
            safety_score: 100,
            is_live_stream: false,
            fingerprint: None,
        }
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::from_threats(0), Severity::Low);
        assert_eq!(Severity::from_threats(1), Severity::Medium);
        assert_eq!(Severity::from_threats(20), Severity::Medium);
        assert_eq!(Severity::from_threats(21), Severity::High);
        assert_eq!(Severity::from_threats(500), Severity::High);
    }

    #[test]
    fn test_history_item_labels() {
        for threats in 0..=40 {
            let item = HistoryItem::from_result(&result_with_threats(threats));
            let expected = match threats {
                0 => ("Verified Safe", Severity::Low),
                1..=20 => ("Anomalies Blocked", Severity::Medium),
                _ => ("Critical Poisoning", Severity::High),
            };
            assert_eq!(item.status, expected.0, "status for {} threats", threats);
            assert_eq!(item.severity, expected.1, "severity for {} threats", threats);
            assert_eq!(item.threats, threats);
        }
    }

    #[test]
    fn test_history_item_fields() {
        let item = HistoryItem::from_result(&result_with_threats(3));
        assert_eq!(item.id, Uuid::nil().to_string());
        assert_eq!(item.dataset, "flights.csv");
        assert_eq!(item.kind, "CSV");
        assert_eq!(item.date, "2024-05-18 09:30");
    }
}
