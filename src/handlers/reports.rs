//! Reports handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::logic::markdown::{self, Block};
use crate::logic::narrative::{self, Narrative};
use crate::middleware::auth::SessionContext;
use crate::models::{ReportCard, ScanResult, Severity};

/// Context used before any scan has been confirmed in the session
pub const DEFAULT_REPORT_SUMMARY: &str = "102,400 traffic data points scanned. 1,240 Poisoning attack patterns detected. \
Focus identified on autonomous driving road sign datasets. K-means clustering shows variance 3x higher than baseline.";

#[derive(Debug, Serialize)]
pub struct ImpactItem {
    pub icon: &'static str,
    pub title: &'static str,
    pub desc: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SecurityReport {
    pub title: &'static str,
    pub document_id: String,
    pub generated_at: String,
    pub source_scan: Option<String>,
    pub cards: Vec<ReportCard>,
    pub narrative: Narrative,
    pub blocks: Vec<Block>,
    pub impact: Vec<ImpactItem>,
}

/// Security forensics report for the latest confirmed scan
pub async fn security(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Json<SecurityReport> {
    let latest = ctx.workspace.latest_result();
    let summary = latest
        .as_ref()
        .map(|r| r.summary.as_str())
        .unwrap_or(DEFAULT_REPORT_SUMMARY);

    let narrative = narrative::narrative_or_fallback(state.narrative.as_ref(), summary).await;
    let blocks = markdown::to_blocks(&narrative.text);
    let now = chrono::Utc::now();

    Json(SecurityReport {
        title: "Intelligent Security Forensics",
        document_id: format!("AM-{}-XJ", now.format("%Y")),
        generated_at: now.to_rfc3339(),
        source_scan: latest.as_ref().map(|r| r.file_name.clone()),
        cards: report_cards(latest.as_deref()),
        narrative,
        blocks,
        impact: impact_items(),
    })
}

fn report_cards(latest: Option<&ScanResult>) -> Vec<ReportCard> {
    let Some(result) = latest else {
        return vec![
            ReportCard {
                title: "Threat Level",
                value: "Level 2 (Moderate)".to_string(),
                desc: "Increase in cluster variance detected".to_string(),
            },
            ReportCard {
                title: "Protected Target",
                value: "ResNet-50 v2".to_string(),
                desc: "Baseline integrity verified".to_string(),
            },
            ReportCard {
                title: "Data Purity",
                value: "98.4%".to_string(),
                desc: "Average across 4 primary clusters".to_string(),
            },
        ];
    };

    let threat_level = match Severity::from_threats(result.threats_detected) {
        Severity::Low => "Level 1 (Low)",
        Severity::Medium => "Level 2 (Moderate)",
        Severity::High => "Level 3 (Critical)",
    };

    vec![
        ReportCard {
            title: "Threat Level",
            value: threat_level.to_string(),
            desc: format!("{} anomalous samples isolated", result.threats_detected),
        },
        ReportCard {
            title: "Protected Target",
            value: result.file_name.clone(),
            desc: format!("{} dataset", result.file_type),
        },
        ReportCard {
            title: "Data Purity",
            value: format!("{}%", result.safety_score),
            desc: format!("Across {} scanned points", result.data_points.len()),
        },
    ]
}

fn impact_items() -> Vec<ImpactItem> {
    vec![
        ImpactItem {
            icon: "fa-user-shield",
            title: "Privacy Integrity",
            desc: "Differential isolation protocols ensure zero leakage during verification.",
        },
        ImpactItem {
            icon: "fa-building",
            title: "Asset Stability",
            desc: "Preemptive neutralization of poisoning vectors secures long-term ROI.",
        },
        ImpactItem {
            icon: "fa-users",
            title: "Safety Guarantee",
            desc: "Critical safety margins maintained for autonomous and medical AI use-cases.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn result(threats: u32) -> ScanResult {
        ScanResult {
            id: Uuid::nil(),
            file_name: "train.csv".to_string(),
            file_type: "CSV".to_string(),
            threats_detected: threats,
            data_points: Vec::new(),
            summary: String::new(),
            timestamp: "2024-05-18T09:30:00Z".to_string(),
            safety_score: 100u8.saturating_sub((threats * 4) as u8),
            is_live_stream: false,
            fingerprint: None,
        }
    }

    #[test]
    fn test_default_cards() {
        let cards = report_cards(None);
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[2].value, "98.4%");
    }

    #[test]
    fn test_cards_follow_latest_scan() {
        let cards = report_cards(Some(&result(25)));
        assert_eq!(cards[0].value, "Level 3 (Critical)");
        assert_eq!(cards[1].value, "train.csv");
        assert_eq!(cards[2].value, "0%");

        let cards = report_cards(Some(&result(0)));
        assert_eq!(cards[0].value, "Level 1 (Low)");
        assert_eq!(cards[2].value, "100%");
    }
}
