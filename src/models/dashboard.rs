//! Dashboard and report card models

use serde::Serialize;

use super::HistoryItem;

#[derive(Debug, Clone, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub name: &'static str,
    pub threats: u32,
    pub safe: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionSlice {
    pub name: &'static str,
    pub value: u32,
}

/// Counters derived from the current session's history
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub scans_completed: usize,
    pub threats_detected: u32,
    pub critical_scans: usize,
    pub verified_safe: usize,
}

impl SessionStats {
    pub fn from_history(history: &[HistoryItem]) -> Self {
        use super::Severity;

        history.iter().fold(Self::default(), |mut stats, item| {
            stats.scans_completed += 1;
            stats.threats_detected += item.threats;
            match item.severity {
                Severity::High => stats.critical_scans += 1,
                Severity::Low => stats.verified_safe += 1,
                Severity::Medium => {}
            }
            stats
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub stats: Vec<StatCard>,
    pub weekly_trends: Vec<TrendPoint>,
    pub attack_distribution: Vec<DistributionSlice>,
    pub session: SessionStats,
    pub recent_scans: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportCard {
    pub title: &'static str,
    pub value: String,
    pub desc: String,
}

pub fn stat_cards() -> Vec<StatCard> {
    vec![
        StatCard { label: "Total Scanned Data", value: "1,024,192".to_string(), icon: "fa-database" },
        StatCard { label: "Detected Attacks", value: "142".to_string(), icon: "fa-virus-slash" },
        StatCard { label: "Protected Models", value: "12".to_string(), icon: "fa-brain" },
        StatCard { label: "System Reliability", value: "99.9%".to_string(), icon: "fa-check-circle" },
    ]
}

pub fn weekly_trends() -> Vec<TrendPoint> {
    [
        ("Mon", 12, 140),
        ("Tue", 19, 155),
        ("Wed", 3, 160),
        ("Thu", 25, 130),
        ("Fri", 8, 180),
        ("Sat", 2, 90),
        ("Sun", 4, 85),
    ]
    .into_iter()
    .map(|(name, threats, safe)| TrendPoint { name, threats, safe })
    .collect()
}

pub fn attack_distribution() -> Vec<DistributionSlice> {
    vec![
        DistributionSlice { name: "Normal Data", value: 850 },
        DistributionSlice { name: "Poisoning Attack", value: 120 },
        DistributionSlice { name: "Evasion Attack", value: 30 },
    ]
}
