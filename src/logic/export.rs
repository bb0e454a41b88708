//! Downloadable report artifacts
//!
//! Informal formats built from a confirmed [`ScanResult`]: a plain-text
//! forensic summary, a Markdown report, a CSV of every data point and the
//! full result as JSON.

use std::str::FromStr;

use thiserror::Error;

use crate::logic::generator;
use crate::models::{HistoryItem, ScanResult};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format '{0}'. Use txt, md, csv or json")]
    UnknownFormat(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

pub fn render(result: &ScanResult, format: ExportFormat) -> Result<Artifact, ExportError> {
    let body = match format {
        ExportFormat::Text => render_text(result),
        ExportFormat::Markdown => render_markdown(result),
        ExportFormat::Csv => render_csv(result)?,
        ExportFormat::Json => serde_json::to_string_pretty(result)?,
    };

    Ok(Artifact {
        file_name: artifact_name(result, format),
        content_type: format.content_type(),
        body,
    })
}

fn artifact_name(result: &ScanResult, format: ExportFormat) -> String {
    let stem: String = result
        .file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(result.file_name.as_str())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    format!("amin-forensic-{}.{}", stem, format.extension())
}

fn render_text(result: &ScanResult) -> String {
    let history = HistoryItem::from_result(result);
    let mut out = String::new();

    out.push_str("A.MIN SHIELD - FORENSIC SCAN REPORT\n");
    out.push_str("===================================\n");
    out.push_str(&format!("Scan ID:        {}\n", result.id));
    out.push_str(&format!("Dataset:        {}\n", result.file_name));
    out.push_str(&format!("Type:           {}\n", result.file_type));
    out.push_str(&format!("Source:         {}\n", source_label(result)));
    out.push_str(&format!("Timestamp:      {}\n", result.timestamp));
    out.push_str(&format!(
        "Data points:    {} ({} normal, {} adversarial)\n",
        result.data_points.len(),
        result.normal_count(),
        result.adversarial_count()
    ));
    out.push_str(&format!("Threats:        {}\n", result.threats_detected));
    out.push_str(&format!("Safety score:   {}/100\n", result.safety_score));
    out.push_str(&format!("Status:         {} ({})\n", history.status, history.severity.as_str()));
    if let Some(fp) = &result.fingerprint {
        out.push_str(&format!("SHA-256:        {}\n", fp));
    }
    out.push('\n');
    out.push_str(&result.summary);
    out.push('\n');
    out
}

fn render_markdown(result: &ScanResult) -> String {
    let history = HistoryItem::from_result(result);
    let composition = generator::composition(&result.data_points);
    let mut out = String::new();

    out.push_str(&format!("# Forensic Report: {}\n\n", result.file_name));
    out.push_str(&format!("> {}\n\n", result.summary));
    out.push_str("## Overview\n\n");
    out.push_str("| Field | Value |\n|---|---|\n");
    out.push_str(&format!("| Scan ID | `{}` |\n", result.id));
    out.push_str(&format!("| Type | {} |\n", result.file_type));
    out.push_str(&format!("| Source | {} |\n", source_label(result)));
    out.push_str(&format!("| Timestamp | {} |\n", result.timestamp));
    out.push_str(&format!("| Status | {} |\n", history.status));
    out.push_str(&format!("| Severity | {} |\n", history.severity.as_str()));
    out.push_str(&format!("| Safety score | {}/100 |\n", result.safety_score));
    if let Some(fp) = &result.fingerprint {
        out.push_str(&format!("| SHA-256 | `{}` |\n", fp));
    }

    out.push_str("\n## Composition\n\n");
    out.push_str(&format!(
        "- Normal samples: {} ({}%)\n",
        composition.normal_count, composition.normal_pct
    ));
    out.push_str(&format!(
        "- Adversarial samples: {} ({}%)\n",
        composition.adversarial_count, composition.adversarial_pct
    ));

    let adversarial: Vec<_> = result.data_points.iter().filter(|p| p.is_adversarial()).collect();
    if !adversarial.is_empty() {
        out.push_str("\n## Isolated Samples\n\n");
        out.push_str("| ID | X | Y | Airline | Route |\n|---|---|---|---|---|\n");
        for point in adversarial {
            out.push_str(&format!(
                "| {} | {:.2} | {:.2} | {} | {} |\n",
                point.id, point.x, point.y, point.airline, point.route
            ));
        }
    }

    out
}

fn render_csv(result: &ScanResult) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "x",
        "y",
        "type",
        "airline",
        "date_of_journey",
        "source",
        "destination",
        "route",
        "dep_time",
        "arrival_time",
        "duration",
        "stops",
        "additional_info",
    ])?;

    for p in &result.data_points {
        let x = format!("{:.4}", p.x);
        let y = format!("{:.4}", p.y);
        let record: [&str; 14] = [
            &p.id,
            &x,
            &y,
            p.kind.as_str(),
            &p.airline,
            &p.date_of_journey,
            &p.source,
            &p.destination,
            &p.route,
            &p.dep_time,
            &p.arrival_time,
            &p.duration,
            &p.stops,
            &p.additional_info,
        ];
        writer.write_record(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
}

fn source_label(result: &ScanResult) -> &'static str {
    if result.is_live_stream {
        "Live stream"
    } else {
        "File upload"
    }
}
