//! Scan workflow handlers

use axum::{http::StatusCode, Json};
use serde::Serialize;
use validator::Validate;

use crate::AppResult;
use crate::middleware::auth::SessionContext;
use crate::models::{
    ConnectStreamRequest, DataPoint, HistoryItem, ScanResult, ScanSnapshot, ScanSource,
    SelectPointRequest, StartScanRequest, DEFAULT_STREAM_TOPIC,
};

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub history_item: HistoryItem,
    pub result: ScanResult,
}

/// Start a file upload scan
pub async fn start(
    ctx: SessionContext,
    Json(req): Json<StartScanRequest>,
) -> AppResult<Json<ScanSnapshot>> {
    req.validate()?;

    let source = ScanSource::Upload {
        file_name: req.file_name.trim().to_string(),
        content: req.content.map(String::into_bytes),
    };

    let snapshot = ctx.workspace.scanner.start(source, &mut rand::thread_rng())?;
    tracing::info!("Upload scan started by {}", ctx.email);

    Ok(Json(snapshot))
}

/// Start a live stream scan. The body is optional.
pub async fn connect(
    ctx: SessionContext,
    body: Option<Json<ConnectStreamRequest>>,
) -> AppResult<Json<ScanSnapshot>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    req.validate()?;

    let topic = req
        .topic
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_STREAM_TOPIC.to_string());

    tracing::info!("Live stream scan on '{}' started by {}", topic, ctx.email);
    let snapshot = ctx
        .workspace
        .scanner
        .start(ScanSource::LiveStream { topic }, &mut rand::thread_rng())?;

    Ok(Json(snapshot))
}

/// Current simulator state
pub async fn current(ctx: SessionContext) -> Json<ScanSnapshot> {
    Json(ctx.workspace.scanner.snapshot())
}

/// Confirm the completed scan into history
pub async fn confirm(ctx: SessionContext) -> AppResult<Json<ConfirmResponse>> {
    let (history_item, result) = ctx.workspace.confirm_scan()?;

    Ok(Json(ConfirmResponse {
        history_item,
        result: (*result).clone(),
    }))
}

/// Abandon the scan and return to idle
pub async fn reset(ctx: SessionContext) -> Json<ScanSnapshot> {
    let previous = ctx.workspace.scanner.status();
    ctx.workspace.scanner.reset();
    tracing::debug!("Scan slot reset by {} (was {})", ctx.email, previous.as_str());
    Json(ctx.workspace.scanner.snapshot())
}

pub async fn select_point(
    ctx: SessionContext,
    Json(req): Json<SelectPointRequest>,
) -> AppResult<Json<DataPoint>> {
    let point = ctx.workspace.scanner.select_point(&req.point_id)?;
    Ok(Json(point))
}

pub async fn clear_selection(ctx: SessionContext) -> StatusCode {
    ctx.workspace.scanner.clear_selection();
    StatusCode::NO_CONTENT
}
