//! Scan history handlers

use axum::{
    extract::{Path, Query},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppResult};
use crate::logic::export::{self, ExportFormat};
use crate::middleware::auth::SessionContext;
use crate::models::HistoryItem;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// List confirmed scans, newest first
pub async fn list(ctx: SessionContext) -> Json<Vec<HistoryItem>> {
    Json(ctx.workspace.history())
}

/// Download a confirmed scan as a report artifact
pub async fn export(
    ctx: SessionContext,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("md").parse()?;

    let result = ctx
        .workspace
        .find_result(&id)
        .ok_or_else(|| AppError::NotFound("Scan not found".to_string()))?;

    let artifact = export::render(&result, format)?;
    tracing::info!("Exported {} for {}", artifact.file_name, ctx.email);

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [(CONTENT_TYPE, artifact.content_type.to_string()), (CONTENT_DISPOSITION, disposition)],
        artifact.body,
    )
        .into_response())
}
