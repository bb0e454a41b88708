//! Dashboard handlers

use axum::Json;

use crate::middleware::auth::SessionContext;
use crate::models::{self, DashboardOverview, SessionStats};

const RECENT_SCANS: usize = 5;

/// Overview charts plus counters for this session
pub async fn overview(ctx: SessionContext) -> Json<DashboardOverview> {
    let history = ctx.workspace.history();
    let session = SessionStats::from_history(&history);

    Json(DashboardOverview {
        stats: models::stat_cards(),
        weekly_trends: models::weekly_trends(),
        attack_distribution: models::attack_distribution(),
        session,
        recent_scans: history.into_iter().take(RECENT_SCANS).collect(),
    })
}
