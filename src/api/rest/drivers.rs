use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::stats::{AggregatedDriverStats, DriverStatsQuery, DriverStatsSummary, StatsPeriod};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers/:id/stats", get(driver_stats))
        .route("/fleet/stats", get(fleet_stats))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatsParams {
    #[serde(default)]
    pub period: StatsPeriod,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStatsParams {
    #[serde(default)]
    pub period: StatsPeriod,
    #[serde(default)]
    pub include_inactive: bool,
}

// The id stays a plain string so malformed ids get the aggregator's
// validation error rather than a path rejection.
async fn driver_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DriverStatsParams>,
) -> Result<Json<AggregatedDriverStats>, AppError> {
    let query = DriverStatsQuery {
        driver_id: id,
        period: params.period,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    Ok(Json(state.stats.get_driver_stats(&query).await?))
}

async fn fleet_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FleetStatsParams>,
) -> Result<Json<DriverStatsSummary>, AppError> {
    let summary = state
        .stats
        .get_all_drivers_stats_summary(params.period, params.include_inactive)
        .await?;

    Ok(Json(summary))
}
