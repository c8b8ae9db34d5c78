use tracing::error;
use uuid::Uuid;

use crate::error::{AppError, StoreError};
use crate::models::stats::DateWindow;
use crate::observability::metrics::Metrics;

#[derive(Debug)]
pub struct FailureReport<'a> {
    pub source: &'static str,
    pub driver_id: Option<Uuid>,
    pub window: Option<&'a DateWindow>,
    pub error: &'a StoreError,
}

pub fn report_failure(metrics: &Metrics, report: FailureReport<'_>) -> AppError {
    metrics
        .data_source_failures_total
        .with_label_values(&[report.source])
        .inc();

    error!(
        source = report.source,
        driver_id = ?report.driver_id,
        window_start = ?report.window.map(|w| w.start),
        window_end = ?report.window.map(|w| w.end),
        error = %report.error,
        "data source read failed"
    );

    AppError::DataSource {
        data_source: report.source,
        message: report.error.to_string(),
    }
}
