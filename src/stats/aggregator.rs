use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, StoreError};
use crate::models::records::{DeliveryCounts, DistanceTotals, DriverProfile, ShiftTotals};
use crate::models::stats::{
    AggregatedDriverStats, CurrentShift, DateWindow, DeliveryStats, DistanceStats,
    DriverIdentity, DriverStatsQuery, DriverStatsSummary, ShiftStats, StatsPeriod, TopDriver,
    TrendInfo,
};
use crate::numeric::{ratio, round_to};
use crate::observability::metrics::Metrics;
use crate::observability::report::{report_failure, FailureReport};
use crate::stats::trend::{efficiency_rating, percent_change};
use crate::stats::window::{days_in_window, parse_driver_id, previous_window, resolve_window};
use crate::store::{
    DeliveryCountSource, DriverDirectory, ShiftSource, DRIVER_PROFILES, SHIFT_DISTANCE,
    SHIFT_DURATION,
};

const TOP_DRIVERS: usize = 5;
const DEFAULT_SUMMARY_CONCURRENCY: usize = 8;
const UNKNOWN_DRIVER: &str = "Unknown Driver";

pub struct DriverStatsAggregator {
    delivery_sources: Vec<Arc<dyn DeliveryCountSource>>,
    shifts: Arc<dyn ShiftSource>,
    directory: Arc<dyn DriverDirectory>,
    metrics: Metrics,
    summary_concurrency: usize,
}

impl DriverStatsAggregator {
    pub fn new(
        delivery_sources: Vec<Arc<dyn DeliveryCountSource>>,
        shifts: Arc<dyn ShiftSource>,
        directory: Arc<dyn DriverDirectory>,
        metrics: Metrics,
    ) -> Self {
        Self {
            delivery_sources,
            shifts,
            directory,
            metrics,
            summary_concurrency: DEFAULT_SUMMARY_CONCURRENCY,
        }
    }

    pub fn with_summary_concurrency(mut self, concurrency: usize) -> Self {
        self.summary_concurrency = concurrency.max(1);
        self
    }

    pub async fn get_driver_stats(
        &self,
        query: &DriverStatsQuery,
    ) -> Result<AggregatedDriverStats, AppError> {
        let start = Instant::now();
        let result = self.driver_stats_at(query, Utc::now()).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(AppError::InvalidInput(_)) => "invalid_input",
            Err(_) => "error",
        };
        self.metrics
            .driver_stats_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
        self.metrics
            .driver_stats_requests_total
            .with_label_values(&[outcome])
            .inc();

        result
    }

    pub async fn driver_stats_at(
        &self,
        query: &DriverStatsQuery,
        now: DateTime<Utc>,
    ) -> Result<AggregatedDriverStats, AppError> {
        let driver_id = parse_driver_id(&query.driver_id)?;
        let window = resolve_window(query.period, query.start_date, query.end_date, now)?;

        let (profile, counts, distance, shift_totals, current_shift) = tokio::join!(
            self.directory.driver_profile(driver_id),
            self.delivery_counts(driver_id, &window),
            self.shifts.distance_totals(driver_id, &window),
            self.shifts.shift_totals(driver_id, &window),
            self.current_shift(driver_id, now),
        );

        let profile =
            profile.map_err(|err| self.report(DRIVER_PROFILES, Some(driver_id), Some(&window), &err));
        let distance =
            distance.map_err(|err| self.report(SHIFT_DISTANCE, Some(driver_id), Some(&window), &err));
        let shift_totals = shift_totals
            .map_err(|err| self.report(SHIFT_DURATION, Some(driver_id), Some(&window), &err));

        let driver = match profile? {
            Some(profile) => DriverIdentity {
                id: profile.id,
                name: profile.name,
            },
            None => {
                debug!(driver_id = %driver_id, "no driver record, reporting as unknown");
                DriverIdentity {
                    id: driver_id,
                    name: UNKNOWN_DRIVER.to_string(),
                }
            }
        };
        let counts = counts?;
        let distance = distance?;
        let shift_totals = shift_totals?;

        let trends = if query.period.has_trend() {
            Some(
                self.trend(driver_id, &window, &counts, &distance, &shift_totals)
                    .await?,
            )
        } else {
            None
        };

        let days = days_in_window(&window) as f64;

        info!(
            driver_id = %driver_id,
            period = ?query.period,
            deliveries = counts.total,
            miles = distance.total_miles,
            "driver stats aggregated"
        );

        Ok(AggregatedDriverStats {
            driver,
            period: query.period,
            window,
            deliveries: DeliveryStats {
                total: counts.total,
                completed: counts.completed,
                cancelled: counts.cancelled,
                in_progress: counts.in_progress,
                daily_average: round_to(ratio(counts.total as f64, days), 1),
            },
            distance: DistanceStats {
                total_miles: round_to(distance.total_miles, 1),
                gps_verified_miles: round_to(distance.gps_verified_miles, 1),
                average_per_delivery: round_to(
                    ratio(distance.total_miles, counts.total as f64),
                    1,
                ),
                average_per_day: round_to(ratio(distance.total_miles, days), 1),
            },
            shifts: ShiftStats {
                total_shifts: shift_totals.shift_count,
                total_hours: round_to(shift_totals.total_hours, 1),
                average_shift_hours: round_to(
                    ratio(shift_totals.total_hours, shift_totals.shift_count as f64),
                    1,
                ),
            },
            current_shift,
            trends,
        })
    }

    pub async fn get_all_drivers_stats_summary(
        &self,
        period: StatsPeriod,
        include_inactive: bool,
    ) -> Result<DriverStatsSummary, AppError> {
        self.summary_at(period, include_inactive, Utc::now()).await
    }

    pub async fn summary_at(
        &self,
        period: StatsPeriod,
        include_inactive: bool,
        now: DateTime<Utc>,
    ) -> Result<DriverStatsSummary, AppError> {
        let window = resolve_window(period, None, None, now)?;

        let drivers = self
            .directory
            .list_drivers(include_inactive)
            .await
            .map_err(|err| self.report(DRIVER_PROFILES, None, Some(&window), &err))?;

        let window_ref = &window;
        let rows: Vec<Result<(DriverProfile, u64, f64), AppError>> = stream::iter(drivers)
            .map(|driver| async move {
                let (counts, distance) = tokio::join!(
                    self.delivery_counts(driver.id, window_ref),
                    self.shifts.distance_totals(driver.id, window_ref),
                );
                let distance = distance.map_err(|err| {
                    self.report(SHIFT_DISTANCE, Some(driver.id), Some(window_ref), &err)
                });
                let counts = counts?;
                let distance = distance?;
                Ok::<_, AppError>((driver, counts.total, distance.total_miles))
            })
            .buffered(self.summary_concurrency)
            .collect()
            .await;
        let rows = rows.into_iter().collect::<Result<Vec<_>, _>>()?;

        let active: Vec<&(DriverProfile, u64, f64)> =
            rows.iter().filter(|(driver, _, _)| driver.is_active).collect();

        let mut ranked: Vec<&(DriverProfile, u64, f64)> = rows.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let summary = DriverStatsSummary {
            period,
            window,
            total_drivers: rows.len() as u64,
            active_drivers: active.len() as u64,
            on_duty_drivers: rows
                .iter()
                .filter(|(driver, _, _)| driver.is_on_duty)
                .count() as u64,
            total_deliveries: active.iter().map(|(_, deliveries, _)| deliveries).sum(),
            total_miles: round_to(active.iter().map(|(_, _, miles)| miles).sum(), 1),
            top_drivers: ranked
                .into_iter()
                .take(TOP_DRIVERS)
                .map(|(driver, deliveries, miles)| TopDriver {
                    driver_id: driver.id,
                    name: driver.name.clone(),
                    deliveries: *deliveries,
                    miles: round_to(*miles, 1),
                })
                .collect(),
        };

        info!(
            period = ?period,
            drivers = summary.total_drivers,
            deliveries = summary.total_deliveries,
            "fleet stats summarized"
        );

        Ok(summary)
    }

    /// Sum over every delivery source. Sources cover disjoint eras, so
    /// counts are added, not deduplicated.
    async fn delivery_counts(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DeliveryCounts, AppError> {
        let results = join_all(self.delivery_sources.iter().map(|source| async move {
            source
                .delivery_counts(driver_id, window)
                .await
                .map_err(|err| self.report(source.name(), Some(driver_id), Some(window), &err))
        }))
        .await;

        results
            .into_iter()
            .try_fold(DeliveryCounts::default(), |acc, counts| counts.map(|c| acc + c))
    }

    async fn current_shift(&self, driver_id: Uuid, now: DateTime<Utc>) -> Option<CurrentShift> {
        match self.shifts.current_shift(driver_id).await {
            Ok(shift) => shift.map(|shift| CurrentShift {
                shift_id: shift.shift_id,
                started_at: shift.started_at,
                elapsed_hours: round_to(
                    (now - shift.started_at).num_seconds().max(0) as f64 / 3600.0,
                    1,
                ),
                deliveries: shift.delivery_count,
                on_break: shift.on_break,
            }),
            Err(err) => {
                debug!(driver_id = %driver_id, error = %err, "current shift unavailable");
                None
            }
        }
    }

    async fn trend(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
        counts: &DeliveryCounts,
        distance: &DistanceTotals,
        shift_totals: &ShiftTotals,
    ) -> Result<TrendInfo, AppError> {
        let previous = previous_window(window);

        let (previous_counts, previous_distance) = tokio::join!(
            self.delivery_counts(driver_id, &previous),
            self.shifts.distance_totals(driver_id, &previous),
        );
        let previous_distance = previous_distance
            .map_err(|err| self.report(SHIFT_DISTANCE, Some(driver_id), Some(&previous), &err));
        let previous_counts = previous_counts?;
        let previous_distance = previous_distance?;

        Ok(TrendInfo {
            previous_window: previous,
            previous_deliveries: previous_counts.total,
            previous_miles: round_to(previous_distance.total_miles, 1),
            delivery_change_pct: percent_change(
                counts.total as f64,
                previous_counts.total as f64,
            ),
            distance_change_pct: percent_change(
                distance.total_miles,
                previous_distance.total_miles,
            ),
            efficiency_rating: efficiency_rating(counts.total, shift_totals.total_hours),
        })
    }

    fn report(
        &self,
        source: &'static str,
        driver_id: Option<Uuid>,
        window: Option<&DateWindow>,
        error: &StoreError,
    ) -> AppError {
        report_failure(
            &self.metrics,
            FailureReport {
                source,
                driver_id,
                window,
                error,
            },
        )
    }
}
