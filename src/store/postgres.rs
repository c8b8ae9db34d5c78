use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::records::{
    ActiveShift, DeliveryCounts, DeliveryStatus, DistanceTotals, DriverProfile, ShiftTotals,
};
use crate::models::stats::DateWindow;
use crate::store::{
    DeliveryCountSource, DriverDirectory, ShiftSource, CURRENT_DELIVERIES, LEGACY_DISPATCHES,
};

const CURRENT_COUNTS_SQL: &str = r#"SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status::text = $4),
            COUNT(*) FILTER (WHERE status::text = $5)
        FROM deliveries
        WHERE driver_id = $1
          AND assigned_at >= $2
          AND assigned_at < $3
          AND deleted_at IS NULL"#;

const LEGACY_COUNTS_SQL: &str = r#"SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE COALESCE(cr.status::text, od.status::text) = $4),
            COUNT(*) FILTER (WHERE COALESCE(cr.status::text, od.status::text) = $5)
        FROM dispatches d
        LEFT JOIN catering_requests cr ON cr.id = d.catering_request_id
        LEFT JOIN on_demand_requests od ON od.id = d.on_demand_request_id
        WHERE d.driver_id = $1
          AND d.created_at >= $2
          AND d.created_at < $3
          AND d.deleted_at IS NULL"#;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }
}

fn counts_from_row((total, completed, cancelled): (i64, i64, i64)) -> DeliveryCounts {
    let total = total.max(0) as u64;
    let completed = completed.max(0) as u64;
    let cancelled = cancelled.max(0) as u64;
    DeliveryCounts {
        total,
        completed,
        cancelled,
        in_progress: total.saturating_sub(completed + cancelled),
    }
}

pub struct PgCurrentDeliveries {
    pool: PgPool,
}

impl PgCurrentDeliveries {
    pub fn new(store: &PgStore) -> Self {
        Self {
            pool: store.pool.clone(),
        }
    }
}

#[async_trait]
impl DeliveryCountSource for PgCurrentDeliveries {
    fn name(&self) -> &'static str {
        CURRENT_DELIVERIES
    }

    async fn delivery_counts(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DeliveryCounts, StoreError> {
        let row = sqlx::query_as::<_, (i64, i64, i64)>(CURRENT_COUNTS_SQL)
        .bind(driver_id)
        .bind(window.start)
        .bind(window.end)
        .bind(DeliveryStatus::Completed.as_db_str())
        .bind(DeliveryStatus::Cancelled.as_db_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(counts_from_row(row))
    }
}

pub struct PgLegacyDispatches {
    pool: PgPool,
}

impl PgLegacyDispatches {
    pub fn new(store: &PgStore) -> Self {
        Self {
            pool: store.pool.clone(),
        }
    }

    async fn profile_id(&self, driver_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let row = sqlx::query_as::<_, (Option<Uuid>,)>(
            r#"SELECT profile_id FROM drivers WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(profile_id,)| profile_id))
    }
}

#[async_trait]
impl DeliveryCountSource for PgLegacyDispatches {
    fn name(&self) -> &'static str {
        LEGACY_DISPATCHES
    }

    async fn delivery_counts(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DeliveryCounts, StoreError> {
        let Some(profile_id) = self.profile_id(driver_id).await? else {
            return Ok(DeliveryCounts::default());
        };

        let row = sqlx::query_as::<_, (i64, i64, i64)>(LEGACY_COUNTS_SQL)
        .bind(profile_id)
        .bind(window.start)
        .bind(window.end)
        .bind(DeliveryStatus::Completed.as_db_str())
        .bind(DeliveryStatus::Cancelled.as_db_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(counts_from_row(row))
    }
}

#[async_trait]
impl ShiftSource for PgStore {
    async fn distance_totals(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DistanceTotals, StoreError> {
        let (total_miles, gps_verified_miles) = sqlx::query_as::<_, (f64, f64)>(
            r#"SELECT
                COALESCE(SUM(total_distance_miles), 0)::float8,
                COALESCE(SUM(gps_distance_miles), 0)::float8
            FROM driver_shifts
            WHERE driver_id = $1
              AND shift_start >= $2
              AND shift_start < $3
              AND deleted_at IS NULL"#,
        )
        .bind(driver_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(DistanceTotals {
            total_miles,
            gps_verified_miles,
        })
    }

    async fn shift_totals(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<ShiftTotals, StoreError> {
        let (shift_count, total_seconds) = sqlx::query_as::<_, (i64, f64)>(
            r#"SELECT
                COUNT(*),
                COALESCE(SUM(EXTRACT(EPOCH FROM (shift_end - shift_start))), 0)::float8
            FROM driver_shifts
            WHERE driver_id = $1
              AND shift_start >= $2
              AND shift_start < $3
              AND shift_end IS NOT NULL
              AND deleted_at IS NULL"#,
        )
        .bind(driver_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(ShiftTotals {
            shift_count: shift_count.max(0) as u64,
            total_hours: total_seconds / 3600.0,
        })
    }

    async fn current_shift(&self, driver_id: Uuid) -> Result<Option<ActiveShift>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, i32, bool)>(
            r#"SELECT
                s.id,
                s.shift_start,
                COALESCE(s.delivery_count, 0),
                EXISTS (
                    SELECT 1 FROM shift_breaks b
                    WHERE b.shift_id = s.id AND b.end_time IS NULL
                )
            FROM driver_shifts s
            WHERE s.driver_id = $1
              AND s.shift_end IS NULL
              AND s.deleted_at IS NULL
            ORDER BY s.shift_start DESC
            LIMIT 1"#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(shift_id, started_at, delivery_count, on_break)| ActiveShift {
            shift_id,
            started_at,
            delivery_count: delivery_count.max(0) as u32,
            on_break,
        }))
    }
}

#[derive(Debug, FromRow)]
struct DriverRow {
    id: Uuid,
    profile_id: Option<Uuid>,
    name: String,
    is_active: bool,
    is_on_duty: bool,
}

impl From<DriverRow> for DriverProfile {
    fn from(row: DriverRow) -> Self {
        DriverProfile {
            id: row.id,
            profile_id: row.profile_id,
            name: row.name,
            is_active: row.is_active,
            is_on_duty: row.is_on_duty,
        }
    }
}

#[async_trait]
impl DriverDirectory for PgStore {
    async fn driver_profile(&self, driver_id: Uuid) -> Result<Option<DriverProfile>, StoreError> {
        let row = sqlx::query_as::<_, DriverRow>(
            r#"SELECT
                d.id,
                d.profile_id,
                COALESCE(p.name, d.employee_id, 'Unknown Driver') AS name,
                d.is_active,
                d.is_on_duty
            FROM drivers d
            LEFT JOIN profiles p ON p.id = d.profile_id
            WHERE d.id = $1 AND d.deleted_at IS NULL"#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DriverProfile::from))
    }

    async fn list_drivers(&self, include_inactive: bool) -> Result<Vec<DriverProfile>, StoreError> {
        let rows = sqlx::query_as::<_, DriverRow>(
            r#"SELECT
                d.id,
                d.profile_id,
                COALESCE(p.name, d.employee_id, 'Unknown Driver') AS name,
                d.is_active,
                d.is_on_duty
            FROM drivers d
            LEFT JOIN profiles p ON p.id = d.profile_id
            WHERE d.deleted_at IS NULL
              AND ($1 OR d.is_active)
            ORDER BY d.created_at, d.id"#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DriverProfile::from).collect())
    }
}
