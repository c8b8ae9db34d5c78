use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Today,
    #[default]
    Week,
    Month,
    All,
}

impl StatsPeriod {
    pub fn has_trend(&self) -> bool {
        matches!(self, StatsPeriod::Week | StatsPeriod::Month)
    }
}

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

#[derive(Debug, Clone)]
pub struct DriverStatsQuery {
    pub driver_id: String,
    pub period: StatsPeriod,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverIdentity {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    pub total: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub in_progress: u64,
    pub daily_average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistanceStats {
    pub total_miles: f64,
    pub gps_verified_miles: f64,
    pub average_per_delivery: f64,
    pub average_per_day: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStats {
    pub total_shifts: u64,
    pub total_hours: f64,
    pub average_shift_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentShift {
    pub shift_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_hours: f64,
    pub deliveries: u32,
    pub on_break: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendInfo {
    pub previous_window: DateWindow,
    pub previous_deliveries: u64,
    pub previous_miles: f64,
    pub delivery_change_pct: i64,
    pub distance_change_pct: i64,
    pub efficiency_rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDriverStats {
    pub driver: DriverIdentity,
    pub period: StatsPeriod,
    pub window: DateWindow,
    pub deliveries: DeliveryStats,
    pub distance: DistanceStats,
    pub shifts: ShiftStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_shift: Option<CurrentShift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<TrendInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopDriver {
    pub driver_id: Uuid,
    pub name: String,
    pub deliveries: u64,
    pub miles: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatsSummary {
    pub period: StatsPeriod,
    pub window: DateWindow,
    pub total_drivers: u64,
    pub active_drivers: u64,
    pub on_duty_drivers: u64,
    pub total_deliveries: u64,
    pub total_miles: f64,
    pub top_drivers: Vec<TopDriver>,
}
