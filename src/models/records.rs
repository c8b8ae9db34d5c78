use std::ops::Add;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Assigned,
    ArrivedAtVendor,
    EnRouteToClient,
    ArrivedToClient,
    Completed,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Assigned => "ASSIGNED",
            DeliveryStatus::ArrivedAtVendor => "ARRIVED_AT_VENDOR",
            DeliveryStatus::EnRouteToClient => "EN_ROUTE_TO_CLIENT",
            DeliveryStatus::ArrivedToClient => "ARRIVED_TO_CLIENT",
            DeliveryStatus::Completed => "COMPLETED",
            DeliveryStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCounts {
    pub total: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub in_progress: u64,
}

impl DeliveryCounts {
    pub fn record(&mut self, status: DeliveryStatus) {
        self.total += 1;
        match status {
            DeliveryStatus::Completed => self.completed += 1,
            DeliveryStatus::Cancelled => self.cancelled += 1,
            _ => self.in_progress += 1,
        }
    }
}

impl Add for DeliveryCounts {
    type Output = DeliveryCounts;

    fn add(self, rhs: DeliveryCounts) -> DeliveryCounts {
        DeliveryCounts {
            total: self.total + rhs.total,
            completed: self.completed + rhs.completed,
            cancelled: self.cancelled + rhs.cancelled,
            in_progress: self.in_progress + rhs.in_progress,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceTotals {
    pub total_miles: f64,
    pub gps_verified_miles: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShiftTotals {
    pub shift_count: u64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveShift {
    pub shift_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub delivery_count: u32,
    pub on_break: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverProfile {
    pub id: Uuid,
    pub profile_id: Option<Uuid>,
    pub name: String,
    pub is_active: bool,
    pub is_on_duty: bool,
}

#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub status: DeliveryStatus,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DispatchRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub request_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ShiftBreak {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ShiftRecord {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub shift_start: DateTime<Utc>,
    pub shift_end: Option<DateTime<Utc>>,
    pub total_distance_miles: f64,
    pub gps_distance_miles: f64,
    pub delivery_count: u32,
    pub breaks: Vec<ShiftBreak>,
}

impl ShiftRecord {
    pub fn on_break(&self) -> bool {
        self.breaks.iter().any(|b| b.end_time.is_none())
    }
}
