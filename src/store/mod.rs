pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::records::{ActiveShift, DeliveryCounts, DistanceTotals, DriverProfile, ShiftTotals};
use crate::models::stats::DateWindow;

pub const CURRENT_DELIVERIES: &str = "current_deliveries";
pub const LEGACY_DISPATCHES: &str = "legacy_dispatches";
pub const DRIVER_PROFILES: &str = "driver_profiles";
pub const SHIFT_DISTANCE: &str = "shift_distance";
pub const SHIFT_DURATION: &str = "shift_duration";
pub const CURRENT_SHIFT: &str = "current_shift";

#[async_trait]
pub trait DeliveryCountSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn delivery_counts(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DeliveryCounts, StoreError>;
}

#[async_trait]
pub trait ShiftSource: Send + Sync {
    async fn distance_totals(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DistanceTotals, StoreError>;

    async fn shift_totals(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<ShiftTotals, StoreError>;

    async fn current_shift(&self, driver_id: Uuid) -> Result<Option<ActiveShift>, StoreError>;
}

#[async_trait]
pub trait DriverDirectory: Send + Sync {
    async fn driver_profile(&self, driver_id: Uuid) -> Result<Option<DriverProfile>, StoreError>;

    async fn list_drivers(&self, include_inactive: bool) -> Result<Vec<DriverProfile>, StoreError>;
}
