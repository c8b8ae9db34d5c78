use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::records::{
    ActiveShift, DeliveryCounts, DeliveryRecord, DispatchRecord, DistanceTotals, DriverProfile,
    ShiftRecord, ShiftTotals,
};
use crate::models::stats::DateWindow;
use crate::store::{
    DeliveryCountSource, DriverDirectory, ShiftSource, CURRENT_DELIVERIES, CURRENT_SHIFT,
    DRIVER_PROFILES, LEGACY_DISPATCHES, SHIFT_DISTANCE, SHIFT_DURATION,
};

#[derive(Default)]
pub struct MemoryStore {
    sequence: AtomicU64,
    drivers: DashMap<Uuid, (u64, DriverProfile)>,
    deliveries: DashMap<Uuid, DeliveryRecord>,
    dispatches: DashMap<Uuid, DispatchRecord>,
    shifts: DashMap<Uuid, ShiftRecord>,
    failing: DashMap<&'static str, String>,
    queries: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_driver(&self, driver: DriverProfile) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.drivers.insert(driver.id, (seq, driver));
    }

    pub fn insert_delivery(&self, delivery: DeliveryRecord) {
        self.deliveries.insert(delivery.id, delivery);
    }

    pub fn insert_dispatch(&self, dispatch: DispatchRecord) {
        self.dispatches.insert(dispatch.id, dispatch);
    }

    pub fn insert_shift(&self, shift: ShiftRecord) {
        self.shifts.insert(shift.id, shift);
    }

    pub fn fail_source(&self, source: &'static str, message: impl Into<String>) {
        self.failing.insert(source, message.into());
    }

    pub fn restore_source(&self, source: &'static str) {
        self.failing.remove(source);
    }

    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    fn begin_read(&self, source: &'static str) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        match self.failing.get(source) {
            Some(message) => Err(StoreError::Unavailable(message.value().clone())),
            None => Ok(()),
        }
    }

    fn profile_id_for(&self, driver_id: Uuid) -> Option<Uuid> {
        self.drivers
            .get(&driver_id)
            .and_then(|entry| entry.value().1.profile_id)
    }

    fn shifts_in(&self, driver_id: Uuid, window: &DateWindow) -> Vec<ShiftRecord> {
        self.shifts
            .iter()
            .filter(|entry| {
                let shift = entry.value();
                shift.driver_id == driver_id && window.contains(shift.shift_start)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }
}

pub struct MemoryCurrentDeliveries(pub Arc<MemoryStore>);

#[async_trait]
impl DeliveryCountSource for MemoryCurrentDeliveries {
    fn name(&self) -> &'static str {
        CURRENT_DELIVERIES
    }

    async fn delivery_counts(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DeliveryCounts, StoreError> {
        self.0.begin_read(CURRENT_DELIVERIES)?;

        let mut counts = DeliveryCounts::default();
        for entry in self.0.deliveries.iter() {
            let delivery = entry.value();
            if delivery.driver_id == driver_id && window.contains(delivery.assigned_at) {
                counts.record(delivery.status);
            }
        }
        Ok(counts)
    }
}

pub struct MemoryLegacyDispatches(pub Arc<MemoryStore>);

#[async_trait]
impl DeliveryCountSource for MemoryLegacyDispatches {
    fn name(&self) -> &'static str {
        LEGACY_DISPATCHES
    }

    async fn delivery_counts(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DeliveryCounts, StoreError> {
        self.0.begin_read(LEGACY_DISPATCHES)?;

        let Some(profile_id) = self.0.profile_id_for(driver_id) else {
            return Ok(DeliveryCounts::default());
        };

        let mut counts = DeliveryCounts::default();
        for entry in self.0.dispatches.iter() {
            let dispatch = entry.value();
            if dispatch.profile_id == profile_id && window.contains(dispatch.created_at) {
                counts.record(dispatch.request_status);
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ShiftSource for MemoryStore {
    async fn distance_totals(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<DistanceTotals, StoreError> {
        self.begin_read(SHIFT_DISTANCE)?;

        Ok(self
            .shifts_in(driver_id, window)
            .iter()
            .fold(DistanceTotals::default(), |acc, shift| DistanceTotals {
                total_miles: acc.total_miles + shift.total_distance_miles,
                gps_verified_miles: acc.gps_verified_miles + shift.gps_distance_miles,
            }))
    }

    async fn shift_totals(
        &self,
        driver_id: Uuid,
        window: &DateWindow,
    ) -> Result<ShiftTotals, StoreError> {
        self.begin_read(SHIFT_DURATION)?;

        let mut totals = ShiftTotals::default();
        for shift in self.shifts_in(driver_id, window) {
            if let Some(end) = shift.shift_end {
                totals.shift_count += 1;
                totals.total_hours += (end - shift.shift_start).num_seconds() as f64 / 3600.0;
            }
        }
        Ok(totals)
    }

    async fn current_shift(&self, driver_id: Uuid) -> Result<Option<ActiveShift>, StoreError> {
        self.begin_read(CURRENT_SHIFT)?;

        Ok(self
            .shifts
            .iter()
            .filter(|entry| entry.driver_id == driver_id && entry.shift_end.is_none())
            .max_by_key(|entry| entry.shift_start)
            .map(|entry| ActiveShift {
                shift_id: entry.id,
                started_at: entry.shift_start,
                delivery_count: entry.delivery_count,
                on_break: entry.on_break(),
            }))
    }
}

#[async_trait]
impl DriverDirectory for MemoryStore {
    async fn driver_profile(&self, driver_id: Uuid) -> Result<Option<DriverProfile>, StoreError> {
        self.begin_read(DRIVER_PROFILES)?;
        Ok(self.drivers.get(&driver_id).map(|entry| entry.value().1.clone()))
    }

    async fn list_drivers(&self, include_inactive: bool) -> Result<Vec<DriverProfile>, StoreError> {
        self.begin_read(DRIVER_PROFILES)?;

        let mut drivers: Vec<(u64, DriverProfile)> = self
            .drivers
            .iter()
            .filter(|entry| include_inactive || entry.value().1.is_active)
            .map(|entry| entry.value().clone())
            .collect();
        drivers.sort_by_key(|(seq, _)| *seq);

        Ok(drivers.into_iter().map(|(_, driver)| driver).collect())
    }
}
