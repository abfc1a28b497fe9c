//! In-memory store double for tests and examples.
//!
//! Mirrors the Postgres-backed store's observable behavior: tenant-filtered
//! property lookups, half-open range sums over the stored fixed-point
//! amounts, and injectable failures for pool-down scenarios. The aggregation
//! call counter makes single-flight behavior observable from tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use innkeep_core::{Property, PropertyId, Reservation, RevenueResult, RevenueError, TenantId, Timestamp, UtcRange};
use rust_decimal::Decimal;

use crate::traits::{PropertyStore, RevenueStore};

/// In-memory implementation of [`PropertyStore`] and [`RevenueStore`].
#[derive(Default)]
pub struct InMemoryStore {
    properties: RwLock<HashMap<(TenantId, PropertyId), Property>>,
    reservations: RwLock<Vec<Reservation>>,
    sum_calls: AtomicUsize,
    forced_failure: RwLock<Option<RevenueError>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property under its owning tenant.
    pub fn add_property(&self, property: Property) {
        self.properties
            .write()
            .expect("properties lock")
            .insert((property.tenant_id, property.property_id), property);
    }

    /// Append a reservation row.
    pub fn add_reservation(&self, reservation: Reservation) {
        self.reservations
            .write()
            .expect("reservations lock")
            .push(reservation);
    }

    /// Number of times `sum_revenue` has been invoked.
    pub fn sum_calls(&self) -> usize {
        self.sum_calls.load(Ordering::SeqCst)
    }

    /// Make every store operation fail with the given error until cleared.
    pub fn fail_with(&self, error: RevenueError) {
        *self.forced_failure.write().expect("failure lock") = Some(error);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&self) {
        *self.forced_failure.write().expect("failure lock") = None;
    }

    fn check_failure(&self) -> RevenueResult<()> {
        match &*self.forced_failure.read().expect("failure lock") {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PropertyStore for InMemoryStore {
    async fn property_get(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Property>> {
        self.check_failure()?;
        Ok(self
            .properties
            .read()
            .expect("properties lock")
            .get(&(tenant_id, property_id))
            .cloned())
    }

    async fn property_list(&self, tenant_id: TenantId) -> RevenueResult<Vec<Property>> {
        self.check_failure()?;
        let mut listed: Vec<Property> = self
            .properties
            .read()
            .expect("properties lock")
            .values()
            .filter(|property| property.tenant_id == tenant_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }
}

#[async_trait]
impl RevenueStore for InMemoryStore {
    async fn sum_revenue(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
        range: UtcRange,
    ) -> RevenueResult<Decimal> {
        self.sum_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let total = self
            .reservations
            .read()
            .expect("reservations lock")
            .iter()
            .filter(|r| {
                r.tenant_id == tenant_id
                    && r.property_id == property_id
                    && range.contains(r.occurred_at)
            })
            .map(|r| r.amount)
            .sum();
        Ok(total)
    }

    async fn latest_reservation_at(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Timestamp>> {
        self.check_failure()?;
        Ok(self
            .reservations
            .read()
            .expect("reservations lock")
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.property_id == property_id)
            .map(|r| r.occurred_at)
            .max())
    }
}

// =============================================================================
// TESTS
// =============================================================================
