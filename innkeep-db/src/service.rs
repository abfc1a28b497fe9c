//! Revenue Service
//!
//! The orchestrator behind `GetRevenue`: guard, then cache, then - on a
//! miss - period resolution in the property's timezone and a decimal-exact
//! aggregation through a scoped session, quantized exactly once before the
//! total is cached and returned.
//!
//! Failures surface as explicit errors. There is no degraded mode: an
//! unreachable pool or a failed query ends the request, it never produces a
//! plausible-looking substitute total.

use std::sync::Arc;

use innkeep_core::{
    parse_timezone, quantize_total, resolve_period, Period, Property, PropertyId, RevenueResult,
    TenantId,
};
use innkeep_store::{
    CacheStats, PropertyStore, RevenueCache, RevenueCacheKey, RevenueStore,
};
use rust_decimal::Decimal;

use crate::guard::TenantGuard;

/// Tenant-isolated revenue reporting over a property/reservation store.
pub struct RevenueService<S> {
    store: Arc<S>,
    guard: TenantGuard<S>,
    cache: Arc<RevenueCache>,
}

impl<S> RevenueService<S>
where
    S: PropertyStore + RevenueStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<RevenueCache>) -> Self {
        Self {
            guard: TenantGuard::new(Arc::clone(&store)),
            store,
            cache,
        }
    }

    /// Compute (or serve from cache) the revenue total for one
    /// (tenant, property, period), quantized to the reporting scale.
    ///
    /// The guard runs before the cache lookup; concurrent cold calls for the
    /// same key collapse into a single aggregation.
    pub async fn get_revenue(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
        period: Period,
    ) -> RevenueResult<Decimal> {
        let property = self.guard.authorize(tenant_id, property_id).await?;

        let key = RevenueCacheKey::new(tenant_id, property_id, period);
        let store = Arc::clone(&self.store);
        let timezone = property.timezone.clone();

        self.cache
            .get_or_compute(key, move || async move {
                let tz = parse_timezone(&timezone)?;
                let range = resolve_period(&period, tz)?;
                tracing::debug!(
                    %tenant_id,
                    %property_id,
                    %period,
                    start = %range.start,
                    end = %range.end,
                    "aggregating revenue"
                );
                let total = store.sum_revenue(tenant_id, property_id, range).await?;
                Ok(quantize_total(total))
            })
            .await
    }

    /// List the properties owned by `tenant_id`.
    pub async fn list_properties(&self, tenant_id: TenantId) -> RevenueResult<Vec<Property>> {
        self.guard.list_properties(tenant_id).await
    }

    /// Drop every cached period total for a (tenant, property) pair.
    ///
    /// Hook for reservation mutation events. Returns the number of entries
    /// removed.
    pub fn invalidate_property(&self, tenant_id: TenantId, property_id: PropertyId) -> usize {
        self.cache.invalidate(tenant_id, property_id)
    }

    /// The month of the property's most recent reservation, in the
    /// property's local timezone.
    ///
    /// Callers that present a default reporting period use this instead of
    /// guessing; a property with no reservations yields `None`.
    pub async fn latest_period(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Period>> {
        let property = self.guard.authorize(tenant_id, property_id).await?;
        let tz = parse_timezone(&property.timezone)?;

        match self.store.latest_reservation_at(tenant_id, property_id).await? {
            Some(instant) => {
                let local_date = instant.with_timezone(&tz).date_naive();
                Ok(Some(Period::month(local_date)))
            }
            None => Ok(None),
        }
    }

    /// Cache statistics for observability.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
