//! Storage traits for properties and revenue aggregation.
//!
//! These are the seams between the cache/service layer and the database:
//! the Postgres client implements them, and tests substitute counting or
//! failing doubles without touching the orchestration code.

use async_trait::async_trait;
use innkeep_core::{Property, PropertyId, RevenueResult, TenantId, Timestamp, UtcRange};
use rust_decimal::Decimal;

/// Read access to the property registry, always tenant-filtered.
///
/// There is deliberately no lookup by property id alone: every query carries
/// the requesting tenant so an implementation cannot accidentally serve a
/// foreign tenant's property.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Fetch a property as seen by `tenant_id`.
    ///
    /// Returns `Ok(None)` both when the property does not exist and when it
    /// is registered to a different tenant; callers must not be able to tell
    /// the two apart.
    async fn property_get(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Property>>;

    /// List the properties owned by `tenant_id`.
    async fn property_list(&self, tenant_id: TenantId) -> RevenueResult<Vec<Property>>;
}

/// Read access to reservation revenue.
#[async_trait]
pub trait RevenueStore: Send + Sync {
    /// Sum reservation amounts for a property within a half-open UTC range.
    ///
    /// The sum stays in the stored fixed-point representation end to end;
    /// an empty range yields zero, not an error. The result is the raw sum -
    /// quantization to the reporting scale is the caller's single step.
    async fn sum_revenue(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
        range: UtcRange,
    ) -> RevenueResult<Decimal>;

    /// The instant of the most recent reservation for a property, if any.
    async fn latest_reservation_at(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Timestamp>>;
}
