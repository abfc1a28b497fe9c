//! Tenant-scoped cache key for revenue totals.
//!
//! The key insight is that `RevenueCacheKey`'s private inner struct makes
//! cross-tenant access uncompilable: there is no way to build a key without
//! explicitly providing a tenant id, and no default or partial key exists.

use std::fmt;

use chrono::NaiveDate;
use innkeep_core::{Period, PeriodKind, PropertyId, TenantId};
use uuid::Uuid;

/// A cache key scoped to a specific tenant.
///
/// # Design
///
/// The private inner struct ensures a `RevenueCacheKey` can only be
/// constructed via [`RevenueCacheKey::new`], which requires a tenant id.
/// Equality is structural on all four fields: tenant, property, period kind,
/// period anchor.
///
/// # External format
///
/// [`encode`](RevenueCacheKey::encode) renders the canonical string form
///
/// ```text
/// tenant:{tenant_id}:property:{property_id}:period:{kind}:{anchor}
/// ```
///
/// with every segment mandatory. There is no representation without the
/// tenant segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevenueCacheKey {
    inner: KeyInner,
}

/// Private inner struct - prevents external construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KeyInner {
    tenant_id: TenantId,
    property_id: PropertyId,
    period: Period,
}

impl RevenueCacheKey {
    /// Create a new tenant-scoped cache key.
    ///
    /// The period anchor is canonicalized (truncated to the unit start) so
    /// that logically equal periods produce equal keys.
    pub fn new(tenant_id: TenantId, property_id: PropertyId, period: Period) -> Self {
        Self {
            inner: KeyInner {
                tenant_id,
                property_id,
                period: Period::new(period.kind, period.anchor),
            },
        }
    }

    /// The tenant this key is scoped to.
    pub fn tenant_id(&self) -> TenantId {
        self.inner.tenant_id
    }

    /// The property this key refers to.
    pub fn property_id(&self) -> PropertyId {
        self.inner.property_id
    }

    /// The logical period this key refers to.
    pub fn period(&self) -> Period {
        self.inner.period
    }

    /// Whether this key belongs to the given (tenant, property) pair.
    ///
    /// Used by invalidation: a reservation mutation for a property clears
    /// every period entry for that pair, and only that pair.
    pub fn matches_pair(&self, tenant_id: TenantId, property_id: PropertyId) -> bool {
        self.inner.tenant_id == tenant_id && self.inner.property_id == property_id
    }

    /// Encode this key to its canonical external string form.
    pub fn encode(&self) -> String {
        format!(
            "tenant:{}:property:{}:period:{}:{}",
            self.inner.tenant_id,
            self.inner.property_id,
            self.inner.period.kind,
            self.inner.period.anchor,
        )
    }

    /// Decode a key from its canonical external string form.
    ///
    /// Returns `None` when any segment is missing or malformed; in
    /// particular there is no lenient path that fills in a default tenant.
    pub fn decode(encoded: &str) -> Option<Self> {
        let mut segments = encoded.split(':');

        if segments.next()? != "tenant" {
            return None;
        }
        let tenant_id = TenantId::new(segments.next()?.parse::<Uuid>().ok()?);

        if segments.next()? != "property" {
            return None;
        }
        let property_id = PropertyId::new(segments.next()?.parse::<Uuid>().ok()?);

        if segments.next()? != "period" {
            return None;
        }
        let kind = segments.next()?.parse::<PeriodKind>().ok()?;
        let anchor = segments.next()?.parse::<NaiveDate>().ok()?;

        if segments.next().is_some() {
            return None;
        }

        Some(Self::new(tenant_id, property_id, Period::new(kind, anchor)))
    }
}

impl fmt::Display for RevenueCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_new_and_getters() {
        let tenant_id = TenantId::now_v7();
        let property_id = PropertyId::now_v7();
        let period = Period::month(date(2024, 3, 1));

        let key = RevenueCacheKey::new(tenant_id, property_id, period);

        assert_eq!(key.tenant_id(), tenant_id);
        assert_eq!(key.property_id(), property_id);
        assert_eq!(key.period(), period);
    }

    #[test]
    fn test_encode_format() {
        let tenant_id = TenantId::now_v7();
        let property_id = PropertyId::now_v7();
        let key = RevenueCacheKey::new(tenant_id, property_id, Period::month(date(2024, 3, 1)));

        assert_eq!(
            key.encode(),
            format!("tenant:{}:property:{}:period:month:2024-03-01", tenant_id, property_id)
        );
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let key = RevenueCacheKey::new(
            TenantId::now_v7(),
            PropertyId::now_v7(),
            Period::day(date(2024, 2, 29)),
        );
        let decoded = RevenueCacheKey::decode(&key.encode()).expect("decode should succeed");
        assert_eq!(key, decoded);
    }

    #[test]
    fn test_decode_rejects_missing_tenant_segment() {
        let property_id = PropertyId::now_v7();
        let without_tenant = format!("property:{}:period:month:2024-03-01", property_id);
        assert!(RevenueCacheKey::decode(&without_tenant).is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(RevenueCacheKey::decode("").is_none());
        assert!(RevenueCacheKey::decode("tenant:not-a-uuid:property:x:period:month:2024-03-01").is_none());
        assert!(RevenueCacheKey::decode("tenant::property::period:month:2024-03-01").is_none());

        let key = RevenueCacheKey::new(
            TenantId::now_v7(),
            PropertyId::now_v7(),
            Period::month(date(2024, 3, 1)),
        );
        let with_trailer = format!("{}:extra", key.encode());
        assert!(RevenueCacheKey::decode(&with_trailer).is_none());

        let bad_kind = key.encode().replace(":month:", ":week:");
        assert!(RevenueCacheKey::decode(&bad_kind).is_none());
    }

    #[test]
    fn test_same_pair_different_tenants_differ() {
        let property_id = PropertyId::now_v7();
        let period = Period::month(date(2024, 3, 1));

        let key1 = RevenueCacheKey::new(TenantId::now_v7(), property_id, period);
        let key2 = RevenueCacheKey::new(TenantId::now_v7(), property_id, period);

        assert_ne!(key1, key2);
        assert_ne!(key1.encode(), key2.encode());
    }

    #[test]
    fn test_anchor_canonicalization_makes_equal_periods_equal_keys() {
        let tenant_id = TenantId::now_v7();
        let property_id = PropertyId::now_v7();

        let mid_month = RevenueCacheKey::new(tenant_id, property_id, Period::month(date(2024, 3, 17)));
        let first = RevenueCacheKey::new(tenant_id, property_id, Period::month(date(2024, 3, 1)));
        assert_eq!(mid_month, first);
    }

    #[test]
    fn test_matches_pair() {
        let tenant_id = TenantId::now_v7();
        let property_id = PropertyId::now_v7();
        let key = RevenueCacheKey::new(tenant_id, property_id, Period::month(date(2024, 3, 1)));

        assert!(key.matches_pair(tenant_id, property_id));
        assert!(!key.matches_pair(TenantId::now_v7(), property_id));
        assert!(!key.matches_pair(tenant_id, PropertyId::now_v7()));
    }
}
