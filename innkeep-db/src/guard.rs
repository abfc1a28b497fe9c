//! Tenant Isolation Guard
//!
//! The single chokepoint validating that a requested property belongs to the
//! requesting tenant. It runs before any cache read or aggregation, so a
//! forged or stale cache key can never surface another tenant's total, and it
//! backs the property listing consumed by the UI collaborator.

use std::sync::Arc;

use innkeep_core::{Property, PropertyId, RevenueError, RevenueResult, TenantId};
use innkeep_store::PropertyStore;

/// Ownership validator over a [`PropertyStore`].
pub struct TenantGuard<S> {
    store: Arc<S>,
}

impl<S> TenantGuard<S>
where
    S: PropertyStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Verify that `property_id` belongs to `tenant_id` and return the
    /// property.
    ///
    /// A property registered to another tenant and a property that does not
    /// exist fail with the same [`RevenueError::NotOwned`] value: the error
    /// carries no signal about property existence.
    pub async fn authorize(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Property> {
        match self.store.property_get(tenant_id, property_id).await? {
            Some(property) if property.tenant_id == tenant_id => Ok(property),
            _ => {
                tracing::warn!(%tenant_id, %property_id, "rejected property access");
                Err(RevenueError::NotOwned { property_id })
            }
        }
    }

    /// List the properties owned by `tenant_id`.
    ///
    /// The ownership filter is re-applied here even though implementations
    /// already filter in their queries; a store bug must not become a
    /// tenant-leaking listing.
    pub async fn list_properties(&self, tenant_id: TenantId) -> RevenueResult<Vec<Property>> {
        let properties = self.store.property_list(tenant_id).await?;
        Ok(properties
            .into_iter()
            .filter(|property| property.tenant_id == tenant_id)
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use innkeep_store::InMemoryStore;

    fn property(tenant_id: TenantId, name: &str) -> Property {
        Property {
            property_id: PropertyId::now_v7(),
            tenant_id,
            name: name.to_string(),
            timezone: "Europe/Berlin".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_authorize_owned_property() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = TenantId::now_v7();
        let owned = property(tenant_id, "Harbor Loft");
        store.add_property(owned.clone());

        let guard = TenantGuard::new(store);
        let authorized = guard.authorize(tenant_id, owned.property_id).await.unwrap();
        assert_eq!(authorized, owned);
    }

    #[tokio::test]
    async fn test_missing_and_foreign_fail_identically() {
        let store = Arc::new(InMemoryStore::new());
        let owner = TenantId::now_v7();
        let intruder = TenantId::now_v7();
        let owned = property(owner, "Harbor Loft");
        store.add_property(owned.clone());

        let guard = TenantGuard::new(store);

        let foreign = guard
            .authorize(intruder, owned.property_id)
            .await
            .unwrap_err();
        let missing = guard
            .authorize(intruder, owned.property_id)
            .await
            .unwrap_err();

        assert_eq!(foreign, missing);
        assert!(matches!(foreign, RevenueError::NotOwned { .. }));
    }

    #[tokio::test]
    async fn test_listing_is_tenant_scoped() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_a = TenantId::now_v7();
        let tenant_b = TenantId::now_v7();
        store.add_property(property(tenant_a, "Alpha"));
        store.add_property(property(tenant_a, "Beta"));
        store.add_property(property(tenant_b, "Gamma"));

        let guard = TenantGuard::new(store);
        let listed = guard.list_properties(tenant_b).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|p| p.tenant_id == tenant_b));
    }
}
