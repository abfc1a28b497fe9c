//! PostgreSQL-backed property and revenue stores.
//!
//! Implements the `innkeep-store` traits over scoped pool sessions. All
//! queries are tenant-filtered in SQL and read-only; this subsystem never
//! writes reservations or properties.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use innkeep_core::{
    Property, PropertyId, RevenueError, RevenueResult, TenantId, Timestamp, UtcRange,
};
use innkeep_store::{PropertyStore, RevenueStore};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::DbClient;

/// Backoff before the single retry of an idempotent-safe read.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

fn row_to_property(row: &Row) -> Property {
    Property {
        property_id: PropertyId::new(row.get::<_, Uuid>(0)),
        tenant_id: TenantId::new(row.get::<_, Uuid>(1)),
        name: row.get(2),
        timezone: row.get(3),
        created_at: row.get::<_, DateTime<Utc>>(4),
    }
}

#[async_trait]
impl PropertyStore for DbClient {
    async fn property_get(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Property>> {
        let session = self.session().await?;
        let row = session
            .query_opt(
                "SELECT property_id, tenant_id, name, timezone, created_at
                 FROM properties
                 WHERE property_id = $1 AND tenant_id = $2",
                &[&property_id.as_uuid(), &tenant_id.as_uuid()],
            )
            .await
            .map_err(RevenueError::aggregation)?;
        Ok(row.as_ref().map(row_to_property))
    }

    async fn property_list(&self, tenant_id: TenantId) -> RevenueResult<Vec<Property>> {
        let session = self.session().await?;
        let rows = session
            .query(
                "SELECT property_id, tenant_id, name, timezone, created_at
                 FROM properties
                 WHERE tenant_id = $1
                 ORDER BY name",
                &[&tenant_id.as_uuid()],
            )
            .await
            .map_err(RevenueError::aggregation)?;
        Ok(rows.iter().map(row_to_property).collect())
    }
}

#[async_trait]
impl RevenueStore for DbClient {
    async fn sum_revenue(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
        range: UtcRange,
    ) -> RevenueResult<Decimal> {
        match self.sum_revenue_once(tenant_id, property_id, range).await {
            Ok(total) => Ok(total),
            // Pool failures are terminal; a retry would hold the caller on a
            // pool that just proved unavailable.
            Err(error @ RevenueError::PoolUnavailable(_)) => Err(error),
            Err(first) => {
                tracing::warn!(
                    %tenant_id,
                    %property_id,
                    error = %first,
                    "revenue query failed, retrying once"
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.sum_revenue_once(tenant_id, property_id, range).await
            }
        }
    }

    async fn latest_reservation_at(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
    ) -> RevenueResult<Option<Timestamp>> {
        let session = self.session().await?;
        let row = session
            .query_one(
                "SELECT MAX(occurred_at)
                 FROM reservations
                 WHERE property_id = $1 AND tenant_id = $2",
                &[&property_id.as_uuid(), &tenant_id.as_uuid()],
            )
            .await
            .map_err(RevenueError::aggregation)?;
        Ok(row.get::<_, Option<DateTime<Utc>>>(0))
    }
}

impl DbClient {
    /// One aggregation attempt: a single range-filtered SUM over the stored
    /// NUMERIC amounts. The half-open range comes in as resolved UTC
    /// instants; `occurred_at = range.end` belongs to the next period.
    async fn sum_revenue_once(
        &self,
        tenant_id: TenantId,
        property_id: PropertyId,
        range: UtcRange,
    ) -> RevenueResult<Decimal> {
        let session = self.session().await?;
        let row = session
            .query_one(
                "SELECT COALESCE(SUM(amount), 0)
                 FROM reservations
                 WHERE property_id = $1
                   AND tenant_id = $2
                   AND occurred_at >= $3
                   AND occurred_at < $4",
                &[
                    &property_id.as_uuid(),
                    &tenant_id.as_uuid(),
                    &range.start,
                    &range.end,
                ],
            )
            .await
            .map_err(RevenueError::aggregation)?;
        Ok(row.get::<_, Decimal>(0))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(all(test, feature = "db-tests"))]
mod db_tests {
    use super::*;
    use crate::db::DbConfig;
    use chrono::NaiveDate;
    use innkeep_core::{parse_timezone, resolve_period, Period};
    use rust_decimal_macros::dec;

    fn test_client() -> DbClient {
        DbClient::from_config(&DbConfig::from_env()).expect("test database configured")
    }

    /// Requires the schema from the deployment migrations and a seeded
    /// property with three 10.005 reservations in March 2024 UTC.
    #[tokio::test]
    async fn test_sum_revenue_stays_decimal_exact() {
        let client = test_client();
        let tenant_id = TenantId::new(
            std::env::var("INNKEEP_TEST_TENANT")
                .expect("INNKEEP_TEST_TENANT")
                .parse()
                .expect("valid uuid"),
        );
        let property_id = PropertyId::new(
            std::env::var("INNKEEP_TEST_PROPERTY")
                .expect("INNKEEP_TEST_PROPERTY")
                .parse()
                .expect("valid uuid"),
        );

        let range = resolve_period(
            &Period::month(NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")),
            parse_timezone("Etc/UTC").expect("known zone"),
        )
        .expect("resolvable period");

        let total = client
            .sum_revenue(tenant_id, property_id, range)
            .await
            .expect("aggregation succeeds");
        assert_eq!(total, dec!(30.015));
    }
}
