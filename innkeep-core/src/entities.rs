//! Core entity structures

use crate::{PropertyId, ReservationId, TenantId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tenant - an isolated customer account.
///
/// Tenants own a disjoint set of properties and are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: TenantId,
    /// Display name
    pub name: String,
    pub created_at: Timestamp,
}

/// Property - a revenue-bearing unit belonging to exactly one tenant.
///
/// `timezone` is a named IANA zone (e.g. "Europe/Berlin"), never a fixed
/// offset: the offset at a period boundary varies with daylight-saving
/// transitions, so it must be resolved per boundary instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub property_id: PropertyId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Display name
    pub name: String,
    /// Named IANA timezone of the property
    pub timezone: String,
    pub created_at: Timestamp,
}

/// Reservation - a revenue event read by the aggregator.
///
/// `amount` is stored as NUMERIC(13,3): 10 integer digits and 3 fraction
/// digits of precision. This subsystem never writes reservations, and a
/// reservation is never re-owned to another property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub property_id: PropertyId,
    pub tenant_id: TenantId,
    /// Instant the revenue is attributed to (UTC in storage; interpreted in
    /// the property's timezone for period membership).
    pub occurred_at: Timestamp,
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reservation_amount_keeps_three_fraction_digits() {
        let reservation = Reservation {
            reservation_id: ReservationId::now_v7(),
            property_id: PropertyId::now_v7(),
            tenant_id: TenantId::now_v7(),
            occurred_at: Utc::now(),
            amount: dec!(10.005),
        };
        assert_eq!(reservation.amount.scale(), 3);
        assert_eq!(reservation.amount, dec!(10.005));
    }

    #[test]
    fn test_property_owned_by_exactly_one_tenant() {
        let tenant_id = TenantId::now_v7();
        let property = Property {
            property_id: PropertyId::now_v7(),
            tenant_id,
            name: "Harbor Loft".to_string(),
            timezone: "Europe/Berlin".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(property.tenant_id, tenant_id);
    }
}
