//! Identity types for INNKEEP entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new UUIDv7 identifier (timestamp-sortable).
            pub fn now_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Get the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id! {
    /// Identifier of a tenant (an isolated customer account).
    ///
    /// Every cache key, query, and listing is scoped by this value; there is
    /// no operation in the subsystem that works without one.
    TenantId
}

entity_id! {
    /// Identifier of a revenue-bearing property owned by exactly one tenant.
    PropertyId
}

entity_id! {
    /// Identifier of a reservation row.
    ReservationId
}

/// Generate a new UUIDv7 tenant id.
pub fn new_tenant_id() -> TenantId {
    TenantId::now_v7()
}

/// Generate a new UUIDv7 property id.
pub fn new_property_id() -> PropertyId {
    PropertyId::now_v7()
}

/// Generate a new UUIDv7 reservation id.
pub fn new_reservation_id() -> ReservationId {
    ReservationId::now_v7()
}
