//! INNKEEP Core - Entity Types and Pure Computation
//!
//! Pure data structures and pure functions with no I/O. All other crates
//! depend on this. Period boundary resolution and decimal quantization live
//! here because they are non-suspending computations with no side effects.

pub mod entities;
pub mod error;
pub mod identity;
pub mod money;
pub mod period;

pub use entities::{Property, Reservation, Tenant};
pub use error::{ConfigError, PeriodError, PoolError, RevenueError, RevenueResult};
pub use identity::{new_property_id, new_reservation_id, new_tenant_id, PropertyId, ReservationId, TenantId, Timestamp};
pub use money::{quantize_total, DecimalPolicy, AMOUNT_SCALE, TOTAL_SCALE};
pub use period::{parse_timezone, resolve_period, Period, PeriodKind, UtcRange};
