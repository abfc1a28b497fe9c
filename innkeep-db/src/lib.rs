//! INNKEEP DB - Session Pool, Aggregation Queries, and the Revenue Service
//!
//! The database-facing half of the revenue subsystem:
//!
//! - [`DbConfig`] / [`DbClient`]: bounded deadpool-postgres pool with scoped
//!   session acquisition that fails loudly (`PoolExhausted` /
//!   `PoolUnavailable`) instead of blocking indefinitely or degrading to
//!   fabricated output.
//! - `PropertyStore` / `RevenueStore` implementations over parameterized,
//!   tenant-filtered SQL.
//! - [`TenantGuard`]: the ownership chokepoint ahead of cache and queries.
//! - [`RevenueService`]: `get_revenue`, `list_properties`,
//!   `invalidate_property`, `latest_period`.

pub mod db;
pub mod guard;
pub mod service;
pub mod store;
pub mod telemetry;

pub use db::{DbClient, DbConfig, Session};
pub use guard::TenantGuard;
pub use service::RevenueService;
pub use telemetry::init_tracing;
