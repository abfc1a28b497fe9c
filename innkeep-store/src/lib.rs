//! INNKEEP Store - Storage Traits and Tenant-Scoped Revenue Cache
//!
//! Defines the storage abstraction the database crate implements, and the
//! cache layer that sits in front of it.
//!
//! # Tenant Isolation
//!
//! The [`RevenueCacheKey`] type cannot be constructed without a `tenant_id`:
//! the key's inner data is private and the only constructor requires one.
//! A cache entry therefore can never be read across tenants, even when two
//! tenants hold the same `property_id` value - the defect class this design
//! forbids structurally rather than by convention.
//!
//! # Single-flight
//!
//! [`RevenueCache::get_or_compute`] collapses concurrent misses for one key
//! into a single computation running on its own task. Waiters share the
//! result; cancelling a waiter never cancels the shared computation.

pub mod cache;
pub mod key;
pub mod memory;
pub mod traits;

pub use cache::{CacheConfig, CacheStats, RevenueCache};
pub use key::RevenueCacheKey;
pub use memory::InMemoryStore;
pub use traits::{PropertyStore, RevenueStore};
