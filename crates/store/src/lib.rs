//! PostgreSQL store boundary for the storeload harness.
//!
//! Everything that touches the database lives behind this crate:
//!
//! - [`pool`]: connection pool configuration and the [`Store`] handle
//! - [`schema`]: drop-and-recreate manager for the five retail tables
//! - [`ops`]: the business transactions (accounts, catalog, reviews, orders)
//! - [`error`]: the stable outcome taxonomy, translated once from SQLSTATE
//!
//! Each operation runs as one atomic transaction at the configured isolation
//! level on one pooled connection. Callers branch on [`ErrorKind`] and never
//! see driver-specific error codes.

pub mod error;
pub mod ops;
pub mod pool;
pub mod schema;

pub use error::{
    ErrorKind, StoreError, SQLSTATE_CHECK_VIOLATION, SQLSTATE_DEADLOCK_DETECTED,
    SQLSTATE_FOREIGN_KEY_VIOLATION, SQLSTATE_SERIALIZATION_FAILURE, SQLSTATE_UNIQUE_VIOLATION,
};
pub use pool::{IsolationLevel, Store, StoreConfig};
