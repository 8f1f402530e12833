//! Storeload Benchmark Harness
//!
//! A library and CLI tool for driving the retail transaction mix against a
//! PostgreSQL store and measuring what commits, what violates, and how fast.
//!
//! # Modules
//!
//! - [`config`]: TOML configuration types and validation
//! - [`population`]: Deterministic credentials and value samplers
//! - [`workload`]: Weighted operation generation (tagged `Operation` enum)
//! - [`seed`]: Initial data seeding through the transactional operations
//! - [`runner`]: Concurrent driver, outcome counters, sweep reports
//! - [`latency`]: Per-operation latency histograms

pub mod config;
pub mod latency;
pub mod population;
pub mod runner;
pub mod seed;
pub mod workload;

pub use config::{
    BenchConfig, CatalogConfig, ConfigError, OrderConfig, PopulationConfig, RunConfig,
};
pub use latency::{LatencyRecorder, LatencyReport, OpLatency};
pub use population::{credentials_for, Population};
pub use runner::{Driver, DriverStats, RunReport, SweepReport};
pub use seed::{SeedError, SeedSummary, Seeder};
pub use workload::{OpKind, Operation, RetailWorkload};
