//! Core types for the storeload workload harness.
//!
//! This crate provides the foundational types used throughout the harness:
//!
//! - **Identifiers**: Username, ProductId, OrderId
//! - **Accounts**: Account, Credentials
//! - **Catalog**: Product, ProductPage, Review
//! - **Orders**: LineItems (insertion-ordered product/quantity pairs)
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer. Database
//! column types map directly onto these fields (`NUMERIC` to `Decimal`,
//! `TIMESTAMP` to `NaiveDateTime`, `SERIAL` keys to `i32` newtypes).

mod account;
mod identifiers;
mod order;
mod product;
mod review;

pub use account::{Account, Credentials};
pub use identifiers::{OrderId, ProductId, Username};
pub use order::LineItems;
pub use product::{Product, ProductPage};
pub use review::Review;
