//! Shared test utilities for listkit integration tests.
//!
//! This module provides:
//! - `ShopCatalog`, an in-memory catalog that applies patches and uploads
//! - `TestHarness` for isolated runs with temp export and image directories

pub mod catalog;
pub mod harness;

pub use catalog::ShopCatalog;
pub use harness::TestHarness;
