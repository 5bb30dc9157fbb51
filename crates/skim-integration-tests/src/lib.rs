//! Integration test crate for the Skim module.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise the full trade → yield → claim pipeline across the
//! workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p skim-integration-tests
//! ```
