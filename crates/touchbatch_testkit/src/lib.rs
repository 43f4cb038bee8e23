//! # TouchBatch Testkit
//!
//! Test utilities for TouchBatch.
//!
//! This crate provides:
//! - Repository fixtures with association cascades (people, pets, chains)
//! - Property-based test generators using proptest
//! - A tracing subscriber for tests that want log output
//!
//! ## Usage
//!
//! ```rust,ignore
//! use touchbatch_testkit::prelude::*;
//!
//! #[test]
//! fn touches_owner() {
//!     let mut shop = PetShop::new(1, 2);
//!     // ... register pets, close the scope, inspect shop.repo
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
