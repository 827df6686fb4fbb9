//! Hardware Shop Core - Shared types library.
//!
//! This crate provides common types used across all Hardware Shop components:
//! - `engine` - Cart & order consistency engine
//! - the customer- and owner-facing frontends built on top of it
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
