//! Orderflow Core - Shared types library.
//!
//! This crate provides common types used across the Orderflow components:
//! - `server` - The order recording and cache synchronization service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! Redis clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe entity IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
