//! Orderflow server library.
//!
//! This crate provides the order service functionality as a library,
//! allowing it to be tested and reused.
//!
//! Orders are written transactionally to `PostgreSQL` (the system of
//! record) and mirrored into Redis as denormalized projections that serve
//! point reads, recent-order listings, and the spending/best-seller
//! reports. The Redis side is derived data: everything except the
//! sold-quantity counters can be rebuilt from the database via
//! [`services::sync`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
