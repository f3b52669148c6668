//! SmartQueue client engine - synchronizes virtual queue tickets against a
//! REST backend and drives proximity notifications and operator queue
//! control.
//!
//! This library provides the polling, caching, and alerting machinery that
//! queue-facing frontends build on.

pub mod admin;
pub mod backend;
pub mod cache;
pub mod config;
pub mod detail;
pub mod notify;
pub mod scheduler;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
