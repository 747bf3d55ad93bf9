//! Utilities Module
//!
//! Logging and at-rest encryption shared across the crate.

pub mod logging;
pub mod secure_storage;
