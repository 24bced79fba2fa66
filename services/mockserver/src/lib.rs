//! Mock log-management server library crate.
//!
//! # Purpose
//! Exposes the data model, entity store, caller resolution, configuration and
//! observability wiring for use by the operator binary and by test suites
//! that need an in-process server double.
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
