//! classwork-core — answering sessions, scoring, and class aggregation.
//!
//! This crate defines the data model, the JSON stores, the per-student
//! answering state machine, and the scoring and aggregation logic that the
//! classwork CLI and report renderers build on.

pub mod accounts;
pub mod config;
pub mod error;
pub mod mock;
pub mod model;
pub mod parser;
pub mod report;
pub mod roster;
pub mod schema;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod store;
pub mod traits;

pub use error::{ClassworkError, Result};
