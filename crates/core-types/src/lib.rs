//! # Revpulse Core Types
//!
//! The record model shared by every other crate: schema-less subscription rows,
//! the closed set of field value kinds, and the coercions that turn them into
//! numbers and dates.
//!
//! ## Public API
//!
//! - `SubscriptionRecord`: one row, an open mapping from field name to `FieldValue`.
//! - `Schema`: the set of field names present across a batch of records.
//! - `records_from_json`: validates a decoded JSON payload into records.
//! - `CoreError`: the specific error types that can be returned from this crate.

pub mod dates;
pub mod error;
pub mod record;
pub mod value;

// Re-export the core types to provide a clean public API.
pub use dates::parse_date;
pub use error::CoreError;
pub use record::{fields, records_from_json, Schema, SubscriptionRecord};
pub use value::FieldValue;
