//! # Revpulse Data Store
//!
//! Read-only access to the CSV files behind the dashboard endpoints: the
//! precomputed KPI summary, the monthly MRR series, and the raw subscription
//! export.
//!
//! ## Public API
//!
//! - `CsvRepository`: Loads and types the files from a data directory.
//! - `CsvTable`: An in-memory CSV file with typed, string and record views.
//! - `DataError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod repository;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use error::DataError;
pub use repository::CsvRepository;
pub use table::CsvTable;
