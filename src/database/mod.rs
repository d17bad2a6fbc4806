//! Deal and source persistence
//!
//! One SQLite database holds everything. The Database handle lives in
//! connection.rs; the operation sets are split by concern:
//! - deals.rs: deal CRUD, status updates, analysis persistence
//! - sources.rs: source listing and upserts
//! - stats.rs: aggregate statistics

pub mod connection;
pub mod deals;
pub mod sources;
pub mod stats;

pub use connection::Database;
