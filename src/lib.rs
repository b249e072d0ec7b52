//! Harvests repository popularity metadata from GitHub's paginated search
//! API into SurrealDB, then snapshots the table to CSV and JSON.

pub mod cli;
pub mod error;
pub mod export;
pub mod github;
pub mod harvest;
pub mod models;
pub mod store;
pub mod types;
