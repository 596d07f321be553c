pub mod connector;
pub mod models;

// Re-export the primary DB types and connect helpers for convenient access as `database::connect()`
pub use connector::{DB, PoolSettings, connect, connect_with_settings};
