//! Database module - Postgres implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management
//! - The `users` repository used by code issuance and verification

pub mod connection;
pub mod postgres;


// Re-export commonly used types
pub use connection::DatabasePool;
pub use postgres::PgUserRepository;
