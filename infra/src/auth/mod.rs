//! Managed auth provider client

pub mod managed_auth;
pub mod types;

pub use managed_auth::HttpManagedAuth;
