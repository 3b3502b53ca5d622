//! Route handlers

pub mod functions;
pub mod health;
