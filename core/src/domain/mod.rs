//! Domain layer containing business entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::{
    CustomSession, RemoteSession, SessionSource, User, UserData, CODE_LENGTH,
    DEFAULT_EXPIRATION_MINUTES,
};
