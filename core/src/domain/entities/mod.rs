//! Domain entities representing core business objects.

pub mod session;
pub mod user;
pub mod verification_code;

// Re-export commonly used types
pub use session::{CustomSession, RemoteSession, SessionSource, UserData};
pub use user::User;
pub use verification_code::{generate_code, CODE_LENGTH, CODE_RANGE, DEFAULT_EXPIRATION_MINUTES};
