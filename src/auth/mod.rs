pub mod gate;
mod middleware;
mod password;
mod token;

pub use gate::{authenticate, require_role};
pub use middleware::Authenticated;
pub use password::PasswordHasher;
pub use token::{Claims, DEFAULT_TTL_SECONDS, SessionClaims, TokenCodec};
