//! Password hashing, bearer-token issuance and the middleware guarding protected routes.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password, PasswordHasher};
pub use token::{Claims, TokenError, TokenKeys};
