//! Authentication
//!
//! JWT issuance/validation, argon2 password hashing, and the request
//! middleware that turns a bearer token into a [`CurrentUser`].

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUser, require_auth, require_roles};
pub use password::{hash_password, verify_password};
