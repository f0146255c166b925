//! `stockroom-auth`: authentication and authorization boundary.
//!
//! Decoupled from HTTP and storage: roles and permissions, token claims,
//! HS256 token signing/verification, password hashing and the user account
//! model.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, CommandAuthorization, Principal, authorize};
pub use claims::{JwtClaims, TokenError, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::{Permission, permissions_for_role};
pub use roles::Role;
pub use user::{NewUser, UserAccount, UserStatus, UserView};
