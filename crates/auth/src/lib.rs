//! `commissary-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! hash and verify passwords, issue and verify bearer tokens, and decide whether
//! an actor's role admits an action. It never performs IO.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256Jwt, IssuedToken, JwtValidator, TokenError};
pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{Action, POLICY};
pub use principal::Actor;
pub use roles::Role;
pub use user::{NewUser, UserAccount};
