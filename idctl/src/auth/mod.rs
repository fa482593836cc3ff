//! Authentication and authorization system.
//!
//! This module holds the pieces with real invariants:
//!
//! - [`password`]: credential hashing and verification using Argon2
//! - [`session`]: signed, time-bounded session token issue/verify
//! - [`decision`]: the pure access decision function and the gateway-style
//!   authorizer built on top of it
//! - [`middleware`]: the route gate protecting a fixed set of operations,
//!   plus the [`crate::api::models::users::VerifiedIdentity`] extractor
//!
//! Signup and login live in the API layer ([`crate::api::handlers::auth`]);
//! they consume [`password`] and [`session`] but are themselves never gated,
//! since they establish identity rather than consume it.

pub mod decision;
pub mod middleware;
pub mod password;
pub mod session;
