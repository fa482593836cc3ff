//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: axum route handlers for every operation
//! - **[`models`]**: tagged request/response structs, validated at the
//!   boundary before any workflow logic runs

pub mod handlers;
pub mod models;
