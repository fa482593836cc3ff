//! Route gate: per-request protection of the fixed operation set.
//!
//! The gate runs before path matching. For a protected path it feeds the
//! `Authorization` header to the access decision function; Deny
//! short-circuits the pipeline with 401 before any handler logic runs, Allow
//! attaches the verified identity to the request scope for that single
//! request. Handlers receive it through the [`VerifiedIdentity`] extractor
//! and never re-derive it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, trace};

use crate::{
    AppState,
    api::models::users::VerifiedIdentity,
    auth::decision::{Effect, decide},
    errors::{Error, Result},
};

/// Operations that require a verified identity before they execute.
/// Signup, login, and the authorizer itself are deliberately absent: they
/// establish identity rather than consume it.
pub static PROTECTED_PATHS: &[&str] = &["/profile", "/profile-image", "/upload-url", "/profile-url"];

/// Whether an incoming path is in the protected set
pub fn requires_identity(path: &str) -> bool {
    PROTECTED_PATHS.contains(&path)
}

/// Gate middleware applied to the whole router.
///
/// Unprotected operations pass through untouched and run with no identity
/// context.
pub async fn route_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response> {
    let path = request.uri().path();

    if requires_identity(path) {
        let credential = request.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok());

        let decision = decide(credential, &state.config);
        match (decision.effect, decision.identity) {
            (Effect::Allow, Some(identity)) => {
                debug!("Route gate allowed {} for {}", path, identity.email);
                request.extensions_mut().insert(identity);
            }
            _ => {
                trace!("Route gate denied {}", path);
                return Err(Error::Unauthenticated);
            }
        }
    }

    Ok(next.run(request).await)
}

impl FromRequestParts<AppState> for VerifiedIdentity {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self> {
        parts.extensions.get::<VerifiedIdentity>().cloned().ok_or(Error::Unauthenticated)
    }
}
