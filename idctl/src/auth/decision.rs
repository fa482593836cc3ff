//! Access decision function and gateway-style authorizer.
//!
//! [`decide`] is the single place a presented credential is turned into an
//! Allow/Deny outcome. It is pure: no I/O, no clock beyond what token
//! verification itself does, produced fresh per request. The route gate
//! ([`super::middleware`]) consumes it inline; [`authorize`] wraps it into
//! the policy-document shape a fronting gateway expects.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{api::models::users::VerifiedIdentity, auth::session, config::Config};

/// Principal named in denial documents. Denials must never carry claim data,
/// so every denied caller is this anonymous principal.
const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Outcome of an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Effect {
    Allow,
    Deny,
}

/// Transient access decision: an effect plus, on Allow, the verified identity
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub effect: Effect,
    pub identity: Option<VerifiedIdentity>,
}

impl AccessDecision {
    fn allow(identity: VerifiedIdentity) -> Self {
        Self {
            effect: Effect::Allow,
            identity: Some(identity),
        }
    }

    fn deny() -> Self {
        Self {
            effect: Effect::Deny,
            identity: None,
        }
    }
}

/// Extract the token from a `Bearer <token>` credential
fn bearer_token(credential: &str) -> Option<&str> {
    credential.strip_prefix("Bearer ")
}

/// Map a presented credential (the raw `Authorization` header value, or an
/// out-of-band token field) to an access decision.
pub fn decide(credential: Option<&str>, config: &Config) -> AccessDecision {
    let Some(credential) = credential else {
        return AccessDecision::deny();
    };

    let Some(token) = bearer_token(credential) else {
        return AccessDecision::deny();
    };

    match session::verify_session_token(token, config) {
        Ok(identity) => AccessDecision::allow(identity),
        Err(_) => AccessDecision::deny(),
    }
}

/// Authorizer input: the presented token and the resource being invoked
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthorizerRequest {
    pub authorization_token: Option<String>,
    pub resource: String,
}

/// Identity context attached to an Allow document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdentityContext {
    pub email: String,
    pub name: String,
}

/// Authorizer output: a scoped permission grant or a generic denial
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub effect: Effect,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<IdentityContext>,
}

/// Evaluate a gateway authorization request.
///
/// Allow names the caller as principal and grants exactly the invoked
/// resource. Deny names the anonymous principal for the same resource and
/// carries no claim data.
pub fn authorize(request: &AuthorizerRequest, config: &Config) -> AuthorizerResponse {
    let decision = decide(request.authorization_token.as_deref(), config);

    match (decision.effect, decision.identity) {
        (Effect::Allow, Some(identity)) => AuthorizerResponse {
            principal_id: identity.email.clone(),
            effect: Effect::Allow,
            resource: request.resource.clone(),
            context: Some(IdentityContext {
                email: identity.email,
                name: identity.name,
            }),
        },
        _ => AuthorizerResponse {
            principal_id: ANONYMOUS_PRINCIPAL.to_string(),
            effect: Effect::Deny,
            resource: request.resource.clone(),
            context: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::create_session_token;
    use crate::test_utils::create_test_config;

    fn test_identity() -> VerifiedIdentity {
        VerifiedIdentity {
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
            version_stamp: "2026-03-01T08:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_missing_credential_denies() {
        let config = create_test_config();
        let decision = decide(None, &config);
        assert_eq!(decision.effect, Effect::Deny);
        assert!(decision.identity.is_none());
    }

    #[test]
    fn test_non_bearer_scheme_denies() {
        let config = create_test_config();
        let token = create_session_token(&test_identity(), &config).unwrap();

        for credential in [
            format!("Basic {token}"),
            format!("bearer {token}"), // scheme is case-sensitive
            token.clone(),             // bare token without a scheme
            "Bearer".to_string(),      // scheme without a token
        ] {
            let decision = decide(Some(&credential), &config);
            assert_eq!(decision.effect, Effect::Deny, "credential {credential:?} should deny");
        }
    }

    #[test]
    fn test_garbled_token_denies() {
        let config = create_test_config();
        let decision = decide(Some("Bearer not.a.real.token"), &config);
        assert_eq!(decision.effect, Effect::Deny);
        assert!(decision.identity.is_none());
    }

    #[test]
    fn test_valid_token_allows_with_identity() {
        let config = create_test_config();
        let identity = test_identity();
        let token = create_session_token(&identity, &config).unwrap();

        let credential = format!("Bearer {token}");
        let decision = decide(Some(&credential), &config);
        assert_eq!(decision.effect, Effect::Allow);

        let verified = decision.identity.expect("allow carries an identity");
        assert_eq!(verified.email, identity.email);
        assert_eq!(verified.name, identity.name);
        assert_eq!(verified.version_stamp, identity.version_stamp);
    }

    #[test]
    fn test_authorize_allow_scopes_grant_to_resource() {
        let config = create_test_config();
        let identity = test_identity();
        let token = create_session_token(&identity, &config).unwrap();

        let response = authorize(
            &AuthorizerRequest {
                authorization_token: Some(format!("Bearer {token}")),
                resource: "arn:service:profile-image".to_string(),
            },
            &config,
        );

        assert_eq!(response.effect, Effect::Allow);
        assert_eq!(response.principal_id, "ann@example.com");
        assert_eq!(response.resource, "arn:service:profile-image");
        let context = response.context.expect("allow carries identity context");
        assert_eq!(context.email, "ann@example.com");
        assert_eq!(context.name, "Ann");
    }

    #[test]
    fn test_authorize_deny_is_anonymous_and_context_free() {
        let config = create_test_config();

        let response = authorize(
            &AuthorizerRequest {
                authorization_token: Some("Bearer garbage".to_string()),
                resource: "arn:service:profile-image".to_string(),
            },
            &config,
        );

        assert_eq!(response.effect, Effect::Deny);
        assert_eq!(response.principal_id, "anonymous");
        assert_eq!(response.resource, "arn:service:profile-image");
        assert!(response.context.is_none());

        // Missing token denies the same way
        let response = authorize(
            &AuthorizerRequest {
                authorization_token: None,
                resource: "arn:service:profile-image".to_string(),
            },
            &config,
        );
        assert_eq!(response.effect, Effect::Deny);
        assert!(response.context.is_none());
    }
}
