//! Gateway-style authorizer endpoint.
//!
//! Accepts the token out-of-band instead of reading request headers, so a
//! fronting gateway (or an in-process caller) can ask for a decision about a
//! named resource. The verdict lives in the returned policy document; the
//! HTTP exchange itself always succeeds.

use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::decision::{self, AuthorizerRequest, AuthorizerResponse},
};

#[utoipa::path(
    post,
    path = "/authorize",
    request_body = AuthorizerRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Access decision document", body = AuthorizerResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn authorize(State(state): State<AppState>, Json(request): Json<AuthorizerRequest>) -> Json<AuthorizerResponse> {
    Json(decision::authorize(&request, &state.config))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, login, signup_request};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_authorize_endpoint_allows_valid_token() {
        let (server, _state) = create_test_app();
        server.post("/signup").json(&signup_request("a@b.com")).await;
        let token = login(&server, "a@b.com").await;

        let response = server
            .post("/authorize")
            .json(&json!({
                "authorization_token": format!("Bearer {token}"),
                "resource": "arn:service:profile-image",
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["effect"], "Allow");
        assert_eq!(body["principal_id"], "a@b.com");
        assert_eq!(body["resource"], "arn:service:profile-image");
        assert_eq!(body["context"]["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_authorize_endpoint_denies_without_claims() {
        let (server, _state) = create_test_app();

        let response = server
            .post("/authorize")
            .json(&json!({
                "authorization_token": "Bearer garbage",
                "resource": "arn:service:profile-image",
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["effect"], "Deny");
        assert_eq!(body["principal_id"], "anonymous");
        assert_eq!(body["resource"], "arn:service:profile-image");
        assert!(body.get("context").is_none());
    }
}
