//! OpenAPI documentation for the identity API. Served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::handlers;
use crate::api::models::{auth, users};
use crate::auth::decision;
use crate::images;

/// Bearer session-token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_token".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token authentication. Obtain a token from `POST /login` and \
                             include it in the `Authorization` header:\n\n\
                             ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "idctl",
        description = "Identity control layer: signup, login, session tokens, and gated profile operations."
    ),
    paths(
        handlers::auth::signup,
        handlers::auth::login,
        handlers::authorize::authorize,
        handlers::profile::get_profile,
        handlers::profile::update_profile_image,
        handlers::profile::create_upload_url,
        handlers::profile::save_profile_url,
    ),
    components(schemas(
        auth::SignupRequest,
        auth::LoginRequest,
        auth::SignupResponse,
        auth::LoginResponse,
        auth::ProfileImageRequest,
        auth::ProfileImageResponse,
        auth::CommitUploadRequest,
        users::PublicUser,
        decision::AuthorizerRequest,
        decision::AuthorizerResponse,
        decision::IdentityContext,
        decision::Effect,
        images::UploadGrant,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login, and access decisions"),
        (name = "profile", description = "Protected profile operations"),
    )
)]
pub struct ApiDoc;
