//! # idctl: Identity Control Layer
//!
//! `idctl` is a credential and session core for a small user-identity
//! service: it registers users, authenticates them, issues bearer session
//! tokens, and gates protected operations (profile read, profile-image
//! upload) behind those tokens.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer. Identity records live in an append-only PostgreSQL store
//! (or an in-memory store for development and tests); profile images go to
//! S3 (or an in-memory stand-in). Both collaborators sit behind narrow
//! traits so the workflows never see backend details.
//!
//! ### Request Flow
//!
//! Every request passes through the route gate ([`auth::middleware`]). For
//! the fixed set of protected paths, the gate feeds the `Authorization`
//! header to the access decision function ([`auth::decision`]); a denial
//! short-circuits with 401 before any handler logic runs, and an allowance
//! attaches the verified identity to the request scope. Signup and login
//! ([`api::handlers::auth`]) are never gated: they establish identity
//! rather than consume it, using Argon2 password hashing
//! ([`auth::password`]) and signed session tokens ([`auth::session`]).
//!
//! The same decision function also backs `POST /authorize`, a gateway-style
//! authorizer that turns an out-of-band token plus a resource name into a
//! scoped Allow/Deny policy document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use idctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = idctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     idctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod images;
mod openapi;
pub mod store;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::errors::Error;
use crate::images::{ImageStore, MemoryImageStore, S3ImageStore};
use crate::openapi::ApiDoc;
use crate::store::{IdentityStore, MemoryIdentityStore, PostgresIdentityStore};

/// Application state shared across all request handlers.
///
/// There is no per-request mutable state here: the store and image store are
/// the only shared resources, and both are reached through their collaborator
/// traits.
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn IdentityStore>,
    pub images: Arc<dyn ImageStore>,
    pub config: Config,
}

/// Get the identity store database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let mut cors = if cors_config.allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(tower_http::cors::Any)
    } else {
        let origins = cors_config
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new().allow_origin(origins)
    };

    cors = cors
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Fallback for unmatched routes
async fn route_not_found() -> Error {
    Error::NotFound {
        resource: "Route".to_string(),
    }
}

/// Build the application router: all operations, the route gate in front of
/// them, API docs, CORS, and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/signup", post(api::handlers::auth::signup))
        .route("/login", post(api::handlers::auth::login))
        .route("/authorize", post(api::handlers::authorize::authorize))
        .route("/profile", get(api::handlers::profile::get_profile))
        .route("/profile-image", put(api::handlers::profile::update_profile_image))
        .route("/upload-url", get(api::handlers::profile::create_upload_url))
        .route("/profile-url", put(api::handlers::profile::save_profile_url))
        .fallback(route_not_found)
        .layer(from_fn_with_state(state.clone(), auth::middleware::route_gate))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] picks the store backends from
///    configuration, runs migrations when pointed at Postgres, and builds
///    the router.
/// 2. **Serve**: [`Application::serve`] binds a TCP listener and handles
///    requests until the shutdown future resolves.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn IdentityStore> = match &config.database_url {
            Some(url) => {
                info!("Using PostgreSQL identity store");
                Arc::new(PostgresIdentityStore::connect(url).await?)
            }
            None => {
                info!("No database_url configured: using in-memory identity store (development only)");
                Arc::new(MemoryIdentityStore::new())
            }
        };

        let images: Arc<dyn ImageStore> = match config.images.bucket.clone() {
            Some(bucket) => {
                info!("Using S3 image store (bucket: {bucket})");
                Arc::new(S3ImageStore::new(&config.images, bucket).await)
            }
            None => {
                info!("No images.bucket configured: using in-memory image store (development only)");
                Arc::new(MemoryImageStore::new())
            }
        };

        let state = AppState::builder().store(store).images(images).config(config.clone()).build();
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Identity control layer listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::{TEST_PNG_PAYLOAD, create_test_app, signup_request};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _state) = create_test_app();
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let (server, _state) = create_test_app();
        let response = server.get("/does-not-exist").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_protected_routes_are_gated_end_to_end() {
        let (server, _state) = create_test_app();

        let profile = server.get("/profile").await;
        profile.assert_status(StatusCode::UNAUTHORIZED);

        let image = server.put("/profile-image").json(&json!({"profile_image": "x"})).await;
        image.assert_status(StatusCode::UNAUTHORIZED);

        let upload = server.get("/upload-url").add_query_param("content_type", "image/png").await;
        upload.assert_status(StatusCode::UNAUTHORIZED);

        let commit = server.put("/profile-url").json(&json!({"object_key": "k"})).await;
        commit.assert_status(StatusCode::UNAUTHORIZED);

        for response in [profile, image, upload, commit] {
            let body: Value = response.json();
            assert_eq!(body["message"], "Unauthorized");
        }
    }

    /// Full happy-path walk: signup, duplicate signup, bad login, good login,
    /// image update with the issued token, garbled token rejection.
    #[tokio::test]
    async fn test_signup_login_update_flow() {
        let (server, _state) = create_test_app();

        let response = server.post("/signup").json(&signup_request("a@b.com")).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["user"]["email"], "a@b.com");
        assert!(body["user"].get("password").is_none());

        let response = server.post("/signup").json(&signup_request("a@b.com")).await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .post("/login")
            .json(&json!({"email": "a@b.com", "password": "not-the-password"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Invalid credentials");

        let response = server
            .post("/login")
            .json(&json!({"email": "a@b.com", "password": "longenough1"}))
            .await;
        response.assert_status_ok();
        let token = response.json::<Value>()["token"].as_str().unwrap().to_string();

        let response = server
            .put("/profile-image")
            .add_header("authorization", format!("Bearer {token}"))
            .json(&json!({"profile_image": TEST_PNG_PAYLOAD}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["profile_image"].as_str().unwrap().starts_with("https://"));

        let response = server
            .put("/profile-image")
            .add_header("authorization", "Bearer garbled.token.value")
            .json(&json!({"profile_image": TEST_PNG_PAYLOAD}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
